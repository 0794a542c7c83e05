//! Helm chart content syncer
//!
//! Delegates chart pulling to the external `helm` binary (path configurable
//! via [`SyncOpts`]): the chart is pulled and untarred into the incoming
//! scratch space, its `Chart.yaml` is read for the resolved version, and
//! the chart directory is moved into the staging path.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::HelmChartSource;
use crate::error::{Error, Result};
use crate::lock::{HelmChartLock, LockSource};
use crate::path::encode_path;
use crate::sync::{SyncOpts, Syncer};

/// The `Chart.yaml` fields the lock record needs
#[derive(Debug, Deserialize)]
struct ChartMeta {
    version: String,
    #[serde(default, rename = "appVersion")]
    app_version: Option<String>,
}

/// Syncer for `helm-chart` content entries
pub struct HelmChartSync<'a> {
    src: &'a HelmChartSource,
    opts: &'a SyncOpts,
}

impl<'a> HelmChartSync<'a> {
    pub fn new(src: &'a HelmChartSource, opts: &'a SyncOpts) -> Self {
        Self { src, opts }
    }

    fn pull_into(&self, untar_dir: &Path) -> Result<()> {
        let binary = &self.opts.helm_binary;
        let mut command = Command::new(binary);
        command
            .args(["pull", &self.src.name, "--repo", &self.src.repository])
            .args(["--untar", "--untardir"])
            .arg(untar_dir);
        if let Some(version) = &self.src.version {
            command.args(["--version", version]);
        }

        let output = command.output().map_err(|e| Error::Tool {
            tool: binary.clone(),
            message: format!("{} (is it installed and on PATH?)", e),
        })?;
        if !output.status.success() {
            return Err(Error::Tool {
                tool: binary.clone(),
                message: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(())
    }

    /// The single chart directory helm untarred into the scratch space.
    fn untarred_chart_dir(&self, untar_dir: &Path) -> Result<PathBuf> {
        let mut entries = fs::read_dir(untar_dir)
            .map_err(|e| Error::Filesystem {
                message: format!("Reading directory '{}': {}", untar_dir.display(), e),
            })?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir());

        let first = entries.next().ok_or_else(|| Error::Tool {
            tool: self.opts.helm_binary.clone(),
            message: format!(
                "No chart directory produced under '{}'",
                untar_dir.display()
            ),
        })?;
        Ok(first)
    }
}

impl Syncer for HelmChartSync<'_> {
    fn desc(&self) -> String {
        match &self.src.version {
            Some(version) => format!(
                "helm chart {}@{} from {}",
                self.src.name, version, self.src.repository
            ),
            None => format!("helm chart {} from {}", self.src.name, self.src.repository),
        }
    }

    fn sync(&self, dst_path: &Path, scratch_dir: &Path) -> Result<LockSource> {
        let untar_dir = scratch_dir.join(format!("helm-chart-{}", encode_path(&self.src.name)));
        fs::create_dir_all(&untar_dir).map_err(|e| Error::Filesystem {
            message: format!("Creating directory '{}': {}", untar_dir.display(), e),
        })?;

        self.pull_into(&untar_dir)?;

        let chart_dir = self.untarred_chart_dir(&untar_dir)?;
        let meta = read_chart_meta(&chart_dir)?;

        fs::rename(&chart_dir, dst_path).map_err(|e| Error::Filesystem {
            message: format!(
                "Moving chart '{}' to '{}': {}",
                chart_dir.display(),
                dst_path.display(),
                e
            ),
        })?;

        Ok(LockSource::HelmChart {
            helm_chart: HelmChartLock {
                version: meta.version,
                app_version: meta.app_version,
            },
        })
    }
}

fn read_chart_meta(chart_dir: &Path) -> Result<ChartMeta> {
    let chart_yaml = chart_dir.join("Chart.yaml");
    let contents = fs::read_to_string(&chart_yaml).map_err(|e| Error::Filesystem {
        message: format!("Reading '{}': {}", chart_yaml.display(), e),
    })?;
    serde_yaml::from_str(&contents).map_err(Error::Yaml)
}
