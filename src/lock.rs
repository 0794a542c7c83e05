//! # Lock Records
//!
//! This module defines the types that record exactly what a sync fetched,
//! enabling reproducible re-fetching. A [`LockDirectory`] is produced per
//! synced directory, positionally aligned 1:1 with the directory's
//! configured content entries; the project-level [`LockConfig`] aggregates
//! them and is serialized to `vendor-sync.lock.yaml`.
//!
//! Each lock entry carries the source-kind-tagged resolved identity: git
//! commit SHA, payload digest, image digest, release tag and asset names, or
//! chart version. Manual and local-directory entries carry no identity -
//! there is nothing remote to pin.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default lock file name, written next to the config file.
pub const DEFAULT_LOCK_FILE: &str = "vendor-sync.lock.yaml";

/// Resolved identity of a git content entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLock {
    /// The commit SHA the ref resolved to.
    pub sha: String,
    /// Subject line of the resolved commit.
    #[serde(
        default,
        rename = "commit-title",
        skip_serializing_if = "Option::is_none"
    )]
    pub commit_title: Option<String>,
}

/// Resolved identity of an http content entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpLock {
    /// The URL that was downloaded.
    pub url: String,
    /// SHA-256 digest of the downloaded payload.
    pub sha256: String,
}

/// Resolved identity of an image content entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLock {
    /// The configured image reference.
    pub url: String,
    /// The digest the reference resolved to.
    pub digest: String,
}

/// Resolved identity of a github-release content entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubReleaseLock {
    /// The tag the release resolved to (concrete even for `latest`).
    pub tag: String,
    /// Names of the downloaded assets.
    pub assets: Vec<String>,
}

/// Resolved identity of a helm-chart content entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelmChartLock {
    /// The chart version that was pulled.
    pub version: String,
    /// The chart's application version, when declared.
    #[serde(
        default,
        rename = "app-version",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_version: Option<String>,
}

/// Identity of a manual content entry; nothing remote to pin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualLock {}

/// Identity of a local-directory content entry; nothing remote to pin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryLock {}

/// Source-kind-tagged resolved identity of one content entry
///
/// Serialized untagged: each variant contributes its single named key
/// (`git:`, `http:`, ...), matching the configuration's source-kind keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LockSource {
    Git { git: GitLock },
    Http { http: HttpLock },
    Image { image: ImageLock },
    GithubRelease {
        #[serde(rename = "github-release")]
        github_release: GithubReleaseLock,
    },
    HelmChart {
        #[serde(rename = "helm-chart")]
        helm_chart: HelmChartLock,
    },
    Manual { manual: ManualLock },
    Directory { directory: DirectoryLock },
}

impl LockSource {
    /// The configuration key for this source kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LockSource::Git { .. } => "git",
            LockSource::Http { .. } => "http",
            LockSource::Image { .. } => "image",
            LockSource::GithubRelease { .. } => "github-release",
            LockSource::HelmChart { .. } => "helm-chart",
            LockSource::Manual { .. } => "manual",
            LockSource::Directory { .. } => "directory",
        }
    }
}

/// Lock record for one content entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockContents {
    /// Content path, as configured.
    pub path: String,
    /// Resolved identity, tagged by source kind.
    #[serde(flatten)]
    pub source: LockSource,
}

/// Lock record for one synced directory
///
/// `contents` is positionally aligned with the configured content entries:
/// same length, same order, same path values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockDirectory {
    /// Destination path, as configured.
    pub path: String,
    /// Ordered lock entries, one per content entry.
    #[serde(default)]
    pub contents: Vec<LockContents>,
}

impl LockDirectory {
    /// Start an empty lock record for a destination path.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            contents: Vec::new(),
        }
    }
}

/// Project-level lock file: one record per synced directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Ordered lock records, matching the configuration's directory order.
    #[serde(default)]
    pub directories: Vec<LockDirectory>,
}

impl LockConfig {
    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::Yaml)
    }

    /// Write the lock file, replacing any previous one.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path, yaml).map_err(|e| Error::Filesystem {
            message: format!("Writing lock file '{}': {}", path.display(), e),
        })
    }

    /// Load a previously written lock file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::Filesystem {
            message: format!("Reading lock file '{}': {}", path.display(), e),
        })?;
        serde_yaml::from_str(&contents).map_err(Error::Yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_lock() -> LockConfig {
        LockConfig {
            directories: vec![LockDirectory {
                path: "vendor".to_string(),
                contents: vec![
                    LockContents {
                        path: "widget".to_string(),
                        source: LockSource::Git {
                            git: GitLock {
                                sha: "0123456789abcdef0123456789abcdef01234567".to_string(),
                                commit_title: Some("Release v1.2.3".to_string()),
                            },
                        },
                    },
                    LockContents {
                        path: "local".to_string(),
                        source: LockSource::Manual {
                            manual: ManualLock {},
                        },
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_lock_source_kind_names() {
        let source = LockSource::HelmChart {
            helm_chart: HelmChartLock {
                version: "1.0.0".to_string(),
                app_version: None,
            },
        };
        assert_eq!(source.kind(), "helm-chart");
    }

    #[test]
    fn test_lock_yaml_shape() {
        let yaml = sample_lock().to_yaml().unwrap();
        // Kind tag appears as a nested key next to the path, not as an
        // enum wrapper.
        assert!(yaml.contains("path: widget"));
        assert!(yaml.contains("git:"));
        assert!(yaml.contains("sha: 0123456789abcdef0123456789abcdef01234567"));
        assert!(yaml.contains("commit-title: Release v1.2.3"));
        assert!(yaml.contains("manual: {}"));
        assert!(!yaml.contains("Git"));
    }

    #[test]
    fn test_lock_roundtrip() {
        let lock = sample_lock();
        let yaml = lock.to_yaml().unwrap();
        let parsed: LockConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, lock);
    }

    #[test]
    fn test_lock_write_and_read_file() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("vendor-sync.lock.yaml");

        let lock = sample_lock();
        lock.write_to_file(&lock_path).unwrap();

        let loaded = LockConfig::from_file(&lock_path).unwrap();
        assert_eq!(loaded, lock);
    }

    #[test]
    fn test_lock_read_missing_file() {
        let err = LockConfig::from_file(Path::new("/nonexistent/lock.yaml")).unwrap_err();
        assert!(format!("{}", err).contains("/nonexistent/lock.yaml"));
    }

    #[test]
    fn test_lock_directory_new_is_empty() {
        let lock = LockDirectory::new("vendor");
        assert_eq!(lock.path, "vendor");
        assert!(lock.contents.is_empty());
    }
}
