//! # Directory Synchronization Engine
//!
//! The engine assembles a destination directory from heterogeneous content
//! sources, atomically, and records what it fetched:
//!
//! 1.  **Dispatch**: each content entry's validated source kind selects a
//!     [`Syncer`] variant ([`syncer_for`]).
//! 2.  **Fetch**: the variant populates the entry's path inside the staging
//!     tree ([`staging::StagingArea`]).
//! 3.  **Filter**: include/exclude rules prune the staged subtree
//!     ([`filter::FileFilter`]).
//! 4.  **Lock**: the resolved identity is appended to the directory's lock
//!     record, in configuration order.
//! 5.  **Commit**: once every entry succeeded, one rename swaps the staging
//!     tree into the destination ([`directory::DirectorySync`]).
//!
//! Entries are processed strictly sequentially; the first failure aborts
//! the directory sync, and the staging root is removed on every exit path.

pub mod directory;
pub mod filter;
pub mod git;
pub mod github_release;
pub mod helm_chart;
pub mod http;
pub mod image;
pub mod local;
pub mod staging;

pub use directory::DirectorySync;
pub use filter::FileFilter;
pub use staging::StagingArea;

use std::path::Path;

use crate::config::{Config, ContentSource, Contents};
use crate::error::Result;
use crate::lock::{LockConfig, LockSource};

/// Cross-cutting options for a sync run
#[derive(Debug, Clone)]
pub struct SyncOpts {
    /// GitHub API token for release resolution (`GITHUB_TOKEN`).
    pub github_api_token: Option<String>,
    /// Helm binary used to pull charts.
    pub helm_binary: String,
    /// imgpkg-compatible binary used to pull image filesystems.
    pub imgpkg_binary: String,
}

impl Default for SyncOpts {
    fn default() -> Self {
        Self {
            github_api_token: None,
            helm_binary: "helm".to_string(),
            imgpkg_binary: "imgpkg".to_string(),
        }
    }
}

/// One source kind's fetch capability.
///
/// A variant must leave `dst_path` fully populated or fail; the staging
/// root is discarded wholesale on failure, so partial writes are never
/// exposed.
pub trait Syncer {
    /// Source descriptor for the per-entry progress line.
    fn desc(&self) -> String;

    /// Fetch the content into `dst_path`, using `scratch_dir` for
    /// in-flight artifacts, and return the resolved identity.
    fn sync(&self, dst_path: &Path, scratch_dir: &Path) -> Result<LockSource>;
}

/// Select the [`Syncer`] variant for a content entry.
///
/// Fails with a configuration error when no source kind (or more than one)
/// is populated. The match over [`ContentSource`] is exhaustive: adding a
/// kind forces a dispatch decision here.
pub fn syncer_for<'a>(
    dir_path: &'a Path,
    contents: &'a Contents,
    opts: &'a SyncOpts,
) -> Result<Box<dyn Syncer + 'a>> {
    Ok(match contents.source()? {
        ContentSource::Git(src) => Box::new(git::GitSync::new(src)),
        ContentSource::Http(src) => Box::new(http::HttpSync::new(src)),
        ContentSource::Image(src) => Box::new(image::ImageSync::new(src, opts)),
        ContentSource::GithubRelease(src) => {
            Box::new(github_release::GithubReleaseSync::new(src, opts))
        }
        ContentSource::HelmChart(src) => Box::new(helm_chart::HelmChartSync::new(src, opts)),
        ContentSource::Manual(_) => Box::new(local::ManualSync::new(dir_path, &contents.path)),
        ContentSource::Directory(src) => Box::new(local::LocalDirectorySync::new(src)),
    })
}

/// Sync every configured directory, in file order, and assemble the
/// project-level lock record.
///
/// Strictly sequential; the first directory failure aborts the run.
pub fn sync_directories(config: &Config, opts: &SyncOpts) -> Result<LockConfig> {
    let mut lock = LockConfig::default();
    for directory in &config.directories {
        let dir_lock = DirectorySync::new(directory, opts).sync()?;
        lock.directories.push(dir_lock);
    }
    Ok(lock)
}
