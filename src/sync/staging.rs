//! # Staging Area
//!
//! Atomic, crash-safe replacement of a destination directory tree.
//!
//! A [`StagingArea`] owns an ephemeral root next to the destination with two
//! subtrees:
//!
//! - `staging`: the tree being assembled; once every content entry has
//!   been fetched and filtered, a single rename swaps it into the final
//!   destination path.
//! - `incoming`: scratch space for in-flight fetch artifacts (downloads,
//!   chart untar output) that are not part of the assembled tree.
//!
//! The staging root is derived from the destination path, so syncs of
//! distinct directories within one working tree never collide, and the
//! commit rename stays on one filesystem. The whole root is removed when
//! the `StagingArea` is dropped, on every exit path; an external reader of
//! the destination only ever sees the complete pre-sync or the complete
//! post-sync tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::path::encode_path;

const STAGING_PREFIX: &str = ".vendor-sync-tmp-";

/// Name of the moved-aside pre-sync destination inside the staging root.
const PRIOR_DIR: &str = "prior";

/// Ephemeral staging root for one directory sync
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
    staging: PathBuf,
    incoming: PathBuf,
}

/// Compute the staging-root path for a destination directory.
///
/// The root is a sibling of the destination so the commit rename cannot
/// cross a filesystem boundary.
pub fn staging_root_for(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dir".to_string());
    let root_name = format!("{}{}", STAGING_PREFIX, encode_path(&name));
    match destination.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from(root_name),
        Some(parent) => parent.join(root_name),
        None => PathBuf::from(root_name),
    }
}

impl StagingArea {
    /// Create a fresh staging area for a destination directory.
    ///
    /// Any leftover staging root from a previous failed run is removed
    /// first. The `staging` and `incoming` subtrees are created with
    /// restrictive permissions.
    pub fn begin(destination: &Path) -> Result<StagingArea> {
        let root = staging_root_for(destination);

        remove_dir_if_present(&root)?;

        let staging = root.join("staging");
        let incoming = root.join("incoming");
        for dir in [&staging, &incoming] {
            fs::create_dir_all(dir).map_err(|e| Error::Filesystem {
                message: format!("Creating staging dir '{}': {}", dir.display(), e),
            })?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o700);
            fs::set_permissions(&root, perms).map_err(|e| Error::Filesystem {
                message: format!("Restricting staging dir '{}': {}", root.display(), e),
            })?;
        }

        Ok(StagingArea {
            root,
            staging,
            incoming,
        })
    }

    /// Absolute path under `staging` for a content entry, with parent
    /// directories created.
    pub fn stage_path_for(&self, content_path: &str) -> Result<PathBuf> {
        let staged = self.staging.join(content_path);
        if let Some(parent) = staged.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Creating directory '{}': {}", parent.display(), e),
            })?;
        }
        Ok(staged)
    }

    /// Scratch directory for in-flight fetch artifacts.
    pub fn incoming_dir(&self) -> &Path {
        &self.incoming
    }

    /// Swap the assembled staging tree into the destination path.
    ///
    /// Any existing destination is moved aside into the staging root before
    /// the rename, and restored best-effort if the rename fails; the
    /// moved-aside copy is deleted with the rest of the staging root when
    /// this area is dropped. Invoked only after every content entry has
    /// succeeded.
    pub fn commit(self, destination: &Path) -> Result<()> {
        let prior = self.root.join(PRIOR_DIR);

        let had_prior = destination.exists();
        if had_prior {
            fs::rename(destination, &prior).map_err(|e| Error::Filesystem {
                message: format!(
                    "Moving previous directory '{}' aside: {}",
                    destination.display(),
                    e
                ),
            })?;
        }

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                    message: format!(
                        "Creating final location parent dir '{}': {}",
                        parent.display(),
                        e
                    ),
                })?;
            }
        }

        if let Err(e) = fs::rename(&self.staging, destination) {
            if had_prior {
                // Put the pre-sync tree back so a failed commit does not
                // leave the destination absent.
                if let Err(restore_err) = fs::rename(&prior, destination) {
                    log::warn!(
                        "Could not restore previous directory '{}': {}",
                        destination.display(),
                        restore_err
                    );
                }
            }
            return Err(Error::Filesystem {
                message: format!(
                    "Moving staging directory '{}' to final location '{}': {}",
                    self.staging.display(),
                    destination.display(),
                    e
                ),
            });
        }

        Ok(())
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if let Err(e) = remove_dir_if_present(&self.root) {
            log::warn!("Could not clean up staging root: {}", e);
        }
    }
}

fn remove_dir_if_present(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Filesystem {
            message: format!("Deleting tmp dir '{}': {}", path.display(), e),
        }),
    }
}
