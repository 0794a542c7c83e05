//! Manual and local-directory content syncers
//!
//! Neither kind touches the network, and neither records a resolved
//! identity: there is nothing remote to pin.
//!
//! - `manual`: the content already lives at the content path inside the
//!   destination directory and is carried through the sync by moving it
//!   into the staging tree.
//! - `directory`: a local directory tree is copied recursively into the
//!   staging path.

use std::fs;
use std::path::Path;

use crate::config::DirectorySource;
use crate::error::{Error, Result};
use crate::lock::{DirectoryLock, LockSource, ManualLock};
use crate::sync::Syncer;

/// Syncer for `manual` content entries
pub struct ManualSync<'a> {
    /// The real (pre-sync) destination directory.
    dir_path: &'a Path,
    content_path: &'a str,
}

impl<'a> ManualSync<'a> {
    pub fn new(dir_path: &'a Path, content_path: &'a str) -> Self {
        Self {
            dir_path,
            content_path,
        }
    }
}

impl Syncer for ManualSync<'_> {
    fn desc(&self) -> String {
        "manual".to_string()
    }

    fn sync(&self, dst_path: &Path, _scratch_dir: &Path) -> Result<LockSource> {
        let src_path = self.dir_path.join(self.content_path);
        if !src_path.exists() {
            return Err(Error::Filesystem {
                message: format!(
                    "Manual source '{}' not found (expected existing content to carry through the sync)",
                    src_path.display()
                ),
            });
        }

        fs::rename(&src_path, dst_path).map_err(|e| Error::Filesystem {
            message: format!(
                "Moving directory '{}' to staging dir: {}",
                src_path.display(),
                e
            ),
        })?;

        Ok(LockSource::Manual {
            manual: ManualLock {},
        })
    }
}

/// Syncer for `directory` content entries
pub struct LocalDirectorySync<'a> {
    src: &'a DirectorySource,
}

impl<'a> LocalDirectorySync<'a> {
    pub fn new(src: &'a DirectorySource) -> Self {
        Self { src }
    }
}

impl Syncer for LocalDirectorySync<'_> {
    fn desc(&self) -> String {
        format!("directory from {}", self.src.path)
    }

    fn sync(&self, dst_path: &Path, _scratch_dir: &Path) -> Result<LockSource> {
        let src_path = Path::new(&self.src.path);
        if !src_path.is_dir() {
            return Err(Error::Filesystem {
                message: format!("Source directory '{}' not found", src_path.display()),
            });
        }

        copy_dir_all(src_path, dst_path)?;

        Ok(LockSource::Directory {
            directory: DirectoryLock {},
        })
    }
}

/// Recursively copy a directory tree.
///
/// Symbolic links are recreated rather than followed, so a link inside the
/// source cannot pull unrelated filesystem paths into the staging tree.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| Error::Filesystem {
        message: format!("Creating directory '{}': {}", dst.display(), e),
    })?;

    for entry in fs::read_dir(src).map_err(|e| Error::Filesystem {
        message: format!("Reading directory '{}': {}", src.display(), e),
    })? {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: format!("Reading directory '{}': {}", src.display(), e),
        })?;
        let file_type = entry.file_type().map_err(|e| Error::Filesystem {
            message: format!("Inspecting '{}': {}", entry.path().display(), e),
        })?;
        let target = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else if file_type.is_symlink() {
            copy_symlink(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::Filesystem {
                message: format!("Copying file '{}': {}", entry.path().display(), e),
            })?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link_target = fs::read_link(src).map_err(|e| Error::Filesystem {
        message: format!("Reading link '{}': {}", src.display(), e),
    })?;
    std::os::unix::fs::symlink(&link_target, dst).map_err(|e| Error::Filesystem {
        message: format!("Creating link '{}': {}", dst.display(), e),
    })
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map_err(|e| Error::Filesystem {
        message: format!("Copying file '{}': {}", src.display(), e),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_manual_moves_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out");
        fs::create_dir_all(dest.join("local")).unwrap();
        fs::write(dest.join("local/keep.txt"), "keep").unwrap();

        let staging = temp_dir.path().join("staging");
        fs::create_dir_all(&staging).unwrap();
        let dst = staging.join("local");

        let sync = ManualSync::new(&dest, "local");
        let lock = sync.sync(&dst, temp_dir.path()).unwrap();

        assert!(matches!(lock, LockSource::Manual { .. }));
        assert_eq!(fs::read_to_string(dst.join("keep.txt")).unwrap(), "keep");
        assert!(!dest.join("local").exists());
    }

    #[test]
    fn test_manual_missing_source_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out");
        let staging = temp_dir.path().join("staging");
        fs::create_dir_all(&staging).unwrap();

        let sync = ManualSync::new(&dest, "local");
        let err = sync.sync(&staging.join("local"), temp_dir.path()).unwrap_err();

        let display = format!("{}", err);
        assert!(matches!(err, Error::Filesystem { .. }));
        assert!(display.contains(&dest.join("local").display().to_string()));
    }

    #[test]
    fn test_directory_copies_tree() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("shared");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("a.txt"), "a").unwrap();
        fs::write(source.join("sub/b.txt"), "b").unwrap();

        let dst = temp_dir.path().join("staged");
        let src = DirectorySource {
            path: source.display().to_string(),
        };
        let lock = LocalDirectorySync::new(&src)
            .sync(&dst, temp_dir.path())
            .unwrap();

        assert!(matches!(lock, LockSource::Directory { .. }));
        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dst.join("sub/b.txt")).unwrap(), "b");
        // The source tree is untouched.
        assert!(source.join("a.txt").exists());
    }

    #[test]
    fn test_directory_missing_source_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let src = DirectorySource {
            path: temp_dir.path().join("absent").display().to_string(),
        };
        let err = LocalDirectorySync::new(&src)
            .sync(&temp_dir.path().join("staged"), temp_dir.path())
            .unwrap_err();
        assert!(format!("{}", err).contains("absent"));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_dir_recreates_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("shared");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("real.txt"), "real").unwrap();
        std::os::unix::fs::symlink("real.txt", source.join("link.txt")).unwrap();

        let dst = temp_dir.path().join("staged");
        copy_dir_all(&source, &dst).unwrap();

        let copied = dst.join("link.txt");
        assert!(fs::symlink_metadata(&copied).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&copied).unwrap(), Path::new("real.txt"));
    }
}
