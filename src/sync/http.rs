//! HTTP content syncer
//!
//! Downloads a URL into the staging path and records the source URL plus
//! the SHA-256 of the payload. With `unpack: true` a zip payload is
//! extracted into the staging path instead of being stored as a file.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use crate::config::HttpSource;
use crate::error::{Error, Result};
use crate::lock::{HttpLock, LockSource};
use crate::sync::Syncer;

/// Syncer for `http` content entries
pub struct HttpSync<'a> {
    src: &'a HttpSource,
}

impl<'a> HttpSync<'a> {
    pub fn new(src: &'a HttpSource) -> Self {
        Self { src }
    }

    fn download(&self) -> Result<Vec<u8>> {
        let response =
            reqwest::blocking::get(&self.src.url).map_err(|e| Error::Network {
                url: self.src.url.clone(),
                message: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(Error::Network {
                url: self.src.url.clone(),
                message: format!("HTTP status {}", response.status()),
            });
        }
        let bytes = response.bytes().map_err(|e| Error::Network {
            url: self.src.url.clone(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    /// File name for a stored payload, from the last URL path segment.
    fn file_name(&self) -> Result<String> {
        let parsed = url::Url::parse(&self.src.url).map_err(Error::UrlParse)?;
        let name = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or("download");
        Ok(name.to_string())
    }
}

impl Syncer for HttpSync<'_> {
    fn desc(&self) -> String {
        format!("http from {}", self.src.url)
    }

    fn sync(&self, dst_path: &Path, _scratch_dir: &Path) -> Result<LockSource> {
        let payload = self.download()?;
        let sha256 = hex::encode(Sha256::digest(&payload));

        if self.src.unpack {
            fs::create_dir_all(dst_path).map_err(|e| Error::Filesystem {
                message: format!("Creating directory '{}': {}", dst_path.display(), e),
            })?;
            extract_zip(&payload, dst_path)?;
        } else {
            fs::create_dir_all(dst_path).map_err(|e| Error::Filesystem {
                message: format!("Creating directory '{}': {}", dst_path.display(), e),
            })?;
            let file_path = dst_path.join(self.file_name()?);
            fs::write(&file_path, &payload).map_err(|e| Error::Filesystem {
                message: format!("Writing file '{}': {}", file_path.display(), e),
            })?;
        }

        Ok(LockSource::Http {
            http: HttpLock {
                url: self.src.url.clone(),
                sha256,
            },
        })
    }
}

/// Extract a zip payload under `dst`, rejecting entries whose names would
/// escape it.
pub fn extract_zip(payload: &[u8], dst: &Path) -> Result<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(payload)).map_err(|e| Error::Archive {
        message: format!("Opening zip archive: {}", e),
    })?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| Error::Archive {
            message: format!("Reading zip entry {}: {}", index, e),
        })?;
        // enclosed_name rejects absolute paths and '..' traversal.
        let Some(relative) = entry.enclosed_name() else {
            return Err(Error::Archive {
                message: format!("Zip entry '{}' escapes the target directory", entry.name()),
            });
        };
        let out_path = dst.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| Error::Filesystem {
                message: format!("Creating directory '{}': {}", out_path.display(), e),
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Creating directory '{}': {}", parent.display(), e),
            })?;
        }
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).map_err(|e| Error::Archive {
            message: format!("Reading zip entry '{}': {}", out_path.display(), e),
        })?;
        fs::write(&out_path, contents).map_err(|e| Error::Filesystem {
            message: format!("Writing file '{}': {}", out_path.display(), e),
        })?;
    }

    Ok(())
}
