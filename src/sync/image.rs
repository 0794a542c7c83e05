//! OCI image content syncer
//!
//! Pulling and unpacking an image filesystem is delegated to an external
//! `imgpkg`-compatible binary (configurable via [`SyncOpts`]), the same way
//! chart pulling is delegated to helm. The binary is expected to extract
//! the image contents into the given output directory and to print the
//! resolved `@sha256:` reference on stdout, which becomes the lock
//! identity.

use std::path::Path;
use std::process::Command;

use crate::config::ImageSource;
use crate::error::{Error, Result};
use crate::lock::{ImageLock, LockSource};
use crate::sync::{SyncOpts, Syncer};

/// Syncer for `image` content entries
pub struct ImageSync<'a> {
    src: &'a ImageSource,
    opts: &'a SyncOpts,
}

impl<'a> ImageSync<'a> {
    pub fn new(src: &'a ImageSource, opts: &'a SyncOpts) -> Self {
        Self { src, opts }
    }
}

impl Syncer for ImageSync<'_> {
    fn desc(&self) -> String {
        format!("image from {}", self.src.url)
    }

    fn sync(&self, dst_path: &Path, _scratch_dir: &Path) -> Result<LockSource> {
        let binary = &self.opts.imgpkg_binary;
        let output = Command::new(binary)
            .args(["pull", "-i", &self.src.url, "-o"])
            .arg(dst_path)
            .output()
            .map_err(|e| Error::Tool {
                tool: binary.clone(),
                message: format!("{} (is it installed and on PATH?)", e),
            })?;

        if !output.status.success() {
            return Err(Error::Tool {
                tool: binary.clone(),
                message: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(digest) = parse_digest(&stdout) else {
            // An unpinned lock entry would not be reproducible.
            return Err(Error::Tool {
                tool: binary.clone(),
                message: format!(
                    "Could not determine digest for image '{}' from pull output",
                    self.src.url
                ),
            });
        };

        Ok(LockSource::Image {
            image: ImageLock {
                url: self.src.url.clone(),
                digest,
            },
        })
    }
}

/// Find the first `sha256:<hex>` digest in pull output.
fn parse_digest(output: &str) -> Option<String> {
    for token in output.split(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        if let Some(at) = token.find("@sha256:") {
            let digest = &token[at + 1..];
            if is_digest(digest) {
                return Some(digest.to_string());
            }
        } else if let Some(rest) = token.strip_prefix("sha256:") {
            if is_digest(token) && rest.len() == 64 {
                return Some(token.to_string());
            }
        }
    }
    None
}

fn is_digest(candidate: &str) -> bool {
    match candidate.strip_prefix("sha256:") {
        Some(hex) => hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
