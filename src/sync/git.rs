//! Git content syncer
//!
//! Clones a repository at a specific ref into the staging path and records
//! the commit SHA it resolved to.
//!
//! This uses the system git command, which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::config::GitSource;
use crate::error::{Error, Result};
use crate::lock::{GitLock, LockSource};
use crate::sync::Syncer;

/// Syncer for `git` content entries
pub struct GitSync<'a> {
    src: &'a GitSource,
}

impl<'a> GitSync<'a> {
    pub fn new(src: &'a GitSource) -> Self {
        Self { src }
    }

    /// Shallow clone at the configured ref.
    ///
    /// `--branch` only accepts branch and tag names, so a ref that looks
    /// like a commit SHA falls back to a full clone plus checkout.
    fn clone_into(&self, target_dir: &Path) -> Result<()> {
        // Remove target directory if it exists (git won't clone into an
        // existing non-empty dir)
        if target_dir.exists() {
            fs::remove_dir_all(target_dir)?;
        }

        let output = Command::new("git")
            .args(["clone", "--depth=1", "--branch", &self.src.r#ref, &self.src.url])
            .arg(target_dir)
            .output()
            .map_err(|e| Error::GitClone {
                url: self.src.url.clone(),
                r#ref: self.src.r#ref.clone(),
                message: e.to_string(),
                hint: Some("Is git installed and on PATH?".to_string()),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);

        // Provide helpful error message for common auth failures
        if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            return Err(Error::GitClone {
                url: self.src.url.clone(),
                r#ref: self.src.r#ref.clone(),
                message: stderr.to_string(),
                hint: Some(
                    "Make sure you have access to the repository: an SSH key \
                     added to ssh-agent, git credentials configured, or a \
                     personal access token set up"
                        .to_string(),
                ),
            });
        }

        // The ref may be a commit SHA rather than a branch or tag.
        self.clone_full_and_checkout(target_dir, &stderr)
    }

    fn clone_full_and_checkout(&self, target_dir: &Path, shallow_stderr: &str) -> Result<()> {
        if target_dir.exists() {
            fs::remove_dir_all(target_dir)?;
        }

        let output = Command::new("git")
            .args(["clone", &self.src.url])
            .arg(target_dir)
            .output()
            .map_err(|e| Error::GitClone {
                url: self.src.url.clone(),
                r#ref: self.src.r#ref.clone(),
                message: e.to_string(),
                hint: None,
            })?;
        if !output.status.success() {
            // Report the original shallow-clone failure; it names the ref.
            return Err(Error::GitClone {
                url: self.src.url.clone(),
                r#ref: self.src.r#ref.clone(),
                message: shallow_stderr.to_string(),
                hint: None,
            });
        }

        let output = self.git_in(target_dir, &["checkout", "--detach", &self.src.r#ref])?;
        if !output.status.success() {
            return Err(Error::GitCommand {
                command: format!("checkout {}", self.src.r#ref),
                url: self.src.url.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(())
    }

    fn git_in(&self, work_tree: &Path, args: &[&str]) -> Result<std::process::Output> {
        Command::new("git")
            .arg("-C")
            .arg(work_tree)
            .args(args)
            .output()
            .map_err(|e| Error::GitCommand {
                command: args.join(" "),
                url: self.src.url.clone(),
                stderr: e.to_string(),
            })
    }

    fn resolved_output(&self, work_tree: &Path, args: &[&str]) -> Result<String> {
        let output = self.git_in(work_tree, args)?;
        if !output.status.success() {
            return Err(Error::GitCommand {
                command: args.join(" "),
                url: self.src.url.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Syncer for GitSync<'_> {
    fn desc(&self) -> String {
        format!("git from {}@{}", self.src.url, self.src.r#ref)
    }

    fn sync(&self, dst_path: &Path, _scratch_dir: &Path) -> Result<LockSource> {
        self.clone_into(dst_path)?;

        let sha = self.resolved_output(dst_path, &["rev-parse", "HEAD"])?;
        // Best-effort; an unborn or odd HEAD just leaves the title out.
        let commit_title = self
            .resolved_output(dst_path, &["log", "-1", "--format=%s"])
            .ok();

        // The working tree, not the repository, is what gets vendored.
        let git_dir = dst_path.join(".git");
        if git_dir.exists() {
            fs::remove_dir_all(&git_dir).map_err(|e| Error::Filesystem {
                message: format!("Removing '{}': {}", git_dir.display(), e),
            })?;
        }

        Ok(LockSource::Git {
            git: GitLock { sha, commit_title },
        })
    }
}
