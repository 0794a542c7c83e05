//! # Path Filtering
//!
//! Prunes a staged subtree after a content syncer completes, per the
//! entry's include/exclude glob rules:
//!
//! - When include rules exist, a file must match at least one of them to be
//!   kept; no include rules admits all files.
//! - A file matching any exclude rule is removed; exclude wins over include
//!   on conflict.
//! - Directories left empty by the removals are pruned bottom-up.
//!
//! Patterns are compiled up front, so a malformed glob is a configuration
//! error raised before any filesystem mutation. Symbolic links are treated
//! as plain entries and never followed, so fetched content cannot direct
//! the walk outside the staged subtree.

use glob::Pattern;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::Contents;
use crate::error::{Error, Result};

/// Compiled include/exclude rules for one content entry
#[derive(Debug)]
pub struct FileFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl FileFilter {
    /// Compile a filter from raw glob rules.
    pub fn new(include: &[String], exclude: &[String]) -> Result<FileFilter> {
        let compile = |patterns: &[String]| -> Result<Vec<Pattern>> {
            patterns
                .iter()
                .map(|p| Pattern::new(p).map_err(Error::Glob))
                .collect()
        };
        Ok(FileFilter {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Compile the filter configured on a content entry.
    pub fn from_contents(contents: &Contents) -> Result<FileFilter> {
        FileFilter::new(&contents.include, &contents.exclude)
    }

    /// Whether a path relative to the staged root survives the rules.
    fn keeps(&self, relative: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches(relative)) {
            return false;
        }
        !self.exclude.iter().any(|p| p.matches(relative))
    }

    /// Apply the rules to a staged subtree, removing files that do not
    /// survive and pruning directories emptied by the removals.
    pub fn apply(&self, root: &Path) -> Result<()> {
        if self.include.is_empty() && self.exclude.is_empty() {
            return Ok(());
        }
        if root.is_file() {
            // A single staged file (e.g. an http download) filters against
            // its own name.
            let name = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !self.keeps(&name) {
                remove_file(root)?;
            }
            return Ok(());
        }

        // contents_first yields children before their parent, which makes
        // the empty-directory pruning a single pass.
        for entry in WalkDir::new(root).follow_links(false).contents_first(true) {
            let entry = entry.map_err(|e| Error::Filesystem {
                message: format!("Walking staged tree '{}': {}", root.display(), e),
            })?;
            let path = entry.path();
            if path == root {
                continue;
            }

            if entry.file_type().is_dir() {
                let is_empty = fs::read_dir(path)
                    .map_err(|e| Error::Filesystem {
                        message: format!("Reading directory '{}': {}", path.display(), e),
                    })?
                    .next()
                    .is_none();
                if is_empty {
                    fs::remove_dir(path).map_err(|e| Error::Filesystem {
                        message: format!("Removing directory '{}': {}", path.display(), e),
                    })?;
                }
                continue;
            }

            let relative = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            if !self.keeps(&relative) {
                remove_file(path)?;
            }
        }

        Ok(())
    }
}

fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| Error::Filesystem {
        message: format!("Removing file '{}': {}", path.display(), e),
    })
}
