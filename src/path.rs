//! Path manipulation utilities for vendor-sync

use crate::error::{Error, Result};
use glob::Pattern;
use std::path::{Component, Path};

/// Match a path against a glob pattern
pub fn glob_match(pattern: &str, path: &str) -> Result<bool> {
    let pattern = Pattern::new(pattern).map_err(Error::Glob)?;
    Ok(pattern.matches(path))
}

/// Check that a configured content path is a clean relative path.
///
/// Absolute paths and `..` components would let a content entry escape its
/// destination directory, so they are rejected during validation.
pub fn is_clean_relative(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    Path::new(path).components().all(|c| match c {
        Component::Normal(_) | Component::CurDir => true,
        Component::ParentDir | Component::RootDir | Component::Prefix(_) => false,
    })
}

/// Encode a path segment to be filesystem-safe
///
/// Used to derive staging-root directory names from destination paths.
pub fn encode_path(path: &str) -> String {
    path.chars()
        .map(|c| match c {
            '/' => '-',
            '\\' => '-',
            ':' => '_',
            '*' => '_',
            '?' => '_',
            '"' => '_',
            '<' => '_',
            '>' => '_',
            '|' => '_',
            // Keep alphanumeric, dots, dashes, underscores as-is
            c if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' => c,
            // Replace other characters with underscores
            _ => '_',
        })
        .collect()
}
