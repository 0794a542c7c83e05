//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(configs::DIRECTORY_KIND);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[allow(unused_imports)]
    pub use super::tree_snapshot;
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// One directory fed from a local `shared-src` tree.
    pub const DIRECTORY_KIND: &str = r#"
directories:
  - path: out
    contents:
      - path: shared
        directory: {path: shared-src}
"#;

    /// Same source, with include/exclude filter rules.
    pub const DIRECTORY_KIND_FILTERED: &str = r#"
directories:
  - path: out
    contents:
      - path: shared
        directory: {path: shared-src}
        include: ["*.txt"]
        exclude: ["sub/*"]
"#;

    /// A content entry with no source kind populated.
    pub const NO_SOURCE_KIND: &str = r#"
directories:
  - path: out
    contents:
      - path: widget
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "directories: [unclosed";

    /// Empty configuration.
    pub const EMPTY: &str = "directories: []\n";
}

/// A test fixture that provides a temporary directory with optional config.
///
/// This struct simplifies the common pattern of creating a temp directory
/// and populating it with a `.vendor-sync.yaml` configuration file plus
/// source trees for the local `directory` content kind.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.vendor-sync.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child(".vendor-sync.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add the standard `shared-src` source tree used by the config
    /// snippets: {a.txt, b.log, sub/c.txt}.
    pub fn with_shared_source(self) -> Self {
        self.with_file("shared-src/a.txt", "alpha")
            .with_file("shared-src/b.log", "beta")
            .with_file("shared-src/sub/c.txt", "gamma")
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join(".vendor-sync.yaml")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("vendor-sync")
            .expect("vendor-sync binary should build");
        cmd.current_dir(self.path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot a directory tree as sorted (relative path, contents) pairs.
///
/// Used for byte-identity assertions (idempotence) and before/after
/// comparisons (atomicity).
#[allow(dead_code)]
pub fn tree_snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    if !root.exists() {
        return Vec::new();
    }
    let mut files: Vec<(String, Vec<u8>)> = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            let contents = std::fs::read(e.path()).unwrap();
            (relative, contents)
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_config(configs::EMPTY);
        assert!(fixture.config_path().exists());
    }

    #[test]
    fn test_fixture_with_shared_source() {
        let fixture = TestFixture::new().with_shared_source();
        assert!(fixture.path().join("shared-src/a.txt").exists());
        assert!(fixture.path().join("shared-src/sub/c.txt").exists());
    }

    #[test]
    fn test_tree_snapshot_sorted_and_missing_root() {
        let fixture = TestFixture::new()
            .with_file("tree/b.txt", "b")
            .with_file("tree/a.txt", "a");

        let snapshot = tree_snapshot(&fixture.path().join("tree"));
        let names: Vec<&str> = snapshot.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);

        assert!(tree_snapshot(&fixture.path().join("absent")).is_empty());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        let configs = [
            configs::DIRECTORY_KIND,
            configs::DIRECTORY_KIND_FILTERED,
            configs::NO_SOURCE_KIND,
            configs::EMPTY,
        ];
        for config in configs {
            serde_yaml::from_str::<serde_yaml::Value>(config).expect("Config should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}
