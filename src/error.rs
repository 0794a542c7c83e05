//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for
//! `vendor-sync`. It uses the `thiserror` library to create a comprehensive
//! `Error` enum that covers all anticipated failure modes, providing clear
//! and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures.
//!
//! The variants fall into three families:
//!
//! - Configuration errors (`ConfigParse`, `UnknownContents`,
//!   `AmbiguousContents`, `Glob`, ...): detected, where possible, before
//!   any filesystem mutation.
//! - Filesystem errors (`Filesystem`, `Io`): the `Filesystem` message
//!   always carries the path involved.
//! - Source errors (`GitClone`, `GitCommand`, `Network`, `Tool`, `Archive`)
//!  : opaque failures from a content syncer, propagated wrapped with the
//!   content path (`Sync`/`Filter`) without reinterpretation.

use thiserror::Error;

/// Main error type for vendor-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing or validating the `.vendor-sync.yaml`
    /// configuration file.
    ///
    /// This error includes the specific issue and optionally a hint about
    /// how to fix it.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A content entry has no source kind populated.
    #[error("Unknown contents type for '{path}' (known: git, http, image, github-release, helm-chart, manual, directory)")]
    UnknownContents { path: String },

    /// A content entry has more than one source kind populated.
    #[error("Multiple contents types for '{path}': {kinds}")]
    AmbiguousContents { path: String, kinds: String },

    /// An error occurred while cloning a Git repository.
    ///
    /// Includes the repository URL, ref (branch/tag), error message, and an
    /// optional hint for resolution.
    #[error("Git clone error for {url}@{r#ref}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// An error occurred while executing a Git command.
    #[error("Git command failed for {url}: {command} - {stderr}")]
    GitCommand {
        command: String,
        url: String,
        stderr: String,
    },

    /// An external tool (helm, imgpkg, ...) failed or could not be run.
    #[error("Tool error: {tool} - {message}")]
    Tool { tool: String, message: String },

    /// An error occurred during a network operation.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// An error occurred while unpacking an archive.
    #[error("Archive error: {message}")]
    Archive { message: String },

    /// An error occurred with a filesystem operation.
    ///
    /// The message always names the path involved.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// A syncer failed for one content entry; wraps the underlying error
    /// with the content path.
    #[error("Syncing directory contents '{path}': {source}")]
    Sync {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// Path filtering failed for one content entry; wraps the underlying
    /// error with the content path.
    #[error("Filtering paths in directory contents '{path}': {source}")]
    Filter {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON decoding error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A semantic versioning parsing error, wrapped from `semver::Error`.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),
}

impl Error {
    /// Wrap an error with the content path it occurred for.
    pub fn syncing(path: &str, source: Error) -> Self {
        Error::Sync {
            path: path.to_string(),
            source: Box::new(source),
        }
    }

    /// Wrap a filter error with the content path it occurred for.
    pub fn filtering(path: &str, source: Error) -> Self {
        Error::Filter {
            path: path.to_string(),
            source: Box::new(source),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_parse() {
        let error = Error::ConfigParse {
            message: "Invalid YAML".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration error"));
        assert!(display.contains("Invalid YAML"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "Missing url field".to_string(),
            hint: Some("Add 'url:' to the git block".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration error"));
        assert!(display.contains("Missing url field"));
        assert!(display.contains("hint:"));
        assert!(display.contains("Add 'url:'"));
    }

    #[test]
    fn test_error_display_unknown_contents() {
        let error = Error::UnknownContents {
            path: "vendor/widget".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Unknown contents type"));
        assert!(display.contains("vendor/widget"));
        assert!(display.contains("github-release"));
    }

    #[test]
    fn test_error_display_ambiguous_contents() {
        let error = Error::AmbiguousContents {
            path: "vendor/widget".to_string(),
            kinds: "git, http".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Multiple contents types"));
        assert!(display.contains("vendor/widget"));
        assert!(display.contains("git, http"));
    }

    #[test]
    fn test_error_display_git_clone() {
        let error = Error::GitClone {
            url: "https://github.com/test/repo.git".to_string(),
            r#ref: "main".to_string(),
            message: "Authentication failed".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Git clone error"));
        assert!(display.contains("https://github.com/test/repo.git"));
        assert!(display.contains("main"));
        assert!(display.contains("Authentication failed"));
    }

    #[test]
    fn test_error_display_git_command() {
        let error = Error::GitCommand {
            command: "rev-parse HEAD".to_string(),
            url: "https://github.com/test/repo.git".to_string(),
            stderr: "Permission denied".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git command failed"));
        assert!(display.contains("rev-parse HEAD"));
        assert!(display.contains("Permission denied"));
    }

    #[test]
    fn test_error_display_tool() {
        let error = Error::Tool {
            tool: "helm".to_string(),
            message: "chart not found".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Tool error"));
        assert!(display.contains("helm"));
        assert!(display.contains("chart not found"));
    }

    #[test]
    fn test_error_display_network() {
        let error = Error::Network {
            url: "https://example.com".to_string(),
            message: "Connection timeout".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Network operation error"));
        assert!(display.contains("https://example.com"));
        assert!(display.contains("Connection timeout"));
    }

    #[test]
    fn test_error_display_sync_wraps_path_and_source() {
        let inner = Error::Filesystem {
            message: "Manual source 'out/local' not found".to_string(),
        };
        let error = Error::syncing("local", inner);
        let display = format!("{}", error);
        assert!(display.contains("Syncing directory contents 'local'"));
        assert!(display.contains("out/local"));
    }

    #[test]
    fn test_error_display_filter_wraps_path() {
        let inner = Error::Filesystem {
            message: "Removing file 'a.txt': denied".to_string(),
        };
        let error = Error::filtering("vendor/widget", inner);
        let display = format!("{}", error);
        assert!(display.contains("Filtering paths in directory contents 'vendor/widget'"));
        assert!(display.contains("a.txt"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_str = "invalid: [unclosed";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: Error = yaml_error.into();
        let display = format!("{}", error);
        assert!(display.contains("YAML parsing error"));
    }

    #[test]
    fn test_error_from_glob_error() {
        let glob_error = glob::Pattern::new("[invalid").unwrap_err();
        let error: Error = glob_error.into();
        let display = format!("{}", error);
        assert!(display.contains("Glob pattern error"));
    }
}
