//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the
//! `.vendor-sync.yaml` configuration file, as well as the logic for parsing
//! and validating it.
//!
//! ## Key Components
//!
//! - **`Config`**: The root of the configuration: an optional minimum
//!   required tool version plus an ordered list of directories to sync.
//!
//! - **`Directory`**: One destination directory and its ordered list of
//!   content entries. Order is meaningful: it is the order of application
//!   and of lock-record emission.
//!
//! - **`Contents`**: One content entry: a relative destination path,
//!   exactly one populated source-kind block, and optional include/exclude
//!   path filters.
//!
//! - **`ContentSource`**: The validated sum type over the source kinds. A
//!   raw `Contents` carries one optional field per kind (mirroring the YAML
//!   shape); `Contents::source` checks that exactly one is populated and
//!   returns the corresponding variant, so downstream dispatch is an
//!   exhaustive match with no default branch.
//!
//! ## Validation
//!
//! `Config::validate` performs all checks that are possible before any
//! filesystem mutation: exactly-one-source per entry, clean relative content
//! paths, unique directory and content paths, and well-formed filter globs.

use crate::error::{Error, Result};
use crate::path;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".vendor-sync.yaml";

/// Git source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitSource {
    /// The URL of the Git repository to vendor.
    pub url: String,
    /// The Git reference (branch name, tag, or commit SHA) to fetch.
    pub r#ref: String,
}

/// HTTP source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSource {
    /// The URL to download.
    pub url: String,
    /// Unpack the downloaded payload instead of storing it as a file.
    ///
    /// Only zip archives are supported.
    #[serde(default)]
    pub unpack: bool,
}

/// OCI image source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSource {
    /// The image reference (e.g. `registry.example.com/org/app:v1`).
    pub url: String,
}

/// GitHub release source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubReleaseSource {
    /// The `owner/repo` slug of the repository.
    pub slug: String,
    /// The release tag to resolve, or `latest`.
    #[serde(default = "default_release_tag")]
    pub tag: String,
    /// Glob patterns selecting which release assets to download.
    #[serde(default = "default_asset_patterns")]
    pub assets: Vec<String>,
}

/// Get the default release tag for github-release sources
pub fn default_release_tag() -> String {
    "latest".to_string()
}

/// Get the default asset patterns for github-release sources
pub fn default_asset_patterns() -> Vec<String> {
    vec!["*".to_string()]
}

/// Helm chart source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelmChartSource {
    /// The chart repository URL.
    pub repository: String,
    /// The chart name.
    pub name: String,
    /// The chart version; latest when omitted.
    #[serde(default)]
    pub version: Option<String>,
}

/// Manual source configuration
///
/// Marks content that is managed by hand: the directory already present at
/// the content path inside the destination is carried through the sync
/// unchanged. Written as `manual: {}` in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualSource {}

/// Local directory source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySource {
    /// The local directory tree to copy.
    pub path: String,
}

/// The validated source kind of one content entry.
///
/// Produced by [`Contents::source`]; dispatching over this enum is
/// exhaustive, so a new source kind cannot be added without every dispatch
/// site being updated.
#[derive(Debug, Clone, Copy)]
pub enum ContentSource<'a> {
    Git(&'a GitSource),
    Http(&'a HttpSource),
    Image(&'a ImageSource),
    GithubRelease(&'a GithubReleaseSource),
    HelmChart(&'a HelmChartSource),
    Manual(&'a ManualSource),
    Directory(&'a DirectorySource),
}

impl ContentSource<'_> {
    /// The configuration key for this source kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentSource::Git(_) => "git",
            ContentSource::Http(_) => "http",
            ContentSource::Image(_) => "image",
            ContentSource::GithubRelease(_) => "github-release",
            ContentSource::HelmChart(_) => "helm-chart",
            ContentSource::Manual(_) => "manual",
            ContentSource::Directory(_) => "directory",
        }
    }
}

/// One content entry of a directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contents {
    /// Destination path of this entry, relative to the directory path.
    pub path: String,

    /// Git source; mutually exclusive with the other source kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSource>,
    /// HTTP source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpSource>,
    /// OCI image source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSource>,
    /// GitHub release source.
    #[serde(
        default,
        rename = "github-release",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_release: Option<GithubReleaseSource>,
    /// Helm chart source.
    #[serde(default, rename = "helm-chart", skip_serializing_if = "Option::is_none")]
    pub helm_chart: Option<HelmChartSource>,
    /// Manually managed content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual: Option<ManualSource>,
    /// Local directory source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<DirectorySource>,

    /// Glob patterns for files to keep; all files when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// Glob patterns for files to remove; wins over `include`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl Contents {
    /// Return the single populated source kind of this entry.
    ///
    /// Zero populated kinds or more than one are configuration errors; both
    /// cases name the content path.
    pub fn source(&self) -> Result<ContentSource<'_>> {
        let mut found = Vec::new();
        if let Some(git) = &self.git {
            found.push(ContentSource::Git(git));
        }
        if let Some(http) = &self.http {
            found.push(ContentSource::Http(http));
        }
        if let Some(image) = &self.image {
            found.push(ContentSource::Image(image));
        }
        if let Some(release) = &self.github_release {
            found.push(ContentSource::GithubRelease(release));
        }
        if let Some(chart) = &self.helm_chart {
            found.push(ContentSource::HelmChart(chart));
        }
        if let Some(manual) = &self.manual {
            found.push(ContentSource::Manual(manual));
        }
        if let Some(directory) = &self.directory {
            found.push(ContentSource::Directory(directory));
        }

        match found.len() {
            0 => Err(Error::UnknownContents {
                path: self.path.clone(),
            }),
            1 => Ok(found.remove(0)),
            _ => Err(Error::AmbiguousContents {
                path: self.path.clone(),
                kinds: found
                    .iter()
                    .map(|s| s.kind())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Validate everything about this entry that does not require I/O.
    pub fn validate(&self) -> Result<()> {
        if !path::is_clean_relative(&self.path) {
            return Err(Error::ConfigParse {
                message: format!("Invalid contents path '{}'", self.path),
                hint: Some("Content paths must be relative and must not contain '..'".to_string()),
            });
        }

        self.source()?;

        for pattern in self.include.iter().chain(self.exclude.iter()) {
            glob::Pattern::new(pattern).map_err(Error::Glob)?;
        }

        if let Some(release) = &self.github_release {
            for pattern in &release.assets {
                glob::Pattern::new(pattern).map_err(Error::Glob)?;
            }
        }

        Ok(())
    }
}

/// One destination directory and its ordered content entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directory {
    /// Destination path of the directory, absolute or relative.
    pub path: String,
    /// Ordered content entries; also the lock-record emission order.
    #[serde(default)]
    pub contents: Vec<Contents>,
}

impl Directory {
    /// Validate this directory and all of its content entries.
    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(Error::ConfigParse {
                message: "Directory path must not be empty".to_string(),
                hint: None,
            });
        }

        let mut seen = HashSet::new();
        for contents in &self.contents {
            contents.validate()?;
            if !seen.insert(contents.path.as_str()) {
                return Err(Error::ConfigParse {
                    message: format!(
                        "Duplicate contents path '{}' in directory '{}'",
                        contents.path, self.path
                    ),
                    hint: None,
                });
            }
        }
        Ok(())
    }
}

/// Root of the `.vendor-sync.yaml` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Minimum vendor-sync version this configuration requires.
    #[serde(
        default,
        rename = "min-version",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_version: Option<String>,
    /// Ordered list of directories to sync.
    #[serde(default)]
    pub directories: Vec<Directory>,
}

impl Config {
    /// Validate the whole configuration without touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for directory in &self.directories {
            directory.validate()?;
            if !seen.insert(directory.path.as_str()) {
                return Err(Error::ConfigParse {
                    message: format!("Duplicate directory path '{}'", directory.path),
                    hint: None,
                });
            }
        }
        Ok(())
    }

    /// Check the `min-version` requirement against the running version.
    pub fn check_min_version(&self, current: &str) -> Result<()> {
        let Some(required) = &self.min_version else {
            return Ok(());
        };
        let required_version = Version::parse(required).map_err(Error::Semver)?;
        let current_version = Version::parse(current).map_err(Error::Semver)?;
        if current_version < required_version {
            return Err(Error::ConfigParse {
                message: format!(
                    "Configuration requires vendor-sync >= {}, this is {}",
                    required_version, current_version
                ),
                hint: Some("Upgrade vendor-sync or lower the min-version field".to_string()),
            });
        }
        Ok(())
    }
}

/// Parse a YAML configuration string into a `Config`.
///
/// Parsing alone does not guarantee validity: call [`Config::validate`] for
/// the semantic checks (exactly-one-source, clean paths, glob patterns).
pub fn parse(yaml: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: None,
    })?;
    Ok(config)
}

/// Load and parse a configuration file.
pub fn from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path).map_err(|e| Error::Filesystem {
        message: format!("Reading config file '{}': {}", path.display(), e),
    })?;
    parse(&contents)
}
