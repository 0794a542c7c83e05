//! GitHub release content syncer
//!
//! Resolves a release by tag (or `latest`) through the GitHub REST API,
//! downloads the assets matching the configured glob patterns into the
//! staging path, and records the concrete tag plus the asset names.
//!
//! An API token (recommended for private repositories and rate limits) is
//! taken from [`SyncOpts`]; the CLI wires it from `GITHUB_TOKEN`.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::GithubReleaseSource;
use crate::error::{Error, Result};
use crate::lock::{GithubReleaseLock, LockSource};
use crate::path::glob_match;
use crate::sync::{SyncOpts, Syncer};

const API_ROOT: &str = "https://api.github.com";

/// Release representation returned by the GitHub API (the fields we use)
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    browser_download_url: String,
}

/// Syncer for `github-release` content entries
pub struct GithubReleaseSync<'a> {
    src: &'a GithubReleaseSource,
    opts: &'a SyncOpts,
}

impl<'a> GithubReleaseSync<'a> {
    pub fn new(src: &'a GithubReleaseSource, opts: &'a SyncOpts) -> Self {
        Self { src, opts }
    }

    fn api_url(&self) -> String {
        if self.src.tag == "latest" {
            format!("{}/repos/{}/releases/latest", API_ROOT, self.src.slug)
        } else {
            format!(
                "{}/repos/{}/releases/tags/{}",
                API_ROOT, self.src.slug, self.src.tag
            )
        }
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let client = reqwest::blocking::Client::new();
        let mut request = client
            .get(url)
            // The GitHub API rejects requests without a user agent.
            .header("User-Agent", concat!("vendor-sync/", env!("CARGO_PKG_VERSION")));
        if let Some(token) = &self.opts.github_api_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let response = request.send().map_err(|e| Error::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        if !response.status().is_success() {
            return Err(Error::Network {
                url: url.to_string(),
                message: format!("HTTP status {}", response.status()),
            });
        }
        Ok(response)
    }

    fn resolve(&self) -> Result<Release> {
        let url = self.api_url();
        let release: Release = self.get(&url)?.json().map_err(|e| Error::Network {
            url,
            message: format!("Decoding release: {}", e),
        })?;
        Ok(release)
    }

    fn matching_assets<'r>(&self, release: &'r Release) -> Result<Vec<&'r Asset>> {
        let mut matched = Vec::new();
        for asset in &release.assets {
            for pattern in &self.src.assets {
                if glob_match(pattern, &asset.name)? {
                    matched.push(asset);
                    break;
                }
            }
        }
        Ok(matched)
    }
}

impl Syncer for GithubReleaseSync<'_> {
    fn desc(&self) -> String {
        format!("github release {}@{}", self.src.slug, self.src.tag)
    }

    fn sync(&self, dst_path: &Path, _scratch_dir: &Path) -> Result<LockSource> {
        let release = self.resolve()?;
        let assets = self.matching_assets(&release)?;
        if assets.is_empty() {
            return Err(Error::Network {
                url: self.api_url(),
                message: format!(
                    "Release {} has no assets matching {:?}",
                    release.tag_name, self.src.assets
                ),
            });
        }

        fs::create_dir_all(dst_path).map_err(|e| Error::Filesystem {
            message: format!("Creating directory '{}': {}", dst_path.display(), e),
        })?;

        let mut names = Vec::new();
        for asset in assets {
            let payload = self
                .get(&asset.browser_download_url)?
                .bytes()
                .map_err(|e| Error::Network {
                    url: asset.browser_download_url.clone(),
                    message: e.to_string(),
                })?;
            let file_path = dst_path.join(&asset.name);
            fs::write(&file_path, &payload).map_err(|e| Error::Filesystem {
                message: format!("Writing file '{}': {}", file_path.display(), e),
            })?;
            names.push(asset.name.clone());
        }

        Ok(LockSource::GithubRelease {
            github_release: GithubReleaseLock {
                tag: release.tag_name,
                assets: names,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(tag: &str, assets: &[&str]) -> GithubReleaseSource {
        GithubReleaseSource {
            slug: "acme/widget".to_string(),
            tag: tag.to_string(),
            assets: assets.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn release(assets: &[&str]) -> Release {
        Release {
            tag_name: "v2.0.0".to_string(),
            assets: assets
                .iter()
                .map(|name| Asset {
                    name: name.to_string(),
                    browser_download_url: format!("https://example.com/{}", name),
                })
                .collect(),
        }
    }

    #[test]
    fn test_api_url_for_tag() {
        let src = source("v2.0.0", &["*"]);
        let opts = SyncOpts::default();
        assert_eq!(
            GithubReleaseSync::new(&src, &opts).api_url(),
            "https://api.github.com/repos/acme/widget/releases/tags/v2.0.0"
        );
    }

    #[test]
    fn test_api_url_for_latest() {
        let src = source("latest", &["*"]);
        let opts = SyncOpts::default();
        assert_eq!(
            GithubReleaseSync::new(&src, &opts).api_url(),
            "https://api.github.com/repos/acme/widget/releases/latest"
        );
    }

    #[test]
    fn test_desc_names_slug_and_tag() {
        let src = source("latest", &["*"]);
        let opts = SyncOpts::default();
        assert_eq!(
            GithubReleaseSync::new(&src, &opts).desc(),
            "github release acme/widget@latest"
        );
    }

    #[test]
    fn test_matching_assets_by_pattern() {
        let src = source("latest", &["*.tar.zst", "checksums.txt"]);
        let opts = SyncOpts::default();
        let sync = GithubReleaseSync::new(&src, &opts);
        let release = release(&["widget-linux.tar.zst", "widget.msi", "checksums.txt"]);

        let matched: Vec<&str> = sync
            .matching_assets(&release)
            .unwrap()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(matched, vec!["widget-linux.tar.zst", "checksums.txt"]);
    }

    #[test]
    fn test_matching_assets_deduplicates_across_patterns() {
        let src = source("latest", &["*", "widget.msi"]);
        let opts = SyncOpts::default();
        let sync = GithubReleaseSync::new(&src, &opts);
        let release = release(&["widget.msi"]);

        let matched = sync.matching_assets(&release).unwrap();
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn test_release_json_decoding() {
        let json = r#"{
            "tag_name": "v2.0.0",
            "name": "Widget 2.0",
            "assets": [
                {"name": "widget.tar.zst", "browser_download_url": "https://example.com/widget.tar.zst", "size": 12}
            ]
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "v2.0.0");
        assert_eq!(release.assets[0].name, "widget.tar.zst");
    }
}
