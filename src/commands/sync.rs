//! Sync command implementation
//!
//! Loads and validates the configuration, runs the directory sync engine
//! for every configured directory (or the subset selected with
//! `--directory`), and writes the resulting lock file.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use vendor_sync::config::{self, DEFAULT_CONFIG_FILE};
use vendor_sync::lock::{LockConfig, LockDirectory, DEFAULT_LOCK_FILE};
use vendor_sync::output::{emoji, OutputConfig};
use vendor_sync::sync::{sync_directories, SyncOpts};

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "VENDOR_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the lock file to write
    #[arg(short, long, value_name = "PATH", env = "VENDOR_SYNC_LOCK")]
    pub lock_file: Option<PathBuf>,

    /// Sync only the directory with this path (repeatable)
    #[arg(short, long = "directory", value_name = "PATH")]
    pub directories: Vec<String>,

    /// Helm binary used for helm-chart contents
    #[arg(long, value_name = "BIN", env = "VENDOR_SYNC_HELM_BINARY", default_value = "helm")]
    pub helm_binary: String,

    /// imgpkg-compatible binary used for image contents
    #[arg(long, value_name = "BIN", env = "VENDOR_SYNC_IMGPKG_BINARY", default_value = "imgpkg")]
    pub imgpkg_binary: String,

    /// GitHub API token for github-release contents
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_api_token: Option<String>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the sync command
pub fn execute(args: SyncArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();

    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if !config_path.exists() {
        anyhow::bail!("Configuration file not found: {}", config_path.display());
    }
    let lock_path = args
        .lock_file
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCK_FILE));

    let mut config = config::from_file(&config_path)?;
    config.check_min_version(env!("CARGO_PKG_VERSION"))?;
    config.validate()?;

    // --directory narrows the run to a subset of the configured paths.
    let partial = !args.directories.is_empty();
    if partial {
        for requested in &args.directories {
            if !config.directories.iter().any(|d| &d.path == requested) {
                anyhow::bail!("Directory '{}' is not in the configuration", requested);
            }
        }
        config
            .directories
            .retain(|d| args.directories.contains(&d.path));
    }

    let opts = SyncOpts {
        github_api_token: args.github_api_token,
        helm_binary: args.helm_binary,
        imgpkg_binary: args.imgpkg_binary,
    };

    let result = sync_directories(&config, &opts);

    match result {
        Ok(lock) => {
            let directory_count = lock.directories.len();
            let contents_count: usize =
                lock.directories.iter().map(|d| d.contents.len()).sum();

            let lock = if partial {
                merge_with_existing(&lock_path, lock.directories)?
            } else {
                lock
            };
            lock.write_to_file(&lock_path)?;

            if !args.quiet {
                let duration = start_time.elapsed();
                println!(
                    "{} Synced {} directories ({} contents) in {:.2}s",
                    emoji(output, "✅", "[OK]"),
                    directory_count,
                    contents_count,
                    duration.as_secs_f64()
                );
                println!("   Lock written to: {}", lock_path.display());
            }
            Ok(())
        }
        Err(e) => {
            if !args.quiet {
                println!("{} Sync failed", emoji(output, "❌", "[FAIL]"));
            }
            Err(e.into())
        }
    }
}

/// Fold a partial sync's lock records into the existing lock file, so the
/// directories that were not re-synced keep their previous entries.
fn merge_with_existing(lock_path: &PathBuf, updated: Vec<LockDirectory>) -> Result<LockConfig> {
    let mut merged = if lock_path.exists() {
        LockConfig::from_file(lock_path)?
    } else {
        LockConfig::default()
    };

    for directory in updated {
        match merged
            .directories
            .iter_mut()
            .find(|d| d.path == directory.path)
        {
            Some(existing) => *existing = directory,
            None => merged.directories.push(directory),
        }
    }
    Ok(merged)
}
