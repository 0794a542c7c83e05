//! Validate command implementation
//!
//! Runs every configuration check that is possible without touching the
//! network or the destination trees: YAML schema, exactly-one-source per
//! entry, clean content paths, filter globs, and the min-version gate.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use vendor_sync::config::{self, DEFAULT_CONFIG_FILE};
use vendor_sync::output::{emoji, OutputConfig};

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "VENDOR_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the validate command
pub fn execute(args: ValidateArgs, output: &OutputConfig) -> Result<()> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if !config_path.exists() {
        anyhow::bail!("Configuration file not found: {}", config_path.display());
    }

    let config = config::from_file(&config_path)?;
    config.check_min_version(env!("CARGO_PKG_VERSION"))?;
    config.validate()?;

    if !args.quiet {
        let contents_count: usize = config.directories.iter().map(|d| d.contents.len()).sum();
        println!(
            "{} Configuration valid: {} directories, {} content entries",
            emoji(output, "✅", "[OK]"),
            config.directories.len(),
            contents_count
        );
    }
    Ok(())
}
