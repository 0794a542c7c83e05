//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use vendor_sync::output::OutputConfig;

/// Vendor Sync - Vendor external content with a reproducible lock file
#[derive(Parser, Debug)]
#[command(name = "vendor-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync all configured directories and write the lock file
    Sync(commands::sync::SyncArgs),
    /// Validate a .vendor-sync.yaml configuration file
    Validate(commands::validate::ValidateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging();
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Sync(args) => commands::sync::execute(args, &output),
            Commands::Validate(args) => commands::validate::execute(args, &output),
        }
    }

    fn init_logging(&self) {
        let env = env_logger::Env::default().default_filter_or(&self.log_level);
        let mut builder = env_logger::Builder::from_env(env);
        builder.format_timestamp(None);
        // Ignore double initialization (happens under test harnesses).
        let _ = builder.try_init();
    }
}
