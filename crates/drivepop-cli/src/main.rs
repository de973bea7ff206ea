//! drivepop CLI - Mirror a local directory into Google Drive
//!
//! Provides commands for:
//! - Mirroring the source tree (`populate`)
//! - Mirroring and then handling unmanaged remote items (`run`, `purge`)
//! - Inspecting and validating the configuration (`config`)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use drivepop_core::config::Config;

mod commands;
mod output;

use commands::{
    config::ConfigCommand, populate::PopulateCommand, purge::PurgeCommand, run::RunCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "drivepop",
    version,
    about = "Mirror a local directory tree into Google Drive"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file (default: ./.drivepop.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Mirror the source tree, then apply the configured deletion policy
    Run(RunCommand),
    /// Mirror the source tree only
    Populate(PopulateCommand),
    /// Mirror the source tree, then apply a deletion policy
    Purge(PurgeCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Log level when neither `RUST_LOG` nor `-v`/`-q` decide it
fn default_level(cli: &Cli, config_path: &std::path::Path) -> String {
    match (cli.quiet, cli.verbose) {
        (true, _) => "warn".to_string(),
        (false, 1) => "debug".to_string(),
        (false, v) if v >= 2 => "trace".to_string(),
        _ => Config::load(config_path)
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    // Setup tracing
    let level = default_level(&cli, &config_path);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Run(cmd) => cmd.execute(&config_path, format).await,
        Commands::Populate(cmd) => cmd.execute(&config_path, format).await,
        Commands::Purge(cmd) => cmd.execute(&config_path, format).await,
        Commands::Config(cmd) => cmd.execute(&config_path, format).await,
    }
}
