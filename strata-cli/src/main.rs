use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strata_core::StoreConfig;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::*;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Load, index and reconcile JSON record sets")]
#[command(version)]
struct Cli {
    /// Store configuration file
    #[arg(short, long, default_value = "strata.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import records and print them in index order
    Import(ImportArgs),
    /// Reconcile a base record set with an incoming one
    Sync(SyncArgs),
    /// Configuration file commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = StoreConfig::load(&cli.config)?;
    debug!(?config, "Loaded store configuration");

    let result = match cli.command {
        Commands::Import(args) => execute_import(&config, args),
        Commands::Sync(args) => execute_sync(&config, args),
        Commands::Config { action } => execute_config_command(&config, &cli.config, action),
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result
}
