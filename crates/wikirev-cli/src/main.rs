//! wikirev CLI
//!
//! Command-line interface for wikirev

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wikirev_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "wikirev")]
#[command(about = "wikirev - Mirror a wiki's edit history into git", long_about = None)]
struct Cli {
    /// Run configuration (TOML); ./wikirev.toml is used when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON log lines instead of human-readable ones
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build or resume the revision catalog without replaying it
    Catalog(commands::catalog::CatalogArgs),
    /// Build the catalog, replay it into the target and finalize
    Sync(commands::sync::SyncArgs),
    /// Show the progress of a target
    Status(commands::status::StatusArgs),
}

fn main() {
    let cli = Cli::parse();

    logging_facility::init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::execute(args, config),
        Commands::Sync(args) => commands::sync::execute(args, config),
        Commands::Status(args) => commands::status::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
