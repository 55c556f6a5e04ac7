//! Quader - cube synchronization CLI
//!
//! Main entry point: wires configuration, logging, the catalog client and
//! the filesystem store together behind four subcommands.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quader_domain::Config;
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "quader", version, about = "Sync statistical data cubes from a remote catalog")]
struct Cli {
    /// Path to a config file (default: probe standard locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bootstrap a new storage root
    Init {
        /// Directory to create
        directory: PathBuf,
    },
    /// Fetch the catalog and download stale cubes
    Update {
        /// Only consider cubes whose name starts with this prefix
        #[arg(long)]
        prefix: Option<String>,
        /// Re-download even when the local revision is current
        #[arg(long)]
        force: bool,
    },
    /// Serialize facts of all cubes due for export
    Export {
        /// Only consider cubes whose name starts with this prefix
        #[arg(long)]
        prefix: Option<String>,
        /// Export even when nothing changed since the last export
        #[arg(long)]
        force: bool,
        /// Write one JSON file per fact into this directory instead of
        /// streaming JSON lines to stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print per-cube sync state as CSV
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env before anything reads them
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init { directory } => {
            let _guard = logging::init(None);
            commands::init::run(&directory)
        }
        Command::Update { prefix, force } => {
            let (config, _guard) = setup(cli.config)?;
            commands::update::run(&config, prefix.as_deref(), force).await
        }
        Command::Export { prefix, force, output, pretty } => {
            let (config, _guard) = setup(cli.config)?;
            commands::export::run(&config, prefix.as_deref(), force, output.as_deref(), pretty)
        }
        Command::Status => {
            let (config, _guard) = setup(cli.config)?;
            commands::status::run(&config)
        }
    }
}

/// Resolve configuration, then initialize logging. File logging attaches
/// to the storage's `logs/` directory, so config has to come first.
fn setup(config_path: Option<PathBuf>) -> anyhow::Result<(Config, Option<WorkerGuard>)> {
    let config = match config_path {
        Some(path) => quader_infra::config::load_from_file(Some(path))?,
        None => quader_infra::config::load()?,
    };
    let log_dir =
        config.storage.file_logging.then(|| PathBuf::from(&config.storage.root).join("logs"));
    let guard = logging::init(log_dir.as_deref());
    Ok((config, guard))
}
