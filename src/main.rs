//! Binary entry point for uniqflow.
//!
//! This binary provides the CLI interface for the uniqflow deduplication stage.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use uniqflow::config::UniqflowConfig;
use uniqflow::observability::{self, LoggingConfig};

use commands::RunArgs;

/// Uniqflow - batch deduplication for record pipelines.
#[derive(Parser)]
#[command(name = "uniqflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "UNIQFLOW_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Deduplicate a file of records.
    Run(RunArgs),

    /// Show configuration.
    Config {
        /// Show the effective configuration.
        #[arg(long)]
        show: bool,
    },

    /// Parse a key expression and evaluate it against attributes.
    CheckKey {
        /// Key expression, e.g. `${custom_id}`.
        #[arg(short, long)]
        key: String,

        /// Attributes as `name=value` pairs.
        attributes: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match UniqflowConfig::load(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(LoggingConfig::from_settings(
        Some(&loaded.config.logging),
        cli.verbose,
    )) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    // Config loading runs before the subscriber exists.
    for skipped in &loaded.skipped {
        tracing::warn!(
            path = %skipped.path.display(),
            error = %skipped.error,
            "Ignoring unreadable config file"
        );
    }

    let config = loaded.config;
    match run_command(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: UniqflowConfig) -> uniqflow::Result<()> {
    match cli.command {
        Commands::Run(args) => commands::cmd_run(config, args),
        Commands::Config { show } => commands::cmd_config(&config, cli.config.as_deref(), show),
        Commands::CheckKey { key, attributes } => commands::cmd_check_key(&key, &attributes),
    }
}
