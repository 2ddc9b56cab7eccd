//! Knotwork CLI
//!
//! # Commands
//! - `knotwork serve --config <file>` - Start the HTTP server
//! - `knotwork check --config <file>` - Validate a configuration file

mod check;
mod config;
mod serve;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Knotwork CLI
#[derive(Parser)]
#[command(name = "knotwork")]
#[command(author, version, about = "Fragment assembly server")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Configuration file
        #[arg(short, long, default_value = "knotwork.toml")]
        config: PathBuf,
    },

    /// Validate a configuration file without starting anything
    Check {
        /// Configuration file
        #[arg(short, long, default_value = "knotwork.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            match cli.log_format {
                LogFormat::Pretty => knotwork_observe::init_stdout_tracing(),
                LogFormat::Json => knotwork_observe::init_json_tracing(),
            }
            serve::run_serve_command(&config)
        }
        Commands::Check { config } => check::run_check_command(&config),
    }
}
