//! Command-line interface for repo-audit
//!
//! Provides `audit`, `chunks` and `serve` subcommands sharing one configuration layer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod audit;
mod chunks;
mod serve;
mod utils;

/// Audit a GitHub repository against a list of implementation tasks
#[derive(Parser)]
#[command(name = "repo-audit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fold a repository through the model and print the updated tasks
    Audit(Box<audit::AuditArgs>),

    /// Show how a repository would be chunked, without calling the model
    Chunks(Box<chunks::ChunksArgs>),

    /// Serve audits over HTTP
    Serve(Box<serve::ServeArgs>),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Audit(args) => audit::run(*args),
        Commands::Chunks(args) => chunks::run(*args),
        Commands::Serve(args) => serve::run(*args),
    }
}
