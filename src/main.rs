//! Entry point for aether, a streaming assistant front-end for the terminal.
//!
//! This binary loads environment variables, sets up logging, parses CLI
//! arguments via [`cli`], and dispatches to the appropriate subcommand handler.

mod app;
mod assistant;
mod chat;
mod cli;
mod config;
mod constants;
mod error;
mod message;
mod orchestrator;
mod output;
mod search;
mod session;
mod tools;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::constants::{DEFAULT_LOG_FILTER, LOG_ENV_VAR};

/// Runs the aether CLI.
///
/// Loads `.env` files (silently ignored if absent), installs a stderr log
/// subscriber filtered by `AETHER_LOG`, and dispatches the chosen subcommand.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = cli::parse();
    cli::run(cli).await
}
