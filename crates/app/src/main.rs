//! GroupGuard console.
//!
//! Logs go to stderr and are filtered with `RUST_LOG`; command output goes
//! to stdout.

mod cli;
mod commands;
mod console;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::console::Console;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let console = Console::from_cli(&cli)?;
    commands::run(&console, cli.command).await
}
