//! Binary crate for the `forecast` service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and interactive configuration
//! - The HTTP router and the `/forecast` handler
//! - Logging setup

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
