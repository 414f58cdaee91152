//! torcycle - Tor circuit rotation client
//!
//! Drives the Tor daemon's control port to request fresh circuits and keeps
//! two outbound HTTP transports: one through Tor's SOCKS proxy, one direct.
//!
//! # Usage
//!
//! ```bash
//! # Rotate to a new exit address
//! torcycle rotate
//!
//! # Show the apparent address through both transports
//! torcycle status
//!
//! # Fetch a URL through the Tor transport
//! torcycle fetch https://check.torproject.org/api/ip --format json
//! ```

use anyhow::Result;
use clap::Parser;
use torcycle::cli::{self, Cli, Commands};
use tracing::Level;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    torcycle::logging::init_with_level(log_level);

    match &cli.command {
        Commands::Rotate(args) => {
            cli::run_rotate(&cli.config, args).await?;
        },
        Commands::Status => {
            cli::run_status(&cli.config).await?;
        },
        Commands::Fetch(args) => {
            cli::run_fetch(&cli.config, args).await?;
        },
    }

    Ok(())
}
