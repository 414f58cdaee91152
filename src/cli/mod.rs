//! Command-line interface for torcycle
//!
//! Provides main commands:
//! - `rotate` - request a new Tor circuit and verify the exit address changed
//! - `status` - show the apparent address through both transports
//! - `fetch` - fetch a URL through a selected transport

mod fetch;
mod rotate;
mod status;

pub use fetch::run_fetch;
pub use rotate::run_rotate;
pub use status::run_status;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// torcycle - Tor circuit rotation client
#[derive(Parser, Debug)]
#[command(name = "torcycle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (defaults are used when it does not exist)
    #[arg(short, long, default_value = "torcycle.toml")]
    pub config: PathBuf,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request a new Tor circuit and verify the exit address changed
    Rotate(RotateArgs),

    /// Show the apparent address through both transports
    Status,

    /// Fetch a URL through a selected transport
    Fetch(FetchArgs),
}

/// Arguments for rotate command
#[derive(Parser, Debug)]
pub struct RotateArgs {
    /// Maximum rotation attempts before giving up
    #[arg(long, default_value_t = 1)]
    pub attempts: u32,
}

/// Arguments for fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// URL to fetch
    pub url: String,

    /// Transport to use: "tor" or "direct"
    #[arg(long, default_value = "tor")]
    pub via: String,

    /// Response format: "json", "text", or "bytes"
    #[arg(long, default_value = "text")]
    pub format: String,
}
