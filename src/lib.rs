//! torcycle library crate
//!
//! Tor control-port client with circuit rotation and dual HTTP egress.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface (rotate, status, fetch)
//! - [`config`] - Configuration loading and validation
//! - [`control`] - Tor control-port session and protocol parsing
//! - [`egress`] - Proxied/direct transports, IP probe, fetch helper
//! - [`rotation`] - Circuit rotation orchestration
//! - [`error`] - Typed fault taxonomy
//! - [`logging`] - Structured logging setup

pub mod cli;
pub mod config;
pub mod control;
pub mod egress;
pub mod error;
pub mod logging;
pub mod rotation;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
