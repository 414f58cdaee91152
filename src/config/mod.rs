//! Configuration loading and validation
//!
//! Handles TOML configuration parsing with strict validation.
//! No runtime mutation - configuration is immutable after load.

#![allow(unused_imports)] // Re-exports for public API

pub mod file;
mod validation;

pub use file::{load_from_path, load_or_default};
pub use validation::validate;

use serde::Deserialize;

/// Environment variable overriding the derived SOCKS proxy URL.
/// Takes precedence over `socks5h://{host}:{socks_port}`.
pub const PROXY_OVERRIDE_ENV: &str = "TORCYCLE_PROXY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tor: TorConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
}

/// Tor daemon connection
#[derive(Debug, Clone, Deserialize)]
pub struct TorConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// Control-port password. `None` falls back to null authentication.
    pub control_password: Option<String>,
    #[serde(default = "default_socks_port")]
    pub socks_port: u16,
}

impl Default for TorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            control_port: default_control_port(),
            control_password: None,
            socks_port: default_socks_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_control_port() -> u16 {
    9051
}
fn default_socks_port() -> u16 {
    9050
}

/// IP-echo probe settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// IP-echo endpoint queried through a selected transport
    #[serde(default = "default_probe_url")]
    pub url: String,
    /// Per-request timeout
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: default_probe_url(),
            timeout_secs: default_probe_timeout(),
        }
    }
}

fn default_probe_url() -> String {
    "https://check.torproject.org/api/ip".to_string()
}
fn default_probe_timeout() -> u64 {
    15
}

/// Circuit rotation settings
#[derive(Debug, Clone, Deserialize)]
pub struct RotationConfig {
    /// Maximum wait for the daemon's circuit BUILT event
    #[serde(default = "default_build_timeout")]
    pub circuit_build_timeout_secs: u64,
    /// Transient read failures tolerated while waiting for the event
    #[serde(default = "default_read_retries")]
    pub circuit_event_read_retries: u32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            circuit_build_timeout_secs: default_build_timeout(),
            circuit_event_read_retries: default_read_retries(),
        }
    }
}

fn default_build_timeout() -> u64 {
    60
}
fn default_read_retries() -> u32 {
    3
}

impl TorConfig {
    /// Control-port address in `host:port` form
    pub fn control_addr(&self) -> String {
        format!("{}:{}", self.host, self.control_port)
    }

    /// SOCKS proxy URL derived from host and socks_port.
    /// socks5h so hostname resolution also goes through Tor.
    pub fn socks_url(&self) -> String {
        format!("socks5h://{}:{}", self.host, self.socks_port)
    }
}
