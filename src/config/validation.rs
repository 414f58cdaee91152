//! Configuration validation
//!
//! Fail-fast validation of configuration invariants.

use super::Config;
use anyhow::{bail, Result};

/// Validate configuration invariants
pub fn validate(config: &Config) -> Result<()> {
    validate_tor(config)?;
    validate_probe(config)?;
    validate_rotation(config)?;
    Ok(())
}

fn validate_tor(config: &Config) -> Result<()> {
    if config.tor.host.is_empty() {
        bail!("tor.host cannot be empty");
    }
    if config.tor.control_port == 0 {
        bail!("tor.control_port cannot be 0");
    }
    if config.tor.socks_port == 0 {
        bail!("tor.socks_port cannot be 0");
    }
    if config.tor.control_port == config.tor.socks_port {
        bail!(
            "tor.control_port and tor.socks_port must differ (both {})",
            config.tor.control_port
        );
    }
    Ok(())
}

fn validate_probe(config: &Config) -> Result<()> {
    let url = &config.probe.url;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        bail!("probe.url must be an http(s) URL, got: {}", url);
    }
    if config.probe.timeout_secs == 0 {
        bail!("probe.timeout_secs cannot be 0");
    }
    Ok(())
}

fn validate_rotation(config: &Config) -> Result<()> {
    if config.rotation.circuit_build_timeout_secs == 0 {
        bail!("rotation.circuit_build_timeout_secs cannot be 0");
    }
    Ok(())
}
