//! Status command

use crate::config;
use crate::egress::{IpProbe, TransportProvider};
use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Probe the apparent address through both transports and report
pub async fn run_status(config_path: &Path) -> Result<()> {
    let config = config::load_or_default(config_path)?;
    let transports = TransportProvider::new(
        &config.tor,
        Duration::from_secs(config.probe.timeout_secs),
    )?;
    let mut probe = IpProbe::new(config.probe.url.clone());

    info!("probing {} through both transports", probe.url());

    match probe.fetch_address(transports.direct()).await {
        Some(address) => info!("direct address: {}", address),
        None => info!(
            "direct address: unavailable ({})",
            probe.last_error().unwrap_or("unknown error")
        ),
    }

    match transports.proxied() {
        Ok(client) => match probe.fetch_address(client).await {
            Some(address) => info!("tor exit address: {} (via {})", address, transports.proxy_url()),
            None => info!(
                "tor exit address: unavailable ({})",
                probe.last_error().unwrap_or("unknown error")
            ),
        },
        Err(e) => info!("tor exit address: {}", e),
    }

    Ok(())
}
