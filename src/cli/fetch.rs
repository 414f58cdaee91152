//! Fetch command

use super::FetchArgs;
use crate::config;
use crate::egress::{fetch_with_format, Payload, ResponseFormat, TransportProvider};
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Fetch a URL through the selected transport and print the decoded body
pub async fn run_fetch(config_path: &Path, args: &FetchArgs) -> Result<()> {
    let config = config::load_or_default(config_path)?;

    // An unknown format string is a caller error, surfaced before any I/O
    let format: ResponseFormat = args.format.parse()?;

    let transports = TransportProvider::new(
        &config.tor,
        Duration::from_secs(config.probe.timeout_secs),
    )?;

    let client = match args.via.as_str() {
        "tor" => transports.proxied()?,
        "direct" => transports.direct(),
        other => anyhow::bail!("unknown transport {:?} (use \"tor\" or \"direct\")", other),
    };

    info!("fetching {} via {} transport", args.url, args.via);

    match fetch_with_format(client, &args.url, format).await {
        Some(Payload::Json(value)) => println!("{}", serde_json::to_string_pretty(&value)?),
        Some(Payload::Text(text)) => println!("{}", text),
        Some(Payload::Bytes(bytes)) => {
            info!("received {} bytes", bytes.len());
            std::io::stdout().write_all(&bytes)?;
        },
        None => anyhow::bail!("fetch produced no result"),
    }

    Ok(())
}
