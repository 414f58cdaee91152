//! Exit address probing
//!
//! One GET against an IP-echo endpoint through a caller-selected transport.
//! Best-effort: every fault is logged and collapses to `None`, with the
//! underlying cause kept in a last-error side channel.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// Probes the apparent address of a transport's egress path
pub struct IpProbe {
    url: String,
    last_error: Option<String>,
}

impl IpProbe {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            last_error: None,
        }
    }

    /// Fetch the apparent address through `client`, or `None` on any fault
    /// (bad status, network error, decode error). The fault detail lands in
    /// `last_error`, not in the return value.
    pub async fn fetch_address(&mut self, client: &Client) -> Option<String> {
        match request_address(client, &self.url).await {
            Ok(address) => {
                debug!("probe via {} reports address {}", self.url, address);
                self.last_error = None;
                Some(address)
            },
            Err(e) => {
                warn!("address probe against {} failed: {:#}", self.url, e);
                self.last_error = Some(format!("{:#}", e));
                None
            },
        }
    }

    /// Cause of the most recent failed probe, cleared by a successful one
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

async fn request_address(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .context("request failed")?
        .error_for_status()
        .context("echo endpoint returned an error status")?;

    let body = response.text().await.context("failed to read body")?;
    decode_address(&body)
}

/// Decode an echo body: the check.torproject.org JSON shape, with a plain
/// text fallback for bare-address endpoints like ipify.
fn decode_address(body: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct EchoBody {
        #[serde(rename = "IP", alias = "ip")]
        ip: String,
    }

    if let Ok(parsed) = serde_json::from_str::<EchoBody>(body) {
        return Ok(parsed.ip);
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 64 && !trimmed.contains(char::is_whitespace) {
        return Ok(trimmed.to_string());
    }

    bail!(
        "unrecognized echo body: {:?}",
        body.chars().take(80).collect::<String>()
    )
}
