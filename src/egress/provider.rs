//! Transport provider
//!
//! Supplies two independently constructed HTTP transports: one routed
//! through Tor's SOCKS proxy (socks5h so DNS also resolves through Tor),
//! one direct. The proxied transport is replaceable; the direct one is
//! fixed for the process lifetime.

use crate::config::{TorConfig, PROXY_OVERRIDE_ENV};
use crate::error::TransportError;
use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::{debug, info};

/// Holder for the proxied and direct egress clients.
///
/// Invariant: at most one live proxied client exists at a time; replacing it
/// drops the previous handle, releasing the old circuit's connection pool.
pub struct TransportProvider {
    proxy_url: String,
    request_timeout: Duration,
    proxied: Option<Client>,
    direct: Client,
}

impl TransportProvider {
    /// Construct both transports. The proxy URL honors the
    /// `TORCYCLE_PROXY` override, falling back to the SOCKS URL derived
    /// from the Tor configuration. Construction failure is fatal.
    pub fn new(tor: &TorConfig, request_timeout: Duration) -> Result<Self, TransportError> {
        let proxy_url = resolve_proxy_url(std::env::var(PROXY_OVERRIDE_ENV).ok(), tor);

        let proxied = build_proxied(&proxy_url, request_timeout)?;
        let direct = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(TransportError::Init)?;

        info!("egress ready: proxied via {}, direct", proxy_url);

        Ok(Self {
            proxy_url,
            request_timeout,
            proxied: Some(proxied),
            direct,
        })
    }

    /// Dispose the current proxied transport and install a fresh one.
    ///
    /// Called once per successful circuit rotation: the previous client's
    /// connection pool may still be bound to the old circuit. The old handle
    /// is dropped immediately after the swap. If the rebuild fails the
    /// proxied transport becomes unavailable.
    pub fn replace_proxied(&mut self) -> Result<(), TransportError> {
        match build_proxied(&self.proxy_url, self.request_timeout) {
            Ok(fresh) => {
                let old = self.proxied.replace(fresh);
                drop(old);
                debug!("proxied transport replaced");
                Ok(())
            },
            Err(e) => {
                self.proxied = None;
                Err(e)
            },
        }
    }

    /// The Tor-proxied client, or `Unavailable` after a failed rebuild
    pub fn proxied(&self) -> Result<&Client, TransportError> {
        self.proxied.as_ref().ok_or(TransportError::Unavailable)
    }

    /// The direct client; unaffected by proxied swaps
    pub fn direct(&self) -> &Client {
        &self.direct
    }

    /// Resolved proxy URL the proxied transport egresses through
    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }
}

/// Precedence: explicit override > derived SOCKS URL
fn resolve_proxy_url(override_url: Option<String>, tor: &TorConfig) -> String {
    override_url
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| tor.socks_url())
}

fn build_proxied(proxy_url: &str, timeout: Duration) -> Result<Client, TransportError> {
    Client::builder()
        .proxy(Proxy::all(proxy_url).map_err(TransportError::Init)?)
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(TransportError::Init)
}
