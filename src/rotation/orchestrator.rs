//! Rotation orchestrator
//!
//! Coordinates one full IP-rotation cycle across the control session and the
//! transport provider. This is the only place faults are caught: everything
//! after the initial best-effort probe is converted into a failed
//! `RotationResult`, and the control connection is closed on every path.

use crate::config::Config;
use crate::control::ControlSession;
use crate::egress::{IpProbe, TransportProvider};
use crate::error::TransportError;
use crate::rotation::RotationResult;
use std::time::Duration;
use tracing::{info, warn};

/// Drives rotation cycles. One cycle in flight at a time; mutating
/// operations take `&mut self` so callers serialize through the borrow.
pub struct IdentityRotator {
    session: ControlSession,
    transports: TransportProvider,
    probe: IpProbe,
    build_timeout: Duration,
    read_retries: u32,
}

impl IdentityRotator {
    /// Construct the rotator. Transport construction failure is
    /// unrecoverable and propagates to the caller.
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let transports = TransportProvider::new(
            &config.tor,
            Duration::from_secs(config.probe.timeout_secs),
        )?;

        Ok(Self {
            session: ControlSession::new(&config.tor),
            transports,
            probe: IpProbe::new(config.probe.url.clone()),
            build_timeout: Duration::from_secs(config.rotation.circuit_build_timeout_secs),
            read_retries: config.rotation.circuit_event_read_retries,
        })
    }

    /// Run one rotation cycle.
    ///
    /// The control connection is never left open across invocations: it is
    /// closed before returning whether the cycle succeeded, aborted, or
    /// faulted. No fault escapes as an error.
    pub async fn rotate(&mut self) -> RotationResult {
        let result = self.run_cycle().await;
        self.session.disconnect();

        if result.success {
            info!("{}", result.message);
        } else {
            warn!("rotation not successful: {}", result.message);
        }
        result
    }

    async fn run_cycle(&mut self) -> RotationResult {
        // Best-effort look at the current exit address; a failed probe does
        // not abort the cycle
        let old_address = match self.transports.proxied() {
            Ok(client) => self.probe.fetch_address(client).await,
            Err(e) => {
                warn!("skipping old-address probe: {}", e);
                None
            },
        };

        if let Err(e) = self.session.connect().await {
            return RotationResult::failed(old_address, e.to_string());
        }

        if let Err(e) = self.session.authenticate().await {
            return RotationResult::failed(old_address, e.to_string());
        }

        if let Err(e) = self.session.signal_newnym().await {
            // Aborts before the event wait; the daemon's reply travels in
            // the message
            return RotationResult::failed(old_address, e.to_string());
        }

        match self
            .session
            .wait_for_circuit_built(self.build_timeout, self.read_retries)
            .await
        {
            Ok(event) => info!("circuit {} built", event.circuit_id),
            Err(e) => return RotationResult::failed(old_address, e.to_string()),
        }

        // The previous transport may still be bound to the old circuit's
        // connection pool; swap it before probing
        if let Err(e) = self.transports.replace_proxied() {
            return RotationResult::failed(
                old_address,
                format!("proxied transport rebuild failed: {}", e),
            );
        }

        let new_address = match self.transports.proxied() {
            Ok(client) => self.probe.fetch_address(client).await,
            Err(_) => None,
        };

        RotationResult::classify(old_address, new_address)
    }

    /// Whether the control connection is currently open. Always false after
    /// `rotate` returns.
    pub fn control_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn transports(&self) -> &TransportProvider {
        &self.transports
    }

    /// Probe state, including the last-error side channel
    pub fn probe(&self) -> &IpProbe {
        &self.probe
    }
}
