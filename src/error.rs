//! Error types for control-port and egress operations
//!
//! The control session and transport provider raise typed faults; only the
//! rotation orchestrator converts them into a `RotationResult`. Binary-level
//! glue uses `anyhow` on top of these.

use thiserror::Error;

/// Faults raised by the Tor control-port session.
#[derive(Error, Debug)]
pub enum ControlError {
    /// The control socket could not be established.
    #[error("failed to connect to Tor control port at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A command was issued while no connection is open. No I/O is attempted.
    #[error("not connected to the Tor control port")]
    NotConnected,

    /// A privileged command was issued before authentication succeeded.
    #[error("control session is not authenticated")]
    NotAuthenticated,

    /// The daemon rejected AUTHENTICATE. Carries the trimmed reply text.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The daemon acknowledged a command with a non-250 status.
    #[error("{command} rejected by Tor: {reply}")]
    CommandFailed { command: String, reply: String },

    /// No circuit-built event was observed within the configured window.
    #[error("no circuit BUILT event within {0} seconds")]
    CircuitBuildTimeout(u64),

    /// A reply line did not match the control protocol grammar.
    #[error("malformed control reply: {0}")]
    Protocol(String),

    /// I/O failure on the control connection.
    #[error("control connection I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Faults raised by the transport provider.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The underlying network stack rejected the client configuration.
    /// Fatal at construction time.
    #[error("failed to initialize HTTP transport: {0}")]
    Init(#[source] reqwest::Error),

    /// The proxied transport is missing after a failed rebuild.
    #[error("proxied transport is unavailable")]
    Unavailable,
}

/// Faults raised by the fetch helper's format selector.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The caller asked for a response format this crate does not decode.
    #[error("unsupported response type: {0:?} (expected json, text, or bytes)")]
    UnsupportedResponseType(String),
}
