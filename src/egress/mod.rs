//! Outbound HTTP egress
//!
//! Owns the two egress paths (Tor-proxied and direct), the IP-echo probe,
//! and the decoder-selecting fetch helper.

pub mod fetch;
pub mod probe;
pub mod provider;

pub use fetch::{fetch_with_format, Payload, ResponseFormat};
pub use probe::IpProbe;
pub use provider::TransportProvider;
