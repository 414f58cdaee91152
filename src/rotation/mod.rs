//! Circuit rotation
//!
//! Sequences authenticate -> NEWNYM -> circuit-built wait -> transport swap
//! -> address verification, converting every fault into a structured result.

pub mod orchestrator;
pub mod result;

pub use orchestrator::IdentityRotator;
pub use result::RotationResult;
