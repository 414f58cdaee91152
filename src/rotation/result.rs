//! Rotation outcome

/// Outcome of one rotation attempt. Immutable after construction.
#[derive(Debug, Clone)]
pub struct RotationResult {
    /// True only when a new address was observed and it differs from the old
    pub success: bool,
    /// Address probed before the rotation, if the probe succeeded
    pub old_address: Option<String>,
    /// Address probed after the transport swap, if the probe succeeded
    pub new_address: Option<String>,
    /// Human-readable outcome
    pub message: String,
}

impl RotationResult {
    /// Classify a completed cycle from the two probed addresses
    pub fn classify(old_address: Option<String>, new_address: Option<String>) -> Self {
        match (&old_address, &new_address) {
            (_, None) => Self {
                success: false,
                message: "failed to get new IP after circuit rotation".to_string(),
                old_address,
                new_address,
            },
            (Some(old), Some(new)) if old == new => Self {
                success: false,
                message: format!("same IP returned after circuit rotation: {}", new),
                old_address,
                new_address,
            },
            (_, Some(new)) => Self {
                success: true,
                message: format!(
                    "exit address changed: {} -> {}",
                    old_address.as_deref().unwrap_or("unknown"),
                    new
                ),
                old_address,
                new_address,
            },
        }
    }

    /// A cycle aborted before the new-address probe
    pub fn failed(old_address: Option<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            old_address,
            new_address: None,
            message: message.into(),
        }
    }
}
