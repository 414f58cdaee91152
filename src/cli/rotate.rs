//! Rotate command

use super::RotateArgs;
use crate::config;
use crate::rotation::IdentityRotator;
use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

/// Run one or more rotation cycles until the exit address changes
pub async fn run_rotate(config_path: &Path, args: &RotateArgs) -> Result<()> {
    let config = config::load_or_default(config_path)?;
    let mut rotator = IdentityRotator::new(&config)?;

    for attempt in 1..=args.attempts.max(1) {
        info!("rotation attempt {}/{}", attempt, args.attempts.max(1));
        let result = rotator.rotate().await;

        if result.success {
            info!(
                "{} (old: {}, new: {})",
                result.message,
                result.old_address.as_deref().unwrap_or("unknown"),
                result.new_address.as_deref().unwrap_or("unknown"),
            );
            return Ok(());
        }

        warn!("attempt {} failed: {}", attempt, result.message);
    }

    anyhow::bail!("rotation failed after {} attempts", args.attempts.max(1))
}
