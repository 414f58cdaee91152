//! Configuration file loading

use super::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Load and parse config from path
pub fn load_from_path(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    super::validate(&config)?;

    Ok(config)
}

/// Load config from path if it exists, otherwise fall back to defaults
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_from_path(path)
    } else {
        let config = Config::default();
        super::validate(&config)?;
        Ok(config)
    }
}
