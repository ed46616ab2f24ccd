use std::path::Path;

use anyhow::{Context, Result};
use camwatch_core::config::AppConfig;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/camwatch.toml";

/// Read and parse the TOML configuration file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Invalid config {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    Ok(toml::from_str(contents)?)
}
