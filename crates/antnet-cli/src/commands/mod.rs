//! # antnet-cli::commands

pub mod run;
pub mod validate;

use antnet_types::errors::ConfigError;
use antnet_types::scenario::Scenario;
use std::fs;
use std::path::Path;

/// Parses a scenario file, dispatching on its extension.
pub fn load_scenario(path: &Path) -> Result<Scenario, ConfigError> {
    let content = fs::read_to_string(path)?;
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        Some("toml") => Ok(toml::from_str(&content)?),
        other => Err(ConfigError::UnknownExtension(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}
