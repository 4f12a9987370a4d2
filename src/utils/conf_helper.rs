use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::core::error::Result;
use crate::models::config::SweepConfig;

/// Reads a JSON configuration file. Missing sections fall back to defaults.
pub fn load_config(path: &Path) -> Result<SweepConfig> {
    let data = fs::read_to_string(path)?;
    let config: SweepConfig = serde_json::from_str(&data)?;
    info!("Config loaded from {}", path.display());
    Ok(config)
}

/// Loads `path` (or the built-in defaults), applies `overrides`, then
/// validates and freezes the result.
pub fn init_config<F>(path: Option<&Path>, overrides: F) -> Result<Arc<SweepConfig>>
where
    F: FnOnce(&mut SweepConfig),
{
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => {
            info!("No config file given, using defaults");
            SweepConfig::default()
        }
    };
    overrides(&mut config);
    freeze(config)
}

/// Validates a finished config and shares it read-only.
pub fn freeze(config: SweepConfig) -> Result<Arc<SweepConfig>> {
    config.validate()?;
    Ok(Arc::new(config))
}
