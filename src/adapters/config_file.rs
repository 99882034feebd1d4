//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over an optional file on disk.  A missing file
//! is not an error: the bridge runs with [`SystemConfig::default()`].
//! Every loaded config is validated before it is returned.

use std::io::ErrorKind;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::{SystemConfig, validate_config};

pub struct JsonFileConfig {
    path: Option<PathBuf>,
}

impl JsonFileConfig {
    /// `None` means "no config file": defaults are used.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl ConfigPort for JsonFileConfig {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let Some(path) = &self.path else {
            info!("Config: no file given, using defaults");
            return Ok(SystemConfig::default());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Config: {} not found, using defaults", path.display());
                return Ok(SystemConfig::default());
            }
            Err(e) => {
                warn!("Config: cannot read {}: {}", path.display(), e);
                return Err(ConfigError::IoError);
            }
        };

        let config: SystemConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("Config: {} is not valid JSON: {}", path.display(), e);
            ConfigError::Corrupted
        })?;
        validate_config(&config)?;

        info!("Config loaded from {}", path.display());
        Ok(config)
    }
}
