use std::{fs, path::Path};

use tracing::{debug, info};

use super::{Config, ConfigPaths};
use crate::{BridgeError, Result};

impl Config {
    /// Loads a configuration file.
    ///
    /// A missing file is not an error: the defaults are returned so the
    /// host can run without any configuration on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not
    /// valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| BridgeError::io(e, path))?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            BridgeError::TomlParseError { details, .. } => {
                BridgeError::toml_parse(details, Some(path))
            }
            other => other,
        })?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Loads the configuration from the default XDG location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or
    /// the file is invalid.
    pub fn load_default() -> Result<Config> {
        let path = ConfigPaths::main_config()?;
        Self::load(&path)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::TomlParseError` if the content is invalid.
    pub fn from_toml(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| BridgeError::toml_parse(e, None))
    }
}
