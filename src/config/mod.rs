//! Configuration schema definitions and loading.
//!
//! Defines the complete configuration structure for the bridge host:
//! general settings (logging) and the media session settings. All
//! configurations are serializable to/from TOML format.

mod general;
mod loading;
mod paths;
mod session;

#[cfg(test)]
mod tests;

pub use general::{GeneralConfig, LogLevel};
pub use paths::ConfigPaths;
pub use session::{ArtworkConfig, SessionConfig};

use serde::{Deserialize, Serialize};

/// Main configuration structure.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Media session settings.
    #[serde(default)]
    pub session: SessionConfig,
}
