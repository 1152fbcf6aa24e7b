use std::path::Path;

use thiserror::Error;

use crate::services::platform::PlatformError;

/// Error types for the media session bridge.
///
/// Bridge operations themselves never fail; this enum covers the set-up
/// paths around them (configuration loading, platform start-up) and the
/// few dispatch errors a host can trigger with a malformed call.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: std::path::PathBuf,
        /// I/O error details
        details: String,
    },

    /// Standard I/O operation error (for compatibility)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// The host called a bridge method that does not exist
    #[error("unknown bridge method '{0}'")]
    UnknownMethod(String),

    /// The host tried to listen to an event channel that does not exist
    #[error("unknown event '{0}', expected 'mediaSessionEvent'")]
    UnknownEvent(String),

    /// OS integration could not be started
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// A specialized `Result` type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Creates a TOML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        BridgeError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Creates an I/O error carrying the path that failed.
    pub fn io(error: impl std::fmt::Display, path: &Path) -> Self {
        BridgeError::IoError {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}
