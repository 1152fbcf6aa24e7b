/// Errors raised by OS integrations
#[derive(thiserror::Error, Debug)]
pub enum PlatformError {
    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    DbusError(#[from] zbus::Error),

    /// The OS refused to activate the audio session
    #[error("Audio session activation failed: {0}")]
    AudioSession(String),

    /// Failed to initialize the OS integration
    #[error("Failed to initialize platform integration: {0}")]
    InitializationFailed(String),
}
