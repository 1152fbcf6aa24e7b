use serde::{Deserialize, Serialize};

/// Media session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Human-readable player name shown by the OS surface.
    pub identity: String,

    /// Suffix of the well-known bus name (`org.mpris.MediaPlayer2.<bus_name>`).
    pub bus_name: String,

    /// Cover art fetching.
    pub artwork: ArtworkConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            identity: String::from("Media Session Bridge"),
            bus_name: String::from("media_session_bridge"),
            artwork: ArtworkConfig::default(),
        }
    }
}

/// Cover art fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtworkConfig {
    /// Whether cover URLs are fetched at all.
    pub enabled: bool,

    /// User agent sent with artwork requests.
    pub user_agent: String,

    /// Request timeout in seconds. No timeout when unset.
    pub timeout_secs: Option<u64>,

    /// Responses larger than this are discarded.
    pub max_bytes: usize,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user_agent: format!("media-session-bridge/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: None,
            max_bytes: 16 * 1024 * 1024,
        }
    }
}
