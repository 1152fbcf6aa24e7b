//! Typed views of the untyped call payloads.
//!
//! Parsing never fails: a missing key, `null`, or a value of the wrong JSON
//! type all read as absent. Every numeric key is a duration, position or
//! speed, so negative numbers read as absent too.

use serde_json::Value;

fn text(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}

fn number(payload: &Value, key: &str) -> Option<f64> {
    payload
        .get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite() && *n >= 0.0)
}

fn flag(payload: &Value, key: &str) -> Option<bool> {
    payload.get(key).and_then(Value::as_bool)
}

/// Options of `initMediaSession`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitOptions {
    /// Track title
    pub title: Option<String>,
    /// Track artist
    pub artist: Option<String>,
    /// Album name
    pub album: Option<String>,
    /// Cover image URL
    pub cover: Option<String>,
    /// Track length in milliseconds
    pub duration_ms: Option<f64>,
    /// Playback position in milliseconds
    pub position_ms: Option<f64>,
    /// Whether playback is running
    pub is_playing: Option<bool>,
    /// Page to reopen when the app is launched from the surface
    pub target_page: Option<String>,
}

impl InitOptions {
    /// Read the options from a call payload.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            title: text(payload, "title"),
            artist: text(payload, "artist"),
            album: text(payload, "album"),
            cover: text(payload, "cover"),
            duration_ms: number(payload, "duration"),
            position_ms: number(payload, "position"),
            is_playing: flag(payload, "isPlaying"),
            target_page: text(payload, "targetPage"),
        }
    }
}

/// Options of `updateMetadata`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateMetadataOptions {
    /// Track title
    pub title: Option<String>,
    /// Track artist
    pub artist: Option<String>,
    /// Album name
    pub album: Option<String>,
    /// Cover image URL
    pub cover: Option<String>,
    /// Track length in milliseconds
    pub duration_ms: Option<f64>,
}

impl UpdateMetadataOptions {
    /// Read the options from a call payload.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            title: text(payload, "title"),
            artist: text(payload, "artist"),
            album: text(payload, "album"),
            cover: text(payload, "cover"),
            duration_ms: number(payload, "duration"),
        }
    }
}

/// Playback state named by `updatePlaybackState`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackStateName {
    /// `"playing"`
    Playing,
    /// Any other value, including a missing one
    #[default]
    Paused,
    /// `"stopped"`
    Stopped,
}

impl PlaybackStateName {
    /// Parse a state name; unknown names read as paused.
    pub fn parse(name: &str) -> Self {
        match name {
            "playing" => Self::Playing,
            "stopped" => Self::Stopped,
            _ => Self::Paused,
        }
    }

    /// Whether the state counts as playing.
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// Options of `updatePlaybackState`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePlaybackStateOptions {
    /// Requested state
    pub state: PlaybackStateName,
    /// Playback position in milliseconds
    pub position_ms: Option<f64>,
    /// Speed applied while playing
    pub playback_speed: Option<f64>,
}

impl UpdatePlaybackStateOptions {
    /// Read the options from a call payload.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            state: payload
                .get("state")
                .and_then(Value::as_str)
                .map(PlaybackStateName::parse)
                .unwrap_or_default(),
            position_ms: number(payload, "position"),
            playback_speed: number(payload, "playbackSpeed"),
        }
    }
}

/// Options of `seekTo`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeekToOptions {
    /// Target position in milliseconds; absent reads as zero
    pub position_ms: Option<f64>,
}

impl SeekToOptions {
    /// Read the options from a call payload.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            position_ms: number(payload, "position"),
        }
    }
}
