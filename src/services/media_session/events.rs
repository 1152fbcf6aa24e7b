use serde::{Deserialize, Serialize};

/// Name of the single outbound event channel.
pub const MEDIA_SESSION_EVENT: &str = "mediaSessionEvent";

/// What happened, as reported to the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaSessionEventKind {
    /// Playback was started from the OS surface
    Play,

    /// Playback was paused from the OS surface
    Pause,

    /// Playback was stopped from the OS surface
    Stop,

    /// Skip to the next track was requested
    Next,

    /// Go back to the previous track was requested
    Previous,

    /// A new position was requested
    SeekTo,

    /// The app was opened from the now-playing surface
    OpenApp,

    /// The user dismissed the now-playing notification
    NotificationDismissed,

    /// The app is going away
    AppClosed,
}

/// Extra data carried by `openApp`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    /// Page the host asked to be opened on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_page: Option<String>,
}

/// Payload delivered to `mediaSessionEvent` listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSessionEvent {
    /// Event kind
    pub event: MediaSessionEventKind,

    /// Position in milliseconds, for play, pause, stop and seekTo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,

    /// Additional data, for openApp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EventData>,
}

impl MediaSessionEvent {
    /// Event without payload.
    pub fn new(event: MediaSessionEventKind) -> Self {
        Self {
            event,
            position: None,
            data: None,
        }
    }

    /// Event carrying a position in milliseconds.
    pub fn with_position(event: MediaSessionEventKind, position_ms: f64) -> Self {
        Self {
            event,
            position: Some(position_ms),
            data: None,
        }
    }

    /// `openApp` event for `target_page`.
    pub fn open_app(target_page: Option<String>) -> Self {
        Self {
            event: MediaSessionEventKind::OpenApp,
            position: None,
            data: Some(EventData { target_page }),
        }
    }
}
