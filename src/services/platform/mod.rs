//! OS collaborators of the media session.
//!
//! The bridge never talks to an operating system directly. It publishes
//! through a [`NowPlayingSurface`], receives transport commands through a
//! [`RemoteCommandCenter`], and asks an [`AudioSession`] and
//! [`LaunchOptions`] for the rest. [`memory`] implements all of them in
//! process; [`mpris`] implements the surface and command center over the
//! MPRIS D-Bus interface.

/// Remote command slots, events and handler types
pub mod commands;
/// Platform error types
pub mod error;
/// Flat now-playing record handed to the OS surface
pub mod info;
/// In-process platform used by tests and headless hosts
pub mod memory;
/// MPRIS D-Bus backend
pub mod mpris;

use std::sync::Arc;

use tracing::debug;

pub use commands::*;
pub use error::*;
pub use info::*;

/// The OS now-playing surface (lock screen, control center, desktop widget).
///
/// The surface has no partial-update primitive: every publish carries the
/// complete record and replaces whatever was shown before.
pub trait NowPlayingSurface: Send + Sync {
    /// Replace the displayed now-playing record.
    fn publish(&self, info: &NowPlayingInfo);

    /// Remove the now-playing record entirely.
    fn clear(&self);
}

/// The OS remote-command registry.
///
/// Holds at most one handler per slot. Registering a slot that already has
/// a handler replaces it.
pub trait RemoteCommandCenter: Send + Sync {
    /// Install `handler` for `slot`, replacing any previous handler.
    fn register(&self, slot: CommandSlot, handler: CommandHandler);

    /// Remove every installed handler.
    fn unregister_all(&self);
}

/// OS audio-session activation.
pub trait AudioSession: Send + Sync {
    /// Activate the session for playback.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::AudioSession` if the OS refuses activation.
    /// Callers treat this as best effort.
    fn activate(&self) -> Result<(), PlatformError>;
}

/// Details of an app launch triggered from the now-playing notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationLaunch {
    /// Page the host should navigate to, as passed to `init`
    pub target_page: Option<String>,
}

/// Inspection of the options the app was launched or resumed with.
pub trait LaunchOptions: Send + Sync {
    /// Returns the pending notification launch, consuming it so the same
    /// launch is reported only once.
    fn take_notification_launch(&self) -> Option<NotificationLaunch>;
}

/// Audio session for hosts whose OS has no such concept.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAudioSession;

impl AudioSession for NoopAudioSession {
    fn activate(&self) -> Result<(), PlatformError> {
        debug!("No audio session to activate on this platform");
        Ok(())
    }
}

/// The set of OS collaborators a bridge is built from.
#[derive(Clone)]
pub struct Platform {
    /// Where the now-playing record is published
    pub surface: Arc<dyn NowPlayingSurface>,
    /// Where remote-command handlers are registered
    pub commands: Arc<dyn RemoteCommandCenter>,
    /// Activated on every `init`
    pub audio_session: Arc<dyn AudioSession>,
    /// Inspected when the app is launched or resumed
    pub launch_options: Arc<dyn LaunchOptions>,
}
