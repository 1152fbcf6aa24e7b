use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use super::{
    AudioSession, CommandHandler, CommandSlot, CommandStatus, LaunchOptions, NotificationLaunch,
    NowPlayingInfo, NowPlayingSurface, Platform, PlatformError, RemoteCommand,
    RemoteCommandCenter,
};

/// Surface that keeps the last published record in memory.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    state: Mutex<SurfaceState>,
}

#[derive(Debug, Default)]
struct SurfaceState {
    current: Option<NowPlayingInfo>,
    publishes: usize,
    clears: usize,
}

impl RecordingSurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// The record currently displayed, `None` after a clear.
    pub fn current(&self) -> Option<NowPlayingInfo> {
        self.lock().current.clone()
    }

    /// Number of publishes received.
    pub fn publish_count(&self) -> usize {
        self.lock().publishes
    }

    /// Number of clears received.
    pub fn clear_count(&self) -> usize {
        self.lock().clears
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NowPlayingSurface for RecordingSurface {
    fn publish(&self, info: &NowPlayingInfo) {
        trace!(?info, "Publishing now-playing record");
        let mut state = self.lock();
        state.current = Some(info.clone());
        state.publishes += 1;
    }

    fn clear(&self) {
        trace!("Clearing now-playing record");
        let mut state = self.lock();
        state.current = None;
        state.clears += 1;
    }
}

/// Command center whose commands are delivered by calling [`send`](Self::send).
#[derive(Default)]
pub struct LocalCommandCenter {
    handlers: Mutex<HashMap<CommandSlot, CommandHandler>>,
}

impl LocalCommandCenter {
    /// Create a command center with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a command the way the OS would.
    ///
    /// The handler runs without any internal lock held, so it may
    /// re-register handlers.
    pub fn send(&self, command: RemoteCommand) -> CommandStatus {
        let handler = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&command.slot())
            .cloned();

        match handler {
            Some(handler) => handler(command),
            None => {
                debug!(?command, "No handler registered");
                CommandStatus::NoHandler
            }
        }
    }

    /// Number of slots with a handler installed.
    pub fn handler_count(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl RemoteCommandCenter for LocalCommandCenter {
    fn register(&self, slot: CommandSlot, handler: CommandHandler) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot, handler);
    }

    fn unregister_all(&self) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Audio session that counts activations and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingAudioSession {
    activations: AtomicUsize,
    fail: bool,
}

impl RecordingAudioSession {
    /// Session whose activation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose activation always fails.
    pub fn failing() -> Self {
        Self {
            activations: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// Number of activation attempts.
    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }
}

impl AudioSession for RecordingAudioSession {
    fn activate(&self) -> Result<(), PlatformError> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PlatformError::AudioSession(String::from(
                "activation refused",
            )));
        }
        Ok(())
    }
}

/// Launch options holding at most one pending notification launch.
#[derive(Debug, Default)]
pub struct QueuedLaunchOptions {
    pending: Mutex<Option<NotificationLaunch>>,
}

impl QueuedLaunchOptions {
    /// Launch options with `launch` pending, or nothing pending.
    pub fn new(launch: Option<NotificationLaunch>) -> Self {
        Self {
            pending: Mutex::new(launch),
        }
    }

    /// Record a notification launch, as on resume from the notification.
    pub fn push(&self, launch: NotificationLaunch) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(launch);
    }
}

impl LaunchOptions for QueuedLaunchOptions {
    fn take_notification_launch(&self) -> Option<NotificationLaunch> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// In-process platform with handles to every collaborator.
#[derive(Clone, Default)]
pub struct MemoryPlatform {
    /// Recording surface
    pub surface: Arc<RecordingSurface>,
    /// Local command center
    pub commands: Arc<LocalCommandCenter>,
    /// Recording audio session
    pub audio_session: Arc<RecordingAudioSession>,
    /// Queued launch options
    pub launch_options: Arc<QueuedLaunchOptions>,
}

impl MemoryPlatform {
    /// Create a platform with empty collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// The collaborators as trait objects for the bridge.
    pub fn platform(&self) -> Platform {
        Platform {
            surface: self.surface.clone(),
            commands: self.commands.clone(),
            audio_session: self.audio_session.clone(),
            launch_options: self.launch_options.clone(),
        }
    }
}
