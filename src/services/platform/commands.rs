use std::sync::Arc;

/// A transport-control slot the OS can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSlot {
    /// Start playback
    Play,

    /// Pause playback
    Pause,

    /// Stop playback
    Stop,

    /// Skip to the next track
    NextTrack,

    /// Go back to the previous track
    PreviousTrack,

    /// Jump to an absolute position
    ChangePlaybackPosition,

    /// The user opened the app from the now-playing surface
    Raise,
}

impl CommandSlot {
    /// Every slot, in registration order.
    pub const ALL: [CommandSlot; 7] = [
        CommandSlot::Play,
        CommandSlot::Pause,
        CommandSlot::Stop,
        CommandSlot::NextTrack,
        CommandSlot::PreviousTrack,
        CommandSlot::ChangePlaybackPosition,
        CommandSlot::Raise,
    ];
}

/// A native remote-command event as delivered by the OS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteCommand {
    /// Start playback
    Play,

    /// Pause playback
    Pause,

    /// Stop playback
    Stop,

    /// Skip to the next track
    NextTrack,

    /// Go back to the previous track
    PreviousTrack,

    /// Jump to an absolute position.
    ///
    /// `None` models a malformed native event that arrived without its
    /// position payload.
    ChangePlaybackPosition {
        /// Requested position in seconds
        position_seconds: Option<f64>,
    },

    /// The user opened the app from the now-playing surface
    Raise,
}

impl RemoteCommand {
    /// The slot this command is delivered through.
    pub fn slot(&self) -> CommandSlot {
        match self {
            Self::Play => CommandSlot::Play,
            Self::Pause => CommandSlot::Pause,
            Self::Stop => CommandSlot::Stop,
            Self::NextTrack => CommandSlot::NextTrack,
            Self::PreviousTrack => CommandSlot::PreviousTrack,
            Self::ChangePlaybackPosition { .. } => CommandSlot::ChangePlaybackPosition,
            Self::Raise => CommandSlot::Raise,
        }
    }
}

/// Result a handler reports back to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// The command was handled
    Success,

    /// The native event was malformed
    CommandFailed,

    /// Nothing is registered for the slot
    NoHandler,
}

/// Callback installed into a command slot.
///
/// Handlers may be invoked from any thread.
pub type CommandHandler = Arc<dyn Fn(RemoteCommand) -> CommandStatus + Send + Sync>;
