use std::sync::Arc;

use tracing::{debug, warn};

use super::units::seconds_to_millis;
use super::{
    DescriptorStore, DescriptorUpdate, EventHub, MediaSessionEvent, MediaSessionEventKind,
};
use crate::services::platform::{CommandSlot, CommandStatus, RemoteCommand, RemoteCommandCenter};

/// Turns OS remote commands into descriptor mutations and outbound events.
#[derive(Clone)]
pub struct RemoteCommandTranslator {
    store: DescriptorStore,
    hub: EventHub,
}

impl RemoteCommandTranslator {
    /// Create a translator mutating `store` and emitting through `hub`.
    pub fn new(store: DescriptorStore, hub: EventHub) -> Self {
        Self { store, hub }
    }

    /// Install a handler for every slot of `center`.
    ///
    /// Existing handlers are removed first, so registering twice still
    /// yields one event per command.
    pub fn register(&self, center: &dyn RemoteCommandCenter) {
        center.unregister_all();
        for slot in CommandSlot::ALL {
            let translator = self.clone();
            center.register(
                slot,
                Arc::new(move |command: RemoteCommand| translator.translate(command)),
            );
        }
        debug!(slots = CommandSlot::ALL.len(), "Remote commands registered");
    }

    /// Handle one native command.
    pub fn translate(&self, command: RemoteCommand) -> CommandStatus {
        debug!(?command, "Remote command received");

        let event = match command {
            RemoteCommand::Play => {
                let applied = self.store.apply(DescriptorUpdate::new().playing(true));
                MediaSessionEvent::with_position(
                    MediaSessionEventKind::Play,
                    applied.descriptor.elapsed_millis(),
                )
            }
            RemoteCommand::Pause => {
                let applied = self.store.apply(DescriptorUpdate::new().playing(false));
                MediaSessionEvent::with_position(
                    MediaSessionEventKind::Pause,
                    applied.descriptor.elapsed_millis(),
                )
            }
            RemoteCommand::Stop => {
                self.store
                    .apply(DescriptorUpdate::new().playing(false).elapsed_seconds(0.0));
                MediaSessionEvent::with_position(MediaSessionEventKind::Stop, 0.0)
            }
            RemoteCommand::NextTrack => MediaSessionEvent::new(MediaSessionEventKind::Next),
            RemoteCommand::PreviousTrack => {
                MediaSessionEvent::new(MediaSessionEventKind::Previous)
            }
            RemoteCommand::ChangePlaybackPosition {
                position_seconds: Some(seconds),
            } => MediaSessionEvent::with_position(
                MediaSessionEventKind::SeekTo,
                seconds_to_millis(seconds),
            ),
            RemoteCommand::ChangePlaybackPosition {
                position_seconds: None,
            } => {
                warn!("Change-position command arrived without a position");
                return CommandStatus::CommandFailed;
            }
            RemoteCommand::Raise => MediaSessionEvent::open_app(self.store.snapshot().target_page),
        };

        self.hub.emit(event);
        CommandStatus::Success
    }
}
