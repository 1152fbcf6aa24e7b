use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::debug;
use zbus::object_server::{InterfaceRef, SignalEmitter};
use zbus::zvariant::{ObjectPath, OwnedValue};
use zbus::{fdo, interface};

use super::metadata::{self, NO_TRACK_PATH};
use crate::services::platform::{
    CommandHandler, CommandSlot, CommandStatus, InfoKey, NowPlayingInfo, RemoteCommand,
};

/// Drift between a published position and the extrapolated one that still
/// counts as ordinary progress rather than a seek.
const SEEK_TOLERANCE_SECONDS: f64 = 1.0;

/// Handlers shared between the command center and the D-Bus interfaces.
pub(super) type SharedHandlers = Arc<Mutex<HashMap<CommandSlot, CommandHandler>>>;

fn dispatch(handlers: &SharedHandlers, command: RemoteCommand) -> fdo::Result<()> {
    let handler = handlers
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&command.slot())
        .cloned();

    let Some(handler) = handler else {
        debug!(?command, "No handler registered");
        return Err(fdo::Error::Failed(String::from(
            "no media session is active",
        )));
    };

    match handler(command) {
        CommandStatus::Success => Ok(()),
        CommandStatus::CommandFailed => Err(fdo::Error::InvalidArgs(format!(
            "malformed command: {command:?}"
        ))),
        CommandStatus::NoHandler => Err(fdo::Error::Failed(String::from(
            "no media session is active",
        ))),
    }
}

/// `org.mpris.MediaPlayer2` root interface.
pub(super) struct RootInterface {
    identity: String,
    handlers: SharedHandlers,
}

impl RootInterface {
    pub(super) fn new(identity: String, handlers: SharedHandlers) -> Self {
        Self { identity, handlers }
    }
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootInterface {
    fn raise(&self) -> fdo::Result<()> {
        dispatch(&self.handlers, RemoteCommand::Raise)
    }

    fn quit(&self) -> fdo::Result<()> {
        Err(fdo::Error::NotSupported(String::from(
            "the host application owns its lifecycle",
        )))
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> String {
        self.identity.clone()
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        Vec::new()
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Which player properties changed after a publish.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct PlayerChanges {
    pub metadata: bool,
    pub status: bool,
    pub rate: bool,
    pub capabilities: bool,
    pub seeked_to: Option<i64>,
}

/// `org.mpris.MediaPlayer2.Player` interface mirroring the last published record.
pub(super) struct PlayerInterface {
    handlers: SharedHandlers,
    info: Option<NowPlayingInfo>,
    published_at: Instant,
    track_index: u64,
}

impl PlayerInterface {
    pub(super) fn new(handlers: SharedHandlers) -> Self {
        Self {
            handlers,
            info: None,
            published_at: Instant::now(),
            track_index: 0,
        }
    }

    /// Swap in a new record and report what changed.
    pub(super) fn replace(&mut self, info: Option<NowPlayingInfo>) -> PlayerChanges {
        self.replace_at(info, Instant::now())
    }

    fn replace_at(&mut self, info: Option<NowPlayingInfo>, now: Instant) -> PlayerChanges {
        let expected = self.info.is_some().then(|| self.position_at(now));
        let previous = self.info.take();
        let mut changes = PlayerChanges {
            capabilities: previous.is_some() != info.is_some(),
            ..PlayerChanges::default()
        };

        let text_changed = |key: InfoKey| {
            previous.as_ref().and_then(|p| p.text(key)) != info.as_ref().and_then(|i| i.text(key))
        };
        let track_changed = text_changed(InfoKey::Title)
            || text_changed(InfoKey::Artist)
            || text_changed(InfoKey::AlbumTitle);
        if track_changed {
            self.track_index += 1;
        }

        let number = |record: &Option<NowPlayingInfo>, key: InfoKey| {
            record.as_ref().and_then(|r| r.number(key))
        };

        changes.metadata = track_changed
            || number(&previous, InfoKey::PlaybackDuration)
                != number(&info, InfoKey::PlaybackDuration)
            || previous.as_ref().and_then(NowPlayingInfo::artwork)
                != info.as_ref().and_then(NowPlayingInfo::artwork);

        let previous_rate = number(&previous, InfoKey::PlaybackRate);
        let rate = number(&info, InfoKey::PlaybackRate);
        changes.status =
            changes.capabilities || previous_rate.map(|r| r != 0.0) != rate.map(|r| r != 0.0);
        changes.rate = previous_rate != rate;

        // Regular progress updates land near the extrapolated position;
        // only a jump away from it is reported as Seeked.
        if info.is_some() {
            let elapsed = number(&info, InfoKey::ElapsedPlaybackTime).unwrap_or(0.0);
            let jumped = expected
                .is_none_or(|expected| (elapsed - expected).abs() > SEEK_TOLERANCE_SECONDS);
            if jumped {
                changes.seeked_to = Some(metadata::seconds_to_micros(elapsed));
            }
        }

        self.info = info;
        self.published_at = now;
        changes
    }

    /// Playback position in seconds at `now`, advanced from the last publish
    /// by the published rate.
    fn position_at(&self, now: Instant) -> f64 {
        let elapsed = self.number(InfoKey::ElapsedPlaybackTime).unwrap_or(0.0);
        let rate = self.number(InfoKey::PlaybackRate).unwrap_or(0.0);
        let since_publish = now.saturating_duration_since(self.published_at);
        (elapsed + rate * since_publish.as_secs_f64()).max(0.0)
    }

    fn number(&self, key: InfoKey) -> Option<f64> {
        self.info.as_ref().and_then(|info| info.number(key))
    }

    fn is_playing(&self) -> bool {
        self.number(InfoKey::PlaybackRate)
            .is_some_and(|rate| rate != 0.0)
    }

    fn track_id(&self) -> ObjectPath<'static> {
        if self.info.is_some() {
            metadata::track_path(self.track_index)
        } else {
            ObjectPath::from_static_str_unchecked(NO_TRACK_PATH)
        }
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerInterface {
    fn play(&self) -> fdo::Result<()> {
        dispatch(&self.handlers, RemoteCommand::Play)
    }

    fn pause(&self) -> fdo::Result<()> {
        dispatch(&self.handlers, RemoteCommand::Pause)
    }

    fn play_pause(&self) -> fdo::Result<()> {
        let command = if self.is_playing() {
            RemoteCommand::Pause
        } else {
            RemoteCommand::Play
        };
        dispatch(&self.handlers, command)
    }

    fn stop(&self) -> fdo::Result<()> {
        dispatch(&self.handlers, RemoteCommand::Stop)
    }

    fn next(&self) -> fdo::Result<()> {
        dispatch(&self.handlers, RemoteCommand::NextTrack)
    }

    fn previous(&self) -> fdo::Result<()> {
        dispatch(&self.handlers, RemoteCommand::PreviousTrack)
    }

    fn seek(&self, offset: i64) -> fdo::Result<()> {
        let current = self.position_at(Instant::now());
        let target = (current + metadata::micros_to_seconds(offset)).max(0.0);
        dispatch(
            &self.handlers,
            RemoteCommand::ChangePlaybackPosition {
                position_seconds: Some(target),
            },
        )
    }

    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) -> fdo::Result<()> {
        // Stale track ids and negative positions are ignored, not errors.
        if track_id.as_str() != self.track_id().as_str() || position < 0 {
            debug!(%track_id, position, "Ignoring SetPosition for another track");
            return Ok(());
        }
        dispatch(
            &self.handlers,
            RemoteCommand::ChangePlaybackPosition {
                position_seconds: Some(metadata::micros_to_seconds(position)),
            },
        )
    }

    fn open_uri(&self, _uri: &str) -> fdo::Result<()> {
        Err(fdo::Error::NotSupported(String::from(
            "opening URIs is not supported",
        )))
    }

    #[zbus(signal)]
    async fn seeked(emitter: &SignalEmitter<'_>, position: i64) -> zbus::Result<()>;

    #[zbus(property)]
    fn playback_status(&self) -> String {
        match (&self.info, self.is_playing()) {
            (None, _) => "Stopped",
            (Some(_), true) => "Playing",
            (Some(_), false) => "Paused",
        }
        .to_string()
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        // MPRIS has no zero rate; pausing is expressed through PlaybackStatus.
        self.number(InfoKey::PlaybackRate)
            .filter(|rate| *rate > 0.0)
            .unwrap_or(1.0)
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        match &self.info {
            Some(info) => metadata::track_metadata(info, &self.track_id()),
            None => HashMap::new(),
        }
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        1.0
    }

    #[zbus(property(emits_changed_signal = "false"))]
    fn position(&self) -> i64 {
        metadata::seconds_to_micros(self.position_at(Instant::now()))
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        0.25
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        4.0
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        self.info.is_some()
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        self.info.is_some()
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        self.info.is_some()
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        self.info.is_some()
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        self.info.is_some()
    }

    #[zbus(property(emits_changed_signal = "const"))]
    fn can_control(&self) -> bool {
        true
    }
}

/// Store `info` in the player interface and signal what changed.
pub(super) async fn apply_update(
    iface_ref: &InterfaceRef<PlayerInterface>,
    info: Option<NowPlayingInfo>,
) -> zbus::Result<()> {
    let emitter = iface_ref.signal_emitter();
    let mut iface = iface_ref.get_mut().await;
    let changes = iface.replace(info);

    if changes.metadata {
        iface.metadata_changed(emitter).await?;
    }
    if changes.status {
        iface.playback_status_changed(emitter).await?;
    }
    if changes.rate {
        iface.rate_changed(emitter).await?;
    }
    if changes.capabilities {
        iface.can_play_changed(emitter).await?;
        iface.can_pause_changed(emitter).await?;
        iface.can_seek_changed(emitter).await?;
        iface.can_go_next_changed(emitter).await?;
        iface.can_go_previous_changed(emitter).await?;
    }
    if let Some(position) = changes.seeked_to {
        PlayerInterface::seeked(emitter, position).await?;
    }

    Ok(())
}
