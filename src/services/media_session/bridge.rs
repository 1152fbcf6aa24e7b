use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::Stream;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use super::options::{
    InitOptions, SeekToOptions, UpdateMetadataOptions, UpdatePlaybackStateOptions,
};
use super::units::millis_to_seconds;
use super::{
    ArtworkFetcher, ArtworkLoader, DescriptorStore, DescriptorUpdate, EventHub,
    HttpArtworkFetcher, ListenerHandle, MEDIA_SESSION_EVENT, MediaSessionEvent,
    MediaSessionEventKind, NowPlayingDescriptor, RemoteCommandTranslator,
};
use crate::config::ArtworkConfig;
use crate::core::{BridgeError, Result};
use crate::services::platform::Platform;

/// Connects a host application's media session to the OS.
///
/// Inbound calls update the now-playing descriptor and publish it to the
/// platform surface. OS remote commands are translated into descriptor
/// changes and `mediaSessionEvent` events. Calls from the host never
/// produce events themselves.
///
/// Dropping the bridge unregisters its remote commands and clears the
/// surface.
pub struct MediaSessionBridge {
    platform: Platform,
    store: DescriptorStore,
    hub: EventHub,
    translator: RemoteCommandTranslator,
    artwork: ArtworkLoader,
    torn_down: AtomicBool,
}

impl MediaSessionBridge {
    /// Create a bridge over `platform`.
    ///
    /// Without a `fetcher` cover URLs are recorded but never loaded.
    pub fn new(platform: Platform, fetcher: Option<Arc<dyn ArtworkFetcher>>) -> Self {
        let store = DescriptorStore::new(platform.surface.clone());
        let hub = EventHub::new();
        let translator = RemoteCommandTranslator::new(store.clone(), hub.clone());
        let artwork = ArtworkLoader::new(fetcher, store.clone());

        Self {
            platform,
            store,
            hub,
            translator,
            artwork,
            torn_down: AtomicBool::new(false),
        }
    }

    /// Create a bridge loading artwork over HTTP as configured.
    ///
    /// A fetcher that cannot be built disables artwork with a warning.
    pub fn with_artwork_config(platform: Platform, config: &ArtworkConfig) -> Self {
        let fetcher: Option<Arc<dyn ArtworkFetcher>> = if config.enabled {
            match HttpArtworkFetcher::new(config) {
                Ok(fetcher) => Some(Arc::new(fetcher)),
                Err(e) => {
                    warn!("Artwork loading disabled: {e}");
                    None
                }
            }
        } else {
            None
        };

        Self::new(platform, fetcher)
    }

    /// Start a session.
    ///
    /// Replaces the whole descriptor: omitted fields become empty or zero,
    /// the playback speed returns to 1.0 and any artwork is dropped. Remote
    /// commands are (re)registered and the audio session is activated on a
    /// best-effort basis before the record is published.
    #[instrument(skip(self, options), fields(title = ?options.title))]
    pub async fn init(&self, options: InitOptions) {
        self.torn_down.store(false, Ordering::SeqCst);

        let cover_url = options.cover.unwrap_or_default();
        let descriptor = NowPlayingDescriptor {
            title: options.title.unwrap_or_default(),
            artist: options.artist.unwrap_or_default(),
            album: options.album.unwrap_or_default(),
            cover_url: cover_url.clone(),
            duration_seconds: millis_to_seconds(options.duration_ms.unwrap_or(0.0)),
            elapsed_seconds: millis_to_seconds(options.position_ms.unwrap_or(0.0)),
            is_playing: options.is_playing.unwrap_or(false),
            target_page: options.target_page,
            ..NowPlayingDescriptor::default()
        };

        self.translator.register(self.platform.commands.as_ref());

        if let Err(e) = self.platform.audio_session.activate() {
            warn!("Audio session activation failed: {e}");
        }

        let generation = self.store.reset(descriptor);
        self.artwork.load(&cover_url, generation);
        info!("Media session initialized");
    }

    /// Mark playback as running.
    #[instrument(skip(self))]
    pub async fn play(&self) {
        self.store.apply(DescriptorUpdate::new().playing(true));
    }

    /// Mark playback as paused. The record stays on the surface.
    #[instrument(skip(self))]
    pub async fn pause(&self) {
        self.store.apply(DescriptorUpdate::new().playing(false));
    }

    /// Stop playback and remove the record from the surface.
    ///
    /// Metadata is kept; the next mutation publishes it again.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        self.store
            .clear(DescriptorUpdate::new().playing(false).elapsed_seconds(0.0));
    }

    /// Track changes are driven by the host; nothing to publish.
    #[instrument(skip(self))]
    pub async fn next(&self) {
        debug!("Next requested by host");
    }

    /// Track changes are driven by the host; nothing to publish.
    #[instrument(skip(self))]
    pub async fn previous(&self) {
        debug!("Previous requested by host");
    }

    /// Move the published position.
    #[instrument(skip(self))]
    pub async fn seek_to(&self, options: SeekToOptions) {
        let position = options.position_ms.unwrap_or(0.0);
        self.store
            .apply(DescriptorUpdate::new().elapsed_millis(position));
    }

    /// Merge new track metadata; omitted fields keep their value.
    ///
    /// A cover that is not loaded yet starts an artwork fetch.
    #[instrument(skip(self, options), fields(title = ?options.title))]
    pub async fn update_metadata(&self, options: UpdateMetadataOptions) {
        let mut update = DescriptorUpdate::new();
        if let Some(title) = options.title {
            update = update.title(title);
        }
        if let Some(artist) = options.artist {
            update = update.artist(artist);
        }
        if let Some(album) = options.album {
            update = update.album(album);
        }
        if let Some(duration) = options.duration_ms {
            update = update.duration_millis(duration);
        }
        let cover_given = options.cover.is_some();
        if let Some(cover) = options.cover {
            update = update.cover_url(cover);
        }

        let applied = self.store.apply(update);
        if cover_given && applied.descriptor.artwork.is_none() {
            self.artwork
                .load(&applied.descriptor.cover_url, applied.generation);
        }
    }

    /// Merge the playback state; omitted position and speed keep their value.
    #[instrument(skip(self))]
    pub async fn update_playback_state(&self, options: UpdatePlaybackStateOptions) {
        let mut update = DescriptorUpdate::new().playing(options.state.is_playing());
        if let Some(position) = options.position_ms {
            update = update.elapsed_millis(position);
        }
        if let Some(speed) = options.playback_speed {
            update = update.playback_speed(speed);
        }
        self.store.apply(update);
    }

    /// Route a call by method name.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::UnknownMethod` if `method` is not a bridge call.
    pub async fn dispatch(&self, method: &str, payload: &Value) -> Result<()> {
        match method {
            "initMediaSession" | "init" => self.init(InitOptions::from_payload(payload)).await,
            "play" => self.play().await,
            "pause" => self.pause().await,
            "stop" => self.stop().await,
            "next" => self.next().await,
            "previous" => self.previous().await,
            "seekTo" => self.seek_to(SeekToOptions::from_payload(payload)).await,
            "updateMetadata" => {
                self.update_metadata(UpdateMetadataOptions::from_payload(payload))
                    .await
            }
            "updatePlaybackState" => {
                self.update_playback_state(UpdatePlaybackStateOptions::from_payload(payload))
                    .await
            }
            other => return Err(BridgeError::UnknownMethod(other.to_string())),
        }
        Ok(())
    }

    /// Listen to the named event channel.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::UnknownEvent` unless `event` is
    /// `mediaSessionEvent`.
    pub fn add_listener<F>(&self, event: &str, listener: F) -> Result<ListenerHandle>
    where
        F: Fn(&MediaSessionEvent) + Send + Sync + 'static,
    {
        if event != MEDIA_SESSION_EVENT {
            return Err(BridgeError::UnknownEvent(event.to_string()));
        }
        Ok(self.hub.add_listener(Arc::new(listener)))
    }

    /// Stream of events emitted from now on.
    pub fn events(&self) -> impl Stream<Item = MediaSessionEvent> + Send + 'static {
        self.hub.events()
    }

    /// Receiver for events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MediaSessionEvent> {
        self.hub.subscribe()
    }

    /// Copy of the current descriptor.
    pub fn descriptor(&self) -> NowPlayingDescriptor {
        self.store.snapshot()
    }

    /// Stream of descriptor snapshots, starting with the current one.
    pub fn descriptor_updates(&self) -> impl Stream<Item = NowPlayingDescriptor> + Send + 'static {
        self.store.watch()
    }

    /// Wait for the latest artwork fetch to finish.
    pub async fn artwork_settled(&self) {
        self.artwork.settled().await;
    }

    /// The app was launched.
    ///
    /// Emits `openApp` if the launch came from the now-playing notification.
    #[instrument(skip(self))]
    pub fn app_launched(&self) {
        self.report_notification_launch();
    }

    /// The app came back to the foreground.
    ///
    /// Emits `openApp` if it was resumed from the now-playing notification.
    #[instrument(skip(self))]
    pub fn app_resumed(&self) {
        self.report_notification_launch();
    }

    /// The user dismissed the now-playing notification.
    #[instrument(skip(self))]
    pub fn notification_dismissed(&self) {
        self.teardown();
        self.hub.emit(MediaSessionEvent::new(
            MediaSessionEventKind::NotificationDismissed,
        ));
    }

    /// The app is closing: emit `appClosed`, then tear down.
    #[instrument(skip(self))]
    pub fn app_closed(&self) {
        self.hub
            .emit(MediaSessionEvent::new(MediaSessionEventKind::AppClosed));
        self.shutdown();
    }

    /// Unregister remote commands and clear the surface.
    ///
    /// A later `init` starts over.
    #[instrument(skip(self))]
    pub fn shutdown(&self) {
        self.teardown();
        info!("Media session shut down");
    }

    fn report_notification_launch(&self) {
        let Some(launch) = self.platform.launch_options.take_notification_launch() else {
            return;
        };
        let target_page = launch
            .target_page
            .or_else(|| self.store.snapshot().target_page);
        debug!(?target_page, "Opened from the now-playing notification");
        self.hub.emit(MediaSessionEvent::open_app(target_page));
    }

    fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.platform.commands.unregister_all();
        self.store.clear(DescriptorUpdate::new().playing(false));
    }
}

impl Drop for MediaSessionBridge {
    fn drop(&mut self) {
        self.teardown();
    }
}
