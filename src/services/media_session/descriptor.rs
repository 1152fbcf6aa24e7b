use crate::services::platform::{Artwork, InfoKey, InfoValue, NowPlayingInfo};

use super::units::{millis_to_seconds, seconds_to_millis};

/// The session's "now playing" state, mirrored to the OS surface.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingDescriptor {
    /// Track title
    pub title: String,

    /// Track artist
    pub artist: String,

    /// Album name
    pub album: String,

    /// URL the artwork is loaded from, empty when there is none
    pub cover_url: String,

    /// Track length in seconds
    pub duration_seconds: f64,

    /// Playback position in seconds, not clamped to the duration
    pub elapsed_seconds: f64,

    /// Whether the host reports playback as running
    pub is_playing: bool,

    /// Speed applied while playing
    pub playback_speed: f64,

    /// Loaded cover image
    pub artwork: Option<Artwork>,

    /// Page handed back when the app is opened from the surface
    pub target_page: Option<String>,
}

impl Default for NowPlayingDescriptor {
    fn default() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            cover_url: String::new(),
            duration_seconds: 0.0,
            elapsed_seconds: 0.0,
            is_playing: false,
            playback_speed: 1.0,
            artwork: None,
            target_page: None,
        }
    }
}

impl NowPlayingDescriptor {
    /// Rate published to the surface: the speed while playing, zero otherwise.
    pub fn playback_rate(&self) -> f64 {
        if self.is_playing {
            self.playback_speed
        } else {
            0.0
        }
    }

    /// Playback position in milliseconds.
    pub fn elapsed_millis(&self) -> f64 {
        seconds_to_millis(self.elapsed_seconds)
    }

    /// Full record for the OS surface.
    pub fn to_info(&self) -> NowPlayingInfo {
        let mut info = NowPlayingInfo::new();
        info.insert(InfoKey::Title, InfoValue::Text(self.title.clone()));
        info.insert(InfoKey::Artist, InfoValue::Text(self.artist.clone()));
        info.insert(InfoKey::AlbumTitle, InfoValue::Text(self.album.clone()));
        info.insert(
            InfoKey::PlaybackDuration,
            InfoValue::Number(self.duration_seconds),
        );
        info.insert(
            InfoKey::ElapsedPlaybackTime,
            InfoValue::Number(self.elapsed_seconds),
        );
        info.insert(
            InfoKey::PlaybackRate,
            InfoValue::Number(self.playback_rate()),
        );
        if let Some(artwork) = &self.artwork {
            info.insert(InfoKey::Artwork, InfoValue::Artwork(artwork.clone()));
        }
        info
    }
}

/// A partial change to the descriptor.
///
/// Only the fields that were set are applied; everything else keeps its
/// current value.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct DescriptorUpdate {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    cover_url: Option<String>,
    duration_seconds: Option<f64>,
    elapsed_seconds: Option<f64>,
    is_playing: Option<bool>,
    playback_speed: Option<f64>,
    artwork: Option<Option<Artwork>>,
}

impl DescriptorUpdate {
    /// An update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the artist.
    pub fn artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the album.
    pub fn album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Set the cover URL.
    ///
    /// A URL different from the current one drops the loaded artwork.
    pub fn cover_url(mut self, url: impl Into<String>) -> Self {
        self.cover_url = Some(url.into());
        self
    }

    /// Set the duration from milliseconds.
    pub fn duration_millis(mut self, millis: f64) -> Self {
        self.duration_seconds = Some(millis_to_seconds(millis));
        self
    }

    /// Set the elapsed position from milliseconds.
    pub fn elapsed_millis(mut self, millis: f64) -> Self {
        self.elapsed_seconds = Some(millis_to_seconds(millis));
        self
    }

    /// Set the elapsed position in seconds.
    pub fn elapsed_seconds(mut self, seconds: f64) -> Self {
        self.elapsed_seconds = Some(seconds);
        self
    }

    /// Set whether playback is running.
    pub fn playing(mut self, is_playing: bool) -> Self {
        self.is_playing = Some(is_playing);
        self
    }

    /// Set the speed applied while playing.
    pub fn playback_speed(mut self, speed: f64) -> Self {
        self.playback_speed = Some(speed);
        self
    }

    /// Attach or remove the cover image.
    pub fn artwork(mut self, artwork: Option<Artwork>) -> Self {
        self.artwork = Some(artwork);
        self
    }

    /// Whether applying this update to `descriptor` switches to another cover.
    pub fn changes_cover(&self, descriptor: &NowPlayingDescriptor) -> bool {
        self.cover_url
            .as_ref()
            .is_some_and(|url| *url != descriptor.cover_url)
    }

    /// Apply the set fields to `descriptor`.
    pub(crate) fn merge_into(self, descriptor: &mut NowPlayingDescriptor) {
        if let Some(url) = self.cover_url {
            if url != descriptor.cover_url {
                descriptor.artwork = None;
            }
            descriptor.cover_url = url;
        }
        if let Some(title) = self.title {
            descriptor.title = title;
        }
        if let Some(artist) = self.artist {
            descriptor.artist = artist;
        }
        if let Some(album) = self.album {
            descriptor.album = album;
        }
        if let Some(duration) = self.duration_seconds {
            descriptor.duration_seconds = duration;
        }
        if let Some(elapsed) = self.elapsed_seconds {
            descriptor.elapsed_seconds = elapsed;
        }
        if let Some(is_playing) = self.is_playing {
            descriptor.is_playing = is_playing;
        }
        if let Some(speed) = self.playback_speed {
            descriptor.playback_speed = speed;
        }
        if let Some(artwork) = self.artwork {
            descriptor.artwork = artwork;
        }
    }
}
