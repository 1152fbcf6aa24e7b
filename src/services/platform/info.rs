use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Decoded cover image attached to the now-playing record.
#[derive(Clone, PartialEq)]
pub struct Artwork {
    /// URL the image was fetched from
    pub source_url: String,

    /// Pixel width
    pub width: u32,

    /// Pixel height
    pub height: u32,

    /// Encoded image bytes as received
    pub data: Arc<[u8]>,
}

impl Artwork {
    /// Create an artwork handle from fetched bytes.
    pub fn new(source_url: impl Into<String>, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            source_url: source_url.into(),
            width,
            height,
            data: data.into(),
        }
    }
}

impl fmt::Debug for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artwork")
            .field("source_url", &self.source_url)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Keys of the now-playing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InfoKey {
    /// Track title
    Title,

    /// Track artist
    Artist,

    /// Album title
    AlbumTitle,

    /// Track length in seconds
    PlaybackDuration,

    /// Position in seconds at the moment of publishing
    ElapsedPlaybackTime,

    /// Playback rate, `0.0` when not playing
    PlaybackRate,

    /// Cover image
    Artwork,
}

/// Values of the now-playing record.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    /// Text value
    Text(String),

    /// Numeric value (seconds or rate)
    Number(f64),

    /// Cover image
    Artwork(Artwork),
}

/// Flat key/value record accepted by the OS now-playing surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NowPlayingInfo(BTreeMap<InfoKey, InfoValue>);

impl NowPlayingInfo {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing any previous value.
    pub fn insert(&mut self, key: InfoKey, value: InfoValue) {
        self.0.insert(key, value);
    }

    /// Raw value for a key.
    pub fn get(&self, key: InfoKey) -> Option<&InfoValue> {
        self.0.get(&key)
    }

    /// Text value for a key, if it holds text.
    pub fn text(&self, key: InfoKey) -> Option<&str> {
        match self.0.get(&key) {
            Some(InfoValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Numeric value for a key, if it holds a number.
    pub fn number(&self, key: InfoKey) -> Option<f64> {
        match self.0.get(&key) {
            Some(InfoValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    /// The cover image, if one is attached.
    pub fn artwork(&self) -> Option<&Artwork> {
        match self.0.get(&InfoKey::Artwork) {
            Some(InfoValue::Artwork(artwork)) => Some(artwork),
            _ => None,
        }
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record holds no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the record in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&InfoKey, &InfoValue)> {
        self.0.iter()
    }
}
