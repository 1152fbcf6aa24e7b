use std::collections::HashMap;

use tracing::warn;
use zbus::zvariant::{ObjectPath, OwnedValue, Value};

use crate::services::platform::{InfoKey, NowPlayingInfo};

/// Track id reported when nothing is playing.
pub(super) const NO_TRACK_PATH: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";

const TRACK_PATH_PREFIX: &str = "/org/mpris/MediaPlayer2/Track";

/// Convert seconds to MPRIS time in microseconds
pub(super) fn seconds_to_micros(seconds: f64) -> i64 {
    (seconds * 1_000_000.0).round() as i64
}

/// Convert MPRIS time in microseconds to seconds
pub(super) fn micros_to_seconds(micros: i64) -> f64 {
    micros as f64 / 1_000_000.0
}

/// Object path identifying the `index`th track published in this session.
pub(super) fn track_path(index: u64) -> ObjectPath<'static> {
    ObjectPath::try_from(format!("{TRACK_PATH_PREFIX}/{index}"))
        .unwrap_or_else(|_| ObjectPath::from_static_str_unchecked(NO_TRACK_PATH))
}

/// Build the `Metadata` property map for a now-playing record.
pub(super) fn track_metadata(
    info: &NowPlayingInfo,
    track_id: &ObjectPath<'_>,
) -> HashMap<String, OwnedValue> {
    let mut metadata = HashMap::new();

    insert(&mut metadata, "mpris:trackid", Value::from(track_id.clone()));

    if let Some(duration) = info.number(InfoKey::PlaybackDuration) {
        insert(
            &mut metadata,
            "mpris:length",
            Value::from(seconds_to_micros(duration)),
        );
    }

    if let Some(title) = info.text(InfoKey::Title) {
        insert(&mut metadata, "xesam:title", Value::from(title.to_string()));
    }

    if let Some(artist) = info.text(InfoKey::Artist).filter(|a| !a.is_empty()) {
        insert(
            &mut metadata,
            "xesam:artist",
            Value::from(vec![artist.to_string()]),
        );
    }

    if let Some(album) = info.text(InfoKey::AlbumTitle) {
        insert(&mut metadata, "xesam:album", Value::from(album.to_string()));
    }

    if let Some(artwork) = info.artwork() {
        insert(
            &mut metadata,
            "mpris:artUrl",
            Value::from(artwork.source_url.clone()),
        );
    }

    metadata
}

fn insert(metadata: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    match value.try_to_owned() {
        Ok(owned) => {
            metadata.insert(key.to_string(), owned);
        }
        Err(err) => warn!("Failed to encode metadata field {key}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::services::platform::{Artwork, InfoValue};

    fn owned(value: Value<'_>) -> OwnedValue {
        value.try_to_owned().unwrap()
    }

    #[test]
    fn converts_micros() {
        assert_eq!(seconds_to_micros(2.5), 2_500_000);
        assert_eq!(micros_to_seconds(1_500_000), 1.5);
    }

    #[test]
    fn metadata_maps_record_fields() {
        let mut info = NowPlayingInfo::new();
        info.insert(InfoKey::Title, InfoValue::Text(String::from("Song")));
        info.insert(InfoKey::Artist, InfoValue::Text(String::from("Band")));
        info.insert(InfoKey::AlbumTitle, InfoValue::Text(String::from("Record")));
        info.insert(InfoKey::PlaybackDuration, InfoValue::Number(200.0));
        info.insert(
            InfoKey::Artwork,
            InfoValue::Artwork(Artwork::new("https://example.com/a.png", 1, 1, vec![0])),
        );

        let metadata = track_metadata(&info, &track_path(3));

        assert_eq!(
            metadata.get("mpris:length"),
            Some(&owned(Value::from(200_000_000_i64)))
        );
        assert_eq!(metadata.get("xesam:title"), Some(&owned(Value::from("Song"))));
        assert_eq!(
            metadata.get("xesam:artist"),
            Some(&owned(Value::from(vec![String::from("Band")])))
        );
        assert_eq!(
            metadata.get("mpris:artUrl"),
            Some(&owned(Value::from("https://example.com/a.png")))
        );
        assert!(metadata.contains_key("mpris:trackid"));
    }

    #[test]
    fn empty_artist_is_omitted() {
        let mut info = NowPlayingInfo::new();
        info.insert(InfoKey::Artist, InfoValue::Text(String::new()));

        let metadata = track_metadata(&info, &track_path(0));

        assert!(!metadata.contains_key("xesam:artist"));
        assert!(!metadata.contains_key("mpris:artUrl"));
    }
}
