//! Unit tests for the media session module
//!
//! Covers descriptor merging, the store's publish and generation rules,
//! payload parsing, event fan-out and remote command translation.
//! Artwork loading is covered in the `artwork_loading` submodule.

#![allow(clippy::unwrap_used, clippy::panic)]


use std::pin::pin;
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use serde_json::json;

use super::*;
use crate::services::platform::memory::MemoryPlatform;
use crate::services::platform::{Artwork, CommandStatus, InfoKey, RemoteCommand};

fn recorded_events(hub: &EventHub) -> (Arc<Mutex<Vec<MediaSessionEvent>>>, ListenerHandle) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let handle = hub.add_listener(Arc::new(move |event: &MediaSessionEvent| {
        sink.lock().unwrap().push(event.clone());
    }));
    (events, handle)
}

fn translator_fixture() -> (MemoryPlatform, DescriptorStore, EventHub, RemoteCommandTranslator) {
    let platform = MemoryPlatform::new();
    let store = DescriptorStore::new(platform.surface.clone());
    let hub = EventHub::new();
    let translator = RemoteCommandTranslator::new(store.clone(), hub.clone());
    translator.register(platform.commands.as_ref());
    (platform, store, hub, translator)
}

#[test]
fn units_convert_exactly() {
    assert_eq!(units::millis_to_seconds(5000.0), 5.0);
    assert_eq!(units::millis_to_seconds(1.0), 0.001);
    assert_eq!(units::seconds_to_millis(12.5), 12500.0);
}

#[test]
fn descriptor_defaults() {
    let descriptor = NowPlayingDescriptor::default();

    assert!(descriptor.title.is_empty());
    assert!(!descriptor.is_playing);
    assert_eq!(descriptor.playback_speed, 1.0);
    assert_eq!(descriptor.playback_rate(), 0.0);
    assert!(descriptor.artwork.is_none());
}

#[test]
fn playback_rate_follows_playing_state() {
    let mut descriptor = NowPlayingDescriptor {
        playback_speed: 1.5,
        ..NowPlayingDescriptor::default()
    };
    assert_eq!(descriptor.playback_rate(), 0.0);

    descriptor.is_playing = true;
    assert_eq!(descriptor.playback_rate(), 1.5);
}

#[test]
fn update_merges_only_set_fields() {
    let mut descriptor = NowPlayingDescriptor {
        title: String::from("Old"),
        artist: String::from("Artist"),
        album: String::from("Album"),
        duration_seconds: 120.0,
        ..NowPlayingDescriptor::default()
    };

    DescriptorUpdate::new()
        .title("New")
        .duration_millis(90_000.0)
        .merge_into(&mut descriptor);

    assert_eq!(descriptor.title, "New");
    assert_eq!(descriptor.artist, "Artist");
    assert_eq!(descriptor.album, "Album");
    assert_eq!(descriptor.duration_seconds, 90.0);
}

#[test]
fn cover_change_drops_artwork() {
    let artwork = Artwork::new("https://example.com/a.png", 1, 1, vec![0]);
    let mut descriptor = NowPlayingDescriptor {
        cover_url: String::from("https://example.com/a.png"),
        artwork: Some(artwork.clone()),
        ..NowPlayingDescriptor::default()
    };

    let same = DescriptorUpdate::new().cover_url("https://example.com/a.png");
    assert!(!same.changes_cover(&descriptor));
    same.merge_into(&mut descriptor);
    assert_eq!(descriptor.artwork, Some(artwork));

    let other = DescriptorUpdate::new().cover_url("https://example.com/b.png");
    assert!(other.changes_cover(&descriptor));
    other.merge_into(&mut descriptor);
    assert!(descriptor.artwork.is_none());
    assert_eq!(descriptor.cover_url, "https://example.com/b.png");
}

#[test]
fn to_info_carries_every_key() {
    let descriptor = NowPlayingDescriptor {
        title: String::from("Song"),
        artist: String::from("Band"),
        album: String::from("Record"),
        duration_seconds: 200.0,
        elapsed_seconds: 5.0,
        is_playing: true,
        ..NowPlayingDescriptor::default()
    };

    let info = descriptor.to_info();

    assert_eq!(info.len(), 6);
    assert_eq!(info.text(InfoKey::Title), Some("Song"));
    assert_eq!(info.text(InfoKey::Artist), Some("Band"));
    assert_eq!(info.text(InfoKey::AlbumTitle), Some("Record"));
    assert_eq!(info.number(InfoKey::PlaybackDuration), Some(200.0));
    assert_eq!(info.number(InfoKey::ElapsedPlaybackTime), Some(5.0));
    assert_eq!(info.number(InfoKey::PlaybackRate), Some(1.0));
    assert!(info.artwork().is_none());
}

#[test]
fn store_publishes_full_record_on_apply() {
    let platform = MemoryPlatform::new();
    let store = DescriptorStore::new(platform.surface.clone());
    assert!(platform.surface.current().is_none());

    store.apply(DescriptorUpdate::new().title("Song").artist("Band"));
    store.apply(DescriptorUpdate::new().album("Record"));

    let info = platform.surface.current().unwrap();
    assert_eq!(info.text(InfoKey::Title), Some("Song"));
    assert_eq!(info.text(InfoKey::Artist), Some("Band"));
    assert_eq!(info.text(InfoKey::AlbumTitle), Some("Record"));
    assert_eq!(platform.surface.publish_count(), 2);
}

#[test]
fn store_generation_moves_on_cover_change_only() {
    let platform = MemoryPlatform::new();
    let store = DescriptorStore::new(platform.surface.clone());
    let start = store.generation();

    let applied = store.apply(DescriptorUpdate::new().title("Song"));
    assert_eq!(applied.generation, start);

    let applied = store.apply(DescriptorUpdate::new().cover_url("https://example.com/a.png"));
    assert!(applied.generation > start);

    let again = store.apply(DescriptorUpdate::new().cover_url("https://example.com/a.png"));
    assert_eq!(again.generation, applied.generation);
}

#[test]
fn apply_if_current_rejects_stale_generation() {
    let platform = MemoryPlatform::new();
    let store = DescriptorStore::new(platform.surface.clone());

    let stale = store.reset(NowPlayingDescriptor::default());
    let current = store.reset(NowPlayingDescriptor::default());
    let publishes = platform.surface.publish_count();

    assert!(
        store
            .apply_if_current(stale, DescriptorUpdate::new().title("Late"))
            .is_none()
    );
    assert_eq!(platform.surface.publish_count(), publishes);
    assert!(store.snapshot().title.is_empty());

    let merged = store
        .apply_if_current(current, DescriptorUpdate::new().title("On time"))
        .unwrap();
    assert_eq!(merged.title, "On time");
}

#[test]
fn clear_keeps_descriptor_and_republishes_later() {
    let platform = MemoryPlatform::new();
    let store = DescriptorStore::new(platform.surface.clone());
    store.apply(DescriptorUpdate::new().title("Song").playing(true));

    store.clear(DescriptorUpdate::new().playing(false));

    assert!(platform.surface.current().is_none());
    assert_eq!(platform.surface.clear_count(), 1);
    assert_eq!(store.snapshot().title, "Song");

    store.apply(DescriptorUpdate::new().playing(true));
    let info = platform.surface.current().unwrap();
    assert_eq!(info.text(InfoKey::Title), Some("Song"));
}

#[tokio::test]
async fn store_watch_yields_snapshots() {
    let platform = MemoryPlatform::new();
    let store = DescriptorStore::new(platform.surface.clone());
    let mut updates = pin!(store.watch());

    assert!(updates.next().await.unwrap().title.is_empty());

    store.apply(DescriptorUpdate::new().title("Song"));
    assert_eq!(updates.next().await.unwrap().title, "Song");
}

#[test]
fn init_options_read_payload() {
    let options = InitOptions::from_payload(&json!({
        "title": "Song",
        "artist": "Band",
        "album": "Record",
        "cover": "https://example.com/a.png",
        "duration": 200000,
        "position": 5000.5,
        "isPlaying": true,
        "targetPage": "player",
    }));

    assert_eq!(options.title.as_deref(), Some("Song"));
    assert_eq!(options.artist.as_deref(), Some("Band"));
    assert_eq!(options.album.as_deref(), Some("Record"));
    assert_eq!(options.cover.as_deref(), Some("https://example.com/a.png"));
    assert_eq!(options.duration_ms, Some(200_000.0));
    assert_eq!(options.position_ms, Some(5000.5));
    assert_eq!(options.is_playing, Some(true));
    assert_eq!(options.target_page.as_deref(), Some("player"));
}

#[test]
fn options_treat_wrong_types_as_absent() {
    let options = InitOptions::from_payload(&json!({
        "title": 42,
        "duration": "long",
        "isPlaying": "yes",
        "targetPage": null,
    }));
    assert_eq!(options, InitOptions::default());

    let options = UpdateMetadataOptions::from_payload(&json!("not an object"));
    assert_eq!(options, UpdateMetadataOptions::default());

    let options = SeekToOptions::from_payload(&json!({ "position": [1] }));
    assert!(options.position_ms.is_none());
}

#[test]
fn options_treat_negative_numbers_as_absent() {
    let options = InitOptions::from_payload(&json!({
        "duration": -1000,
        "position": -5000,
    }));
    assert!(options.duration_ms.is_none());
    assert!(options.position_ms.is_none());

    let options = SeekToOptions::from_payload(&json!({ "position": -5000 }));
    assert!(options.position_ms.is_none());

    let options = UpdatePlaybackStateOptions::from_payload(&json!({
        "state": "playing",
        "position": -1,
        "playbackSpeed": -2.0,
    }));
    assert!(options.position_ms.is_none());
    assert!(options.playback_speed.is_none());

    let options = SeekToOptions::from_payload(&json!({ "position": 0 }));
    assert_eq!(options.position_ms, Some(0.0));
}

#[test]
fn playback_state_names() {
    assert_eq!(PlaybackStateName::parse("playing"), PlaybackStateName::Playing);
    assert_eq!(PlaybackStateName::parse("stopped"), PlaybackStateName::Stopped);
    assert_eq!(PlaybackStateName::parse("paused"), PlaybackStateName::Paused);
    assert_eq!(PlaybackStateName::parse("buffering"), PlaybackStateName::Paused);

    let options = UpdatePlaybackStateOptions::from_payload(&json!({
        "state": "playing",
        "position": 1000,
        "playbackSpeed": 1.5,
    }));
    assert!(options.state.is_playing());
    assert_eq!(options.position_ms, Some(1000.0));
    assert_eq!(options.playback_speed, Some(1.5));

    let options = UpdatePlaybackStateOptions::from_payload(&json!({}));
    assert!(!options.state.is_playing());
}

#[test]
fn event_payload_shape() {
    let play = MediaSessionEvent::with_position(MediaSessionEventKind::Play, 5000.0);
    assert_eq!(
        serde_json::to_value(&play).unwrap(),
        json!({ "event": "play", "position": 5000.0 })
    );

    let previous = MediaSessionEvent::new(MediaSessionEventKind::Previous);
    assert_eq!(
        serde_json::to_value(&previous).unwrap(),
        json!({ "event": "previous" })
    );

    let open = MediaSessionEvent::open_app(Some(String::from("player")));
    assert_eq!(
        serde_json::to_value(&open).unwrap(),
        json!({ "event": "openApp", "data": { "targetPage": "player" } })
    );

    let dismissed = MediaSessionEvent::new(MediaSessionEventKind::NotificationDismissed);
    assert_eq!(
        serde_json::to_value(&dismissed).unwrap(),
        json!({ "event": "notificationDismissed" })
    );
}

#[test]
fn hub_delivers_in_registration_order() {
    let hub = EventHub::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let first = order.clone();
    let _a = hub.add_listener(Arc::new(move |_: &MediaSessionEvent| {
        first.lock().unwrap().push("a");
    }));
    let second = order.clone();
    let _b = hub.add_listener(Arc::new(move |_: &MediaSessionEvent| {
        second.lock().unwrap().push("b");
    }));

    hub.emit(MediaSessionEvent::new(MediaSessionEventKind::Next));

    assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
}

#[test]
fn removed_listener_stops_receiving() {
    let hub = EventHub::new();
    let (events, handle) = recorded_events(&hub);

    hub.emit(MediaSessionEvent::new(MediaSessionEventKind::Next));
    handle.remove();
    hub.emit(MediaSessionEvent::new(MediaSessionEventKind::Next));

    assert_eq!(events.lock().unwrap().len(), 1);
    assert_eq!(hub.listener_count(), 0);
}

#[test]
fn listener_may_remove_itself_during_emit() {
    let hub = EventHub::new();
    let slot: Arc<Mutex<Option<ListenerHandle>>> = Arc::new(Mutex::new(None));

    let own = slot.clone();
    let handle = hub.add_listener(Arc::new(move |_: &MediaSessionEvent| {
        if let Some(handle) = own.lock().unwrap().take() {
            handle.remove();
        }
    }));
    *slot.lock().unwrap() = Some(handle);

    hub.emit(MediaSessionEvent::new(MediaSessionEventKind::Next));

    assert_eq!(hub.listener_count(), 0);
}

#[tokio::test]
async fn hub_events_stream_receives_emits() {
    let hub = EventHub::new();
    let mut events = pin!(hub.events());

    hub.emit(MediaSessionEvent::new(MediaSessionEventKind::Stop));

    let event = events.next().await.unwrap();
    assert_eq!(event.event, MediaSessionEventKind::Stop);
}

#[test]
fn os_play_and_pause_update_rate_and_report_position() {
    let (platform, store, hub, _translator) = translator_fixture();
    let (events, _handle) = recorded_events(&hub);
    store.apply(
        DescriptorUpdate::new()
            .elapsed_millis(42_000.0)
            .playback_speed(1.5),
    );

    assert_eq!(
        platform.commands.send(RemoteCommand::Play),
        CommandStatus::Success
    );
    let info = platform.surface.current().unwrap();
    assert_eq!(info.number(InfoKey::PlaybackRate), Some(1.5));

    assert_eq!(
        platform.commands.send(RemoteCommand::Pause),
        CommandStatus::Success
    );
    let info = platform.surface.current().unwrap();
    assert_eq!(info.number(InfoKey::PlaybackRate), Some(0.0));

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            MediaSessionEvent::with_position(MediaSessionEventKind::Play, 42_000.0),
            MediaSessionEvent::with_position(MediaSessionEventKind::Pause, 42_000.0),
        ]
    );
}

#[test]
fn os_stop_resets_position() {
    let (platform, store, hub, _translator) = translator_fixture();
    let (events, _handle) = recorded_events(&hub);
    store.apply(DescriptorUpdate::new().elapsed_millis(9000.0).playing(true));

    platform.commands.send(RemoteCommand::Stop);

    let descriptor = store.snapshot();
    assert!(!descriptor.is_playing);
    assert_eq!(descriptor.elapsed_seconds, 0.0);
    assert_eq!(
        events.lock().unwrap()[0],
        MediaSessionEvent::with_position(MediaSessionEventKind::Stop, 0.0)
    );
}

#[test]
fn os_previous_emits_one_bare_event() {
    let (platform, store, hub, _translator) = translator_fixture();
    let (events, _handle) = recorded_events(&hub);
    let before = store.snapshot();

    platform.commands.send(RemoteCommand::PreviousTrack);

    assert_eq!(
        *events.lock().unwrap(),
        vec![MediaSessionEvent::new(MediaSessionEventKind::Previous)]
    );
    assert_eq!(store.snapshot(), before);
}

#[test]
fn os_change_position_reports_milliseconds() {
    let (platform, _store, hub, _translator) = translator_fixture();
    let (events, _handle) = recorded_events(&hub);

    let status = platform
        .commands
        .send(RemoteCommand::ChangePlaybackPosition {
            position_seconds: Some(12.5),
        });

    assert_eq!(status, CommandStatus::Success);
    assert_eq!(
        *events.lock().unwrap(),
        vec![MediaSessionEvent::with_position(
            MediaSessionEventKind::SeekTo,
            12_500.0
        )]
    );
}

#[test]
fn change_position_without_position_fails_silently() {
    let (platform, _store, hub, _translator) = translator_fixture();
    let (events, _handle) = recorded_events(&hub);

    let status = platform
        .commands
        .send(RemoteCommand::ChangePlaybackPosition {
            position_seconds: None,
        });

    assert_eq!(status, CommandStatus::CommandFailed);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn raise_reports_target_page() {
    let (platform, store, hub, _translator) = translator_fixture();
    let (events, _handle) = recorded_events(&hub);
    store.reset(NowPlayingDescriptor {
        target_page: Some(String::from("player")),
        ..NowPlayingDescriptor::default()
    });

    platform.commands.send(RemoteCommand::Raise);

    assert_eq!(
        *events.lock().unwrap(),
        vec![MediaSessionEvent::open_app(Some(String::from("player")))]
    );
}

#[test]
fn registering_twice_keeps_one_handler_per_slot() {
    let (platform, _store, hub, translator) = translator_fixture();
    let (events, _handle) = recorded_events(&hub);

    translator.register(platform.commands.as_ref());
    assert_eq!(
        platform.commands.handler_count(),
        crate::services::platform::CommandSlot::ALL.len()
    );

    platform.commands.send(RemoteCommand::NextTrack);
    assert_eq!(events.lock().unwrap().len(), 1);
}
