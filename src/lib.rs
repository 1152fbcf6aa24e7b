//! Media Session Bridge - mirrors a host application's playback state to the
//! OS "now playing" surface and reports OS transport commands back.
//!
//! The host drives a [`MediaSessionBridge`](services::MediaSessionBridge)
//! with calls such as `init`, `updateMetadata` and `updatePlaybackState`.
//! The bridge keeps a single now-playing descriptor, publishes the complete
//! record to the OS on every change, and emits `mediaSessionEvent` events
//! when the user presses play, pause, seek and so on from the lock screen,
//! notification or media keys.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use media_session_bridge::services::media_session::{InitOptions, MediaSessionBridge};
//! use media_session_bridge::services::platform::memory::MemoryPlatform;
//!
//! # async fn run() -> media_session_bridge::Result<()> {
//! let platform = MemoryPlatform::new();
//! let bridge = MediaSessionBridge::new(platform.platform(), None);
//!
//! let _handle = bridge.add_listener("mediaSessionEvent", |event| {
//!     println!("{event:?}");
//! })?;
//!
//! bridge
//!     .init(InitOptions {
//!         title: Some(String::from("Song")),
//!         is_playing: Some(true),
//!         ..InitOptions::default()
//!     })
//!     .await;
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Media session and OS integration services.
pub mod services;

/// Logging set-up for the host binary.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{BridgeError, Result};
