/// Shared reactive building blocks
pub mod common;
/// Media session bridge between a host application and the OS
pub mod media_session;
/// OS collaborators of the media session
pub mod platform;

pub use media_session::{
    MediaSessionBridge, MediaSessionEvent, MediaSessionEventKind, NowPlayingDescriptor,
};
pub use platform::{Platform, PlatformError};
