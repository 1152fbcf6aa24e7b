//! Media session bridge.
//!
//! Keeps one now-playing descriptor per session, mirrors it to the OS
//! surface on every change, and turns OS transport commands into
//! `mediaSessionEvent` events for the host application.

/// Background artwork fetching
pub mod artwork;
/// Host-facing bridge
pub mod bridge;
/// Now-playing descriptor and partial updates
pub mod descriptor;
/// Outbound event payloads
pub mod events;
/// Listener registry and event broadcast
pub mod listeners;
/// Call payload parsing
pub mod options;
/// Descriptor ownership and publication
pub mod store;
/// Remote command translation
pub mod translator;
/// Millisecond and second conversions
pub mod units;

#[cfg(test)]
mod tests;

pub use artwork::*;
pub use bridge::*;
pub use descriptor::*;
pub use events::*;
pub use listeners::*;
pub use options::*;
pub use store::*;
pub use translator::*;
