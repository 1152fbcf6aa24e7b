use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::Stream;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

use super::MediaSessionEvent;

/// Callback receiving outbound events.
pub type Listener = Arc<dyn Fn(&MediaSessionEvent) + Send + Sync>;

const EVENT_CHANNEL_CAPACITY: usize = 256;

struct HubInner {
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
    events_tx: broadcast::Sender<MediaSessionEvent>,
}

impl HubInner {
    fn listeners(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fan-out point for outbound events.
///
/// Events go to registered listeners synchronously, in registration
/// order, and to every broadcast subscriber.
#[derive(Clone)]
pub struct EventHub {
    inner: Arc<HubInner>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    /// Create a hub with no listeners.
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(HubInner {
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                events_tx,
            }),
        }
    }

    /// Deliver `event` to every listener and subscriber.
    pub fn emit(&self, event: MediaSessionEvent) {
        debug!(event = ?event.event, position = ?event.position, "Emitting media session event");

        let listeners: Vec<Listener> = self
            .inner
            .listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(&event);
        }

        let _ = self.inner.events_tx.send(event);
    }

    /// Register a listener; it stays until the returned handle is removed.
    pub fn add_listener(&self, listener: Listener) -> ListenerHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners().push((id, listener));
        ListenerHandle {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners().len()
    }

    /// Receiver for events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MediaSessionEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Stream of events emitted from now on.
    ///
    /// A subscriber that falls behind by more than the channel capacity
    /// skips the events it missed.
    pub fn events(&self) -> impl Stream<Item = MediaSessionEvent> + Send + 'static {
        BroadcastStream::new(self.subscribe()).filter_map(Result::ok)
    }
}

/// Deregistration handle returned by [`EventHub::add_listener`].
#[derive(Debug)]
pub struct ListenerHandle {
    id: u64,
    hub: Weak<HubInner>,
}

impl ListenerHandle {
    /// Remove the listener. Removing after the hub is gone is a no-op.
    pub fn remove(self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.listeners().retain(|(id, _)| *id != self.id);
        }
    }
}
