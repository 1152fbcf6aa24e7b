use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::Stream;
use tracing::trace;

use super::{DescriptorUpdate, NowPlayingDescriptor};
use crate::services::common::Property;
use crate::services::platform::NowPlayingSurface;

/// Monotonic counter identifying which descriptor an async result targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Outcome of a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// Descriptor after the mutation
    pub descriptor: NowPlayingDescriptor,

    /// Generation after the mutation
    pub generation: Generation,
}

struct StoreState {
    descriptor: NowPlayingDescriptor,
    generation: Generation,
}

/// Single owner of the now-playing descriptor.
///
/// Every mutation merges into the descriptor and publishes the complete
/// record to the surface while still holding the lock, so publishes are
/// observed in mutation order. Clones share the same descriptor.
#[derive(Clone)]
pub struct DescriptorStore {
    state: Arc<Mutex<StoreState>>,
    surface: Arc<dyn NowPlayingSurface>,
    snapshots: Property<NowPlayingDescriptor>,
}

impl DescriptorStore {
    /// Create an empty store publishing to `surface`.
    ///
    /// Nothing is published until the first mutation.
    pub fn new(surface: Arc<dyn NowPlayingSurface>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                descriptor: NowPlayingDescriptor::default(),
                generation: Generation::default(),
            })),
            surface,
            snapshots: Property::new(NowPlayingDescriptor::default()),
        }
    }

    /// Copy of the current descriptor.
    pub fn snapshot(&self) -> NowPlayingDescriptor {
        self.lock().descriptor.clone()
    }

    /// Current generation.
    pub fn generation(&self) -> Generation {
        self.lock().generation
    }

    /// Merge `update` and publish.
    ///
    /// Switching to a different cover URL advances the generation, so any
    /// artwork still loading for the old cover is discarded on arrival.
    pub fn apply(&self, update: DescriptorUpdate) -> Applied {
        let mut state = self.lock();
        if update.changes_cover(&state.descriptor) {
            state.generation = state.generation.next();
        }
        update.merge_into(&mut state.descriptor);
        self.publish(&state.descriptor);
        Applied {
            descriptor: state.descriptor.clone(),
            generation: state.generation,
        }
    }

    /// Merge `update` and publish only if the generation is still `generation`.
    ///
    /// Returns `None` without touching anything when the descriptor has
    /// been superseded.
    pub fn apply_if_current(
        &self,
        generation: Generation,
        update: DescriptorUpdate,
    ) -> Option<NowPlayingDescriptor> {
        let mut state = self.lock();
        if state.generation != generation {
            return None;
        }
        update.merge_into(&mut state.descriptor);
        self.publish(&state.descriptor);
        Some(state.descriptor.clone())
    }

    /// Replace the whole descriptor, advance the generation, and publish.
    pub fn reset(&self, descriptor: NowPlayingDescriptor) -> Generation {
        let mut state = self.lock();
        state.descriptor = descriptor;
        state.generation = state.generation.next();
        self.publish(&state.descriptor);
        state.generation
    }

    /// Merge `update`, advance the generation, and clear the surface.
    ///
    /// The descriptor is kept so a later mutation republishes it.
    pub fn clear(&self, update: DescriptorUpdate) -> Generation {
        let mut state = self.lock();
        update.merge_into(&mut state.descriptor);
        state.generation = state.generation.next();
        trace!("Clearing now-playing surface");
        self.surface.clear();
        self.snapshots.set(state.descriptor.clone());
        state.generation
    }

    /// Stream of descriptor snapshots, starting with the current one.
    pub fn watch(&self) -> impl Stream<Item = NowPlayingDescriptor> + Send + 'static {
        self.snapshots.watch()
    }

    fn publish(&self, descriptor: &NowPlayingDescriptor) {
        trace!(
            title = %descriptor.title,
            elapsed = descriptor.elapsed_seconds,
            rate = descriptor.playback_rate(),
            "Publishing now-playing record"
        );
        self.surface.publish(&descriptor.to_info());
        self.snapshots.set(descriptor.clone());
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
