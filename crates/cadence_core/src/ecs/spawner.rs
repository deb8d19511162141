//! # Entity Spawner
//!
//! Shared id allocator plus a queue of entities created mid-tick.
//!
//! Systems only see a slice of the world's entities while they run, so a
//! spawning system cannot append to the world directly. It holds an
//! [`EntitySpawner`] instead; the world drains the queue once the tick is over.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::entity::{Entity, EntityId, EntityRef};

/// Cloneable handle for allocating ids and queueing new entities.
///
/// All clones share one counter, so ids stay unique and monotonic no matter
/// which handle allocates them.
#[derive(Clone, Debug)]
pub struct EntitySpawner {
    next_id: Arc<AtomicU64>,
    pending: Arc<Mutex<Vec<EntityRef>>>,
}

impl EntitySpawner {
    /// First id handed out by a fresh spawner.
    pub const FIRST_ID: u64 = 1;

    /// Creates a spawner whose first id is [`Self::FIRST_ID`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: Arc::new(AtomicU64::new(Self::FIRST_ID)),
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Allocates the next id without creating an entity.
    #[inline]
    pub fn allocate_id(&self) -> EntityId {
        EntityId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates an entity with a fresh id and queues it for insertion.
    ///
    /// The returned handle can be used to attach fragments right away.
    pub fn spawn(&self) -> EntityRef {
        let entity = Entity::shared(self.allocate_id());
        self.pending.lock().push(Arc::clone(&entity));
        entity
    }

    /// Takes every queued entity, in spawn order.
    pub fn drain_pending(&self) -> Vec<EntityRef> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Returns the number of queued entities.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Default for EntitySpawner {
    fn default() -> Self {
        Self::new()
    }
}
