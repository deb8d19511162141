//! # World
//!
//! Owns the entity list, the system scheduler and the event dispatcher.
//!
//! Entities keep insertion order. Systems run through the scheduler's
//! resolved order; entities spawned during a tick through the
//! [`EntitySpawner`] are appended once the tick has finished.

use std::fmt;
use std::sync::Arc;

use cadence_core::{
    Entity, EntityId, EntityRef, EntitySpawner, EventDispatcher, Surface, System, SystemInfo,
};
use cadence_schedule::{Resolution, ScheduleManifest, Scheduler};

use crate::error::{EngineError, EngineResult};

/// Container for entities, systems and events.
///
/// # Example
///
/// ```rust
/// use cadence::World;
/// use cadence_core::{EntityId, EntityRef, EventDispatcher, System, SystemInfo, SystemResult};
///
/// struct Deactivate;
/// impl System for Deactivate {
///     fn update(&mut self, _: f32, entities: &[EntityRef], _: &EventDispatcher) -> SystemResult {
///         entities.iter().for_each(|e| e.set_active(false));
///         Ok(())
///     }
/// }
///
/// let mut world = World::new();
/// let first = world.new_entity();
/// assert_eq!(first.id(), EntityId::new(1));
///
/// world.register_system(SystemInfo::new("Deactivate"), Deactivate)?;
/// world.build_execution_order()?;
/// world.update(0.016)?;
///
/// assert_eq!(world.remove_inactive_entities(), 1);
/// assert!(world.entities().is_empty());
/// # Ok::<(), cadence::EngineError>(())
/// ```
pub struct World {
    entities: Vec<EntityRef>,
    scheduler: Scheduler,
    events: Arc<EventDispatcher>,
    spawner: EntitySpawner,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            scheduler: Scheduler::new(),
            events: Arc::new(EventDispatcher::new()),
            spawner: EntitySpawner::new(),
        }
    }

    // =========================================================================
    // ENTITIES
    // =========================================================================

    /// Creates an entity with the next id and appends it.
    pub fn new_entity(&mut self) -> EntityRef {
        let entity = Entity::shared(self.spawner.allocate_id());
        tracing::debug!(entity = entity.id().get(), "entity created");
        self.entities.push(Arc::clone(&entity));
        entity
    }

    /// Appends an existing entity as-is.
    ///
    /// The id is not checked; the caller owns id uniqueness for entities
    /// built outside the world.
    pub fn add_entity(&mut self, entity: EntityRef) {
        self.entities.push(entity);
    }

    /// Removes the first occurrence of `entity` (by identity, not id).
    ///
    /// Returns the removed handle, or `None` if it was not present.
    pub fn remove_entity(&mut self, entity: &EntityRef) -> Option<EntityRef> {
        let index = self.entities.iter().position(|e| Arc::ptr_eq(e, entity))?;
        tracing::debug!(entity = entity.id().get(), "entity removed");
        Some(self.entities.remove(index))
    }

    /// Drops every inactive entity, preserving the order of the rest.
    ///
    /// Returns the number removed.
    pub fn remove_inactive_entities(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| e.is_active());
        let removed = before - self.entities.len();
        if removed > 0 {
            tracing::debug!(removed, "inactive entities swept");
        }
        removed
    }

    /// Removes every entity.
    pub fn clear_all_entities(&mut self) {
        self.entities.clear();
    }

    /// Entities in insertion order.
    #[must_use]
    pub fn entities(&self) -> &[EntityRef] {
        &self.entities
    }

    /// Number of entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Finds an entity by id.
    #[must_use]
    pub fn find_entity(&self, id: EntityId) -> Option<&EntityRef> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Handle for spawning entities from inside systems.
    #[must_use]
    pub fn spawner(&self) -> &EntitySpawner {
        &self.spawner
    }

    /// Appends every entity queued through the spawner.
    ///
    /// Returns the number appended.
    pub fn flush_spawned(&mut self) -> usize {
        let spawned = self.spawner.drain_pending();
        let count = spawned.len();
        self.entities.extend(spawned);
        count
    }

    // =========================================================================
    // SYSTEMS
    // =========================================================================

    /// Registers a system.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::register`].
    pub fn register_system<S>(&mut self, info: SystemInfo, system: S) -> EngineResult<()>
    where
        S: System + 'static,
    {
        Ok(self.scheduler.register(info, system)?)
    }

    /// Registers every system a manifest describes, in manifest order.
    ///
    /// `factory` builds the instance for each descriptor.
    ///
    /// # Errors
    ///
    /// - `UnknownSystem` if `factory` returns `None` for a descriptor
    /// - any registration error from [`Scheduler::register_boxed`]
    pub fn register_manifest<F>(&mut self, manifest: &ScheduleManifest, mut factory: F) -> EngineResult<()>
    where
        F: FnMut(&SystemInfo) -> Option<Box<dyn System>>,
    {
        for info in &manifest.systems {
            let system = factory(info).ok_or_else(|| EngineError::UnknownSystem(info.name.clone()))?;
            self.scheduler.register_boxed(info.clone(), system)?;
        }
        Ok(())
    }

    /// Resolves the execution order. Must succeed before the first update.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::build_execution_order`].
    pub fn build_execution_order(&mut self) -> EngineResult<&Resolution> {
        Ok(self.scheduler.build_execution_order()?)
    }

    /// The system scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The system scheduler, mutably.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// The event dispatcher shared with every system.
    ///
    /// Handlers that publish follow-up events can hold a clone of this `Arc`.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    // =========================================================================
    // TICK
    // =========================================================================

    /// Runs one tick: every scheduled system in update order, then appends
    /// entities spawned during the tick.
    ///
    /// # Errors
    ///
    /// `NotBuilt` before a successful build, or the first system failure.
    /// Spawned entities are appended even when a system fails.
    pub fn update(&mut self, delta_time: f32) -> EngineResult<()> {
        let result = self
            .scheduler
            .update_all(delta_time, &self.entities, &self.events);
        self.flush_spawned();
        Ok(result?)
    }

    /// Runs the draw pass.
    ///
    /// # Errors
    ///
    /// `NotBuilt` before a successful build, or the first draw failure.
    pub fn draw(&mut self, surface: &mut dyn Surface) -> EngineResult<()> {
        Ok(self.scheduler.draw_all(surface, &self.entities)?)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("scheduler", &self.scheduler)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
