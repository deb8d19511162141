//! # Entity Management
//!
//! An entity is an identity, an active flag, and a set of typed fragments.
//! Entities are shared as [`EntityRef`] (`Arc<Entity>`); every accessor takes
//! `&self` and synchronizes internally:
//! - fragment access goes through a per-entity reader/writer lock
//! - the active flag is a plain atomic

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use super::component::{Component, ComponentMap, ComponentTag};

/// Shared handle to an entity.
pub type EntityRef = Arc<Entity>;

/// Unique identifier for an entity.
///
/// Ids are handed out by the world starting at 1 and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity ID from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A mutable game object.
///
/// # Locking
///
/// Guards returned by [`get_component`](Self::get_component),
/// [`get_component_mut`](Self::get_component_mut), [`fragments`](Self::fragments)
/// and [`fragments_mut`](Self::fragments_mut) hold the entity's lock. Drop
/// them before touching the same entity again, or use
/// [`fragments_mut`](Self::fragments_mut) to work on several fragments under
/// one guard.
pub struct Entity {
    id: EntityId,
    active: AtomicBool,
    components: RwLock<ComponentMap>,
}

impl Entity {
    /// Creates a new, active entity with no fragments.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            active: AtomicBool::new(true),
            components: RwLock::new(ComponentMap::new()),
        }
    }

    /// Creates a new entity already wrapped in an [`EntityRef`].
    #[must_use]
    pub fn shared(id: EntityId) -> EntityRef {
        Arc::new(Self::new(id))
    }

    /// Returns this entity's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Attaches a fragment, overwriting any fragment of the same type.
    ///
    /// Returns the replaced fragment, if there was one.
    pub fn add_component<C: Component>(&self, component: C) -> Option<C> {
        let replaced = self.components.write().insert(component);
        tracing::debug!(
            entity = self.id.get(),
            component = C::NAME,
            replaced = replaced.is_some(),
            "component added"
        );
        replaced
    }

    /// Returns a read guard to the fragment of type `C`, or `None`.
    #[must_use]
    pub fn get_component<C: Component>(&self) -> Option<MappedRwLockReadGuard<'_, C>> {
        RwLockReadGuard::try_map(self.components.read(), ComponentMap::get::<C>).ok()
    }

    /// Returns a write guard to the fragment of type `C`, or `None`.
    #[must_use]
    pub fn get_component_mut<C: Component>(&self) -> Option<MappedRwLockWriteGuard<'_, C>> {
        RwLockWriteGuard::try_map(self.components.write(), ComponentMap::get_mut::<C>).ok()
    }

    /// Returns a copy of the fragment of type `C`, or `None`.
    ///
    /// The lock is released before returning.
    #[must_use]
    pub fn component<C: Component + Clone>(&self) -> Option<C> {
        self.components.read().get::<C>().cloned()
    }

    /// Checks whether a fragment of type `C` is attached.
    #[must_use]
    pub fn has_component<C: Component>(&self) -> bool {
        self.components.read().contains::<C>()
    }

    /// Checks whether a fragment with the given tag is attached.
    #[must_use]
    pub fn has_tag(&self, tag: ComponentTag) -> bool {
        self.components.read().contains_tag(tag)
    }

    /// Checks whether every tag in `tags` is attached (one lock acquisition).
    #[must_use]
    pub fn has_all(&self, tags: &[ComponentTag]) -> bool {
        self.components.read().contains_all(tags)
    }

    /// Detaches the fragment of type `C`. No-op if absent.
    ///
    /// Returns the removed fragment.
    pub fn remove_component<C: Component>(&self) -> Option<C> {
        let removed = self.components.write().remove::<C>();
        if removed.is_some() {
            tracing::debug!(entity = self.id.get(), component = C::NAME, "component removed");
        }
        removed
    }

    /// Returns the number of attached fragments.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.read().len()
    }

    /// Locks the fragment map for reading.
    pub fn fragments(&self) -> RwLockReadGuard<'_, ComponentMap> {
        self.components.read()
    }

    /// Locks the fragment map for writing.
    pub fn fragments_mut(&self) -> RwLockWriteGuard<'_, ComponentMap> {
        self.components.write()
    }

    /// Sets the active flag.
    #[inline]
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }

    /// Returns the active flag.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .field("components", &*self.components.read())
            .finish()
    }
}
