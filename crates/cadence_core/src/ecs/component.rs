//! # Component System
//!
//! Components are plain data fragments attached to entities. Each type is
//! identified by its [`TypeId`] and carries a stable name used in logs and
//! diagnostics. An entity holds at most one fragment per type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Marker trait for ECS components.
///
/// # Example
///
/// ```rust
/// use cadence_core::Component;
///
/// #[derive(Clone, Debug, Default)]
/// struct Transform {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Transform {
///     const NAME: &'static str = "Transform";
/// }
/// ```
pub trait Component: Any + Send + Sync {
    /// Stable, human-readable type tag.
    const NAME: &'static str;
}

/// Runtime identifier for a component type.
///
/// Systems declare the fragments they operate on as a list of tags, which
/// [`filter_entities`](crate::ecs::filter_entities) checks without knowing the
/// concrete types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentTag {
    id: TypeId,
    name: &'static str,
}

impl ComponentTag {
    /// Returns the tag for component type `C`.
    #[inline]
    #[must_use]
    pub fn of<C: Component>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: C::NAME,
        }
    }

    /// Returns the stable name of the component type.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Returns the underlying type id.
    #[inline]
    #[must_use]
    pub const fn type_id(self) -> TypeId {
        self.id
    }
}

impl fmt::Display for ComponentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

struct Slot {
    tag: ComponentTag,
    value: Box<dyn Any + Send + Sync>,
}

/// Type-keyed map holding one fragment per component type.
///
/// This is the storage behind [`Entity`](crate::ecs::Entity). It is not
/// synchronized by itself; the entity wraps it in a reader/writer lock.
#[derive(Default)]
pub struct ComponentMap {
    slots: HashMap<TypeId, Slot>,
}

impl ComponentMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fragment, returning the one it replaced (if any).
    pub fn insert<C: Component>(&mut self, component: C) -> Option<C> {
        let slot = Slot {
            tag: ComponentTag::of::<C>(),
            value: Box::new(component),
        };
        self.slots
            .insert(TypeId::of::<C>(), slot)
            .and_then(|old| old.value.downcast::<C>().ok())
            .map(|boxed| *boxed)
    }

    /// Gets a fragment by type.
    #[inline]
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<&C> {
        self.slots
            .get(&TypeId::of::<C>())
            .and_then(|slot| slot.value.downcast_ref::<C>())
    }

    /// Gets a mutable fragment by type.
    #[inline]
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.slots
            .get_mut(&TypeId::of::<C>())
            .and_then(|slot| slot.value.downcast_mut::<C>())
    }

    /// Removes a fragment by type, returning it if present.
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        self.slots
            .remove(&TypeId::of::<C>())
            .and_then(|slot| slot.value.downcast::<C>().ok())
            .map(|boxed| *boxed)
    }

    /// Checks whether a fragment of type `C` is present.
    #[inline]
    #[must_use]
    pub fn contains<C: Component>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<C>())
    }

    /// Checks whether a fragment with the given tag is present.
    #[inline]
    #[must_use]
    pub fn contains_tag(&self, tag: ComponentTag) -> bool {
        self.slots.contains_key(&tag.type_id())
    }

    /// Checks whether every tag in `tags` is present.
    #[must_use]
    pub fn contains_all(&self, tags: &[ComponentTag]) -> bool {
        tags.iter().all(|&tag| self.contains_tag(tag))
    }

    /// Returns the number of fragments.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if there are no fragments.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over the tags of all stored fragments (unordered).
    pub fn tags(&self) -> impl Iterator<Item = ComponentTag> + '_ {
        self.slots.values().map(|slot| slot.tag)
    }

    /// Removes every fragment.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl fmt::Debug for ComponentMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.tags().map(ComponentTag::name)).finish()
    }
}
