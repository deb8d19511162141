//! # System Contract
//!
//! Behavior units ("systems") implement [`System`] and are described to the
//! scheduler by a [`SystemInfo`]. The descriptor carries everything the
//! dependency resolver needs; the trait carries the per-tick behavior.
//!
//! ## Example
//!
//! ```rust
//! use cadence_core::{
//!     filter_entities, Component, ComponentTag, EntityRef, EventDispatcher, System,
//!     SystemInfo, SystemResult,
//! };
//!
//! struct Velocity(f32);
//! impl Component for Velocity {
//!     const NAME: &'static str = "Velocity";
//! }
//!
//! struct Damping {
//!     required: [ComponentTag; 1],
//! }
//!
//! impl System for Damping {
//!     fn update(&mut self, dt: f32, entities: &[EntityRef], _: &EventDispatcher) -> SystemResult {
//!         for entity in filter_entities(entities, &self.required) {
//!             if let Some(mut v) = entity.get_component_mut::<Velocity>() {
//!                 v.0 *= 1.0 - dt;
//!             }
//!         }
//!         Ok(())
//!     }
//!
//!     fn required_components(&self) -> &[ComponentTag] {
//!         &self.required
//!     }
//! }
//!
//! let info = SystemInfo::new("Damping").with_dependency("Movement");
//! assert_eq!(info.dependencies, vec!["Movement".to_string()]);
//! ```

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::ecs::{filter_entities, ComponentTag, EntityRef};
use crate::error::SystemResult;
use crate::events::EventDispatcher;

/// A per-tick behavior unit.
pub trait System {
    /// Runs one tick of this system.
    ///
    /// # Errors
    ///
    /// Returns an error if the system fails or an event it publishes is
    /// rejected; the scheduler stops the tick at the first error.
    fn update(
        &mut self,
        delta_time: f32,
        entities: &[EntityRef],
        events: &EventDispatcher,
    ) -> SystemResult;

    /// Fragment types an entity needs for this system to act on it.
    fn required_components(&self) -> &[ComponentTag] {
        &[]
    }

    /// Active entities carrying every fragment in
    /// [`required_components`](Self::required_components).
    fn matching_entities<'a>(
        &'a self,
        entities: &'a [EntityRef],
    ) -> impl Iterator<Item = &'a EntityRef> + 'a
    where
        Self: Sized,
    {
        filter_entities(entities, self.required_components())
    }

    /// Returns the drawable view of this system, if it has one.
    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        None
    }
}

/// Presentation-phase capability of a system.
pub trait Drawable {
    /// Draws the system's view of `entities` onto `surface`.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails.
    fn draw(&mut self, surface: &mut dyn Surface, entities: &[EntityRef]) -> SystemResult;
}

/// Opaque render target handed to [`Drawable::draw`].
///
/// Drawables downcast through [`Surface::as_any_mut`] to the concrete target
/// type they know how to draw on.
pub trait Surface: Any {
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Descriptor of a registered system.
///
/// Loaded from TOML manifests (see `cadence_schedule::ScheduleManifest`) or
/// built in code with the `with_*` methods.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Unique type tag of the system.
    pub name: String,
    /// Systems that must run before this one.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Systems that must not be registered alongside this one.
    #[serde(default)]
    pub conflicts: Vec<String>,
    /// Capabilities this system provides.
    #[serde(default)]
    pub provides: Vec<String>,
    /// Capabilities that some earlier system must provide.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Whether the system takes part in the draw pass.
    #[serde(default)]
    pub drawable: bool,
    /// Whether the system may be dropped when its requirements are unmet.
    #[serde(default)]
    pub optional: bool,
}

impl SystemInfo {
    /// Creates a descriptor with no relations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an explicit dependency.
    #[must_use]
    pub fn with_dependency(mut self, system: impl Into<String>) -> Self {
        self.dependencies.push(system.into());
        self
    }

    /// Adds a conflicting system.
    #[must_use]
    pub fn with_conflict(mut self, system: impl Into<String>) -> Self {
        self.conflicts.push(system.into());
        self
    }

    /// Adds a provided capability.
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.provides.push(capability.into());
        self
    }

    /// Adds a required capability.
    #[must_use]
    pub fn with_requirement(mut self, capability: impl Into<String>) -> Self {
        self.requires.push(capability.into());
        self
    }

    /// Sets the drawable flag.
    #[must_use]
    pub const fn with_drawable(mut self, drawable: bool) -> Self {
        self.drawable = drawable;
        self
    }

    /// Sets the optional flag.
    #[must_use]
    pub const fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
}
