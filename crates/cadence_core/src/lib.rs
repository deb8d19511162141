//! # CADENCE Core
//!
//! The execution substrate every behavior unit builds on:
//! - entity store with typed, swappable fragments
//! - synchronous event dispatcher
//! - the [`System`] contract and its [`SystemInfo`] descriptor
//!
//! ## Architecture Rules
//!
//! 1. **Typed fragments** - components are keyed by type, never by string
//! 2. **One fragment per type** - adding a fragment again overwrites it
//! 3. **Depth-first events** - a handler's nested publish completes first
//!
//! ## Example
//!
//! ```rust
//! use cadence_core::{Component, Entity, EntityId};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Transform { x: f32, y: f32 }
//! impl Component for Transform {
//!     const NAME: &'static str = "Transform";
//! }
//!
//! let entity = Entity::new(EntityId::new(1));
//! entity.add_component(Transform { x: 0.0, y: 0.0 });
//! entity.add_component(Transform { x: 4.0, y: 2.0 });
//! assert_eq!(entity.component::<Transform>(), Some(Transform { x: 4.0, y: 2.0 }));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;
pub mod events;
pub mod system;

pub use ecs::{
    filter_entities, Component, ComponentMap, ComponentTag, Entity, EntityId, EntityRef,
    EntitySpawner,
};
pub use error::{EventError, SystemError, SystemResult};
pub use events::{Event, EventDispatcher, EventKind, Handler};
pub use system::{Drawable, Surface, System, SystemInfo};
