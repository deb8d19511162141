//! # Entity Component System
//!
//! Entities are shared handles holding a type-keyed set of fragments.
//!
//! ## Design Philosophy
//!
//! - One fragment per component type per entity; adding again overwrites
//! - Fragment access is guarded by a reader/writer lock per entity
//! - Lookups never fail loudly: absence is `None` / `false`
//! - Ids are monotonic and never reused

mod component;
mod entity;
mod query;
mod spawner;

pub use component::{Component, ComponentMap, ComponentTag};
pub use entity::{Entity, EntityId, EntityRef};
pub use query::filter_entities;
pub use spawner::EntitySpawner;
