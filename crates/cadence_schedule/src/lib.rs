//! # CADENCE Schedule
//!
//! Turns a set of system descriptors into a fixed execution order and runs
//! the systems in it.
//!
//! ## Pipeline
//!
//! ```text
//! SystemInfo[] ──► prune optional ──► capability map ──► dependency graph
//!                                                             │
//!       update/draw order ◄── Kahn's sort ◄── conflict + capability checks
//! ```
//!
//! ## Architecture Rules
//!
//! 1. **Resolve once** - the order is computed at startup and never changes
//! 2. **Fail loudly** - every resolution error names the systems involved
//! 3. **Stable ties** - independent systems keep their registration order
//!
//! ## Example
//!
//! ```rust
//! use cadence_schedule::ScheduleManifest;
//!
//! let manifest = ScheduleManifest::from_toml_str(r#"
//!     [[systems]]
//!     name = "Collision"
//!     requires = ["movement"]
//!
//!     [[systems]]
//!     name = "Movement"
//!     provides = ["movement"]
//! "#)?;
//!
//! let resolution = manifest.resolve()?;
//! assert_eq!(resolution.update_order, vec!["Movement", "Collision"]);
//! # Ok::<(), cadence_schedule::ScheduleError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod manifest;
pub mod resolver;
pub mod scheduler;

pub use error::{CycleMember, ScheduleError, ScheduleResult};
pub use manifest::ScheduleManifest;
pub use resolver::{resolve, CapabilityMap, DependencyGraph, Resolution, Resolver};
pub use scheduler::Scheduler;
