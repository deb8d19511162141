//! # CADENCE
//!
//! The runtime crate, tying the units together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            CADENCE RUNTIME                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐   │
//! │  │  cadence_core   │     │cadence_schedule │     │    cadence      │   │
//! │  │                 │────>│                 │────>│                 │   │
//! │  │  • Entities     │     │  • Resolver     │     │  • World        │   │
//! │  │  • Events       │     │  • Scheduler    │     │  • Game loop    │   │
//! │  │  • System trait │     │  • Manifests    │     │  • Config       │   │
//! │  └─────────────────┘     └─────────────────┘     └─────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `world`: entity lifecycle, system registration, ticking
//! - `game_loop`: frame orchestration and timing
//! - `config`: engine configuration loaded from TOML

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod game_loop;
pub mod world;

// Re-export the units
pub use cadence_core as core;
pub use cadence_schedule as schedule;

// Re-export commonly used types
pub use config::{EngineConfig, GameLoopConfig};
pub use error::{EngineError, EngineResult};
pub use game_loop::{FrameStats, FrameStatsAccumulator, GameLoop};
pub use world::World;
