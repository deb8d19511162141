//! # CADENCE Event System
//!
//! Synchronous publish/subscribe between systems and external observers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  publish   ┌──────────────┐  invoke   ┌─────────────┐
//! │  System A   │───────────>│  Dispatcher  │──────────>│  Handler 1  │
//! └─────────────┘            │  (by kind)   │──────────>│  Handler 2  │
//!                            └──────────────┘           └─────────────┘
//! ```
//!
//! Nothing is queued: every handler has run by the time `publish` returns.

mod dispatcher;
mod event;

pub use dispatcher::{EventDispatcher, Handler};
pub use event::{Event, EventKind};
