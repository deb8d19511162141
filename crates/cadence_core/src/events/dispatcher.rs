//! # Event Dispatcher
//!
//! In-process, synchronous publish/subscribe keyed by [`EventKind`].
//!
//! ## Delivery Rules
//!
//! ```text
//! publish(A)
//!   ├─ handler 1 ──> publish(B)
//!   │                  ├─ handler B1
//!   │                  └─ handler B2
//!   └─ handler 2          (runs after B is fully delivered)
//! ```
//!
//! Handlers run in subscription order. A nested publish completes before the
//! outer one resumes (depth-first). The handler list for a kind is
//! snapshotted when publishing starts, so handlers may subscribe or publish
//! without deadlocking; new subscriptions apply from the next publish.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::event::{Event, EventKind};
use crate::error::EventError;

/// A subscribed event handler.
pub type Handler = Arc<dyn Fn(&Event) -> Result<(), EventError> + Send + Sync>;

/// Synchronous event bus.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: RwLock<HashMap<EventKind, Vec<Handler>>>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the list for `kind`.
    ///
    /// Subscribing the same closure twice registers it twice.
    pub fn subscribe<F>(&self, kind: impl Into<EventKind>, handler: F)
    where
        F: Fn(&Event) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let kind = kind.into();
        tracing::trace!(kind = %kind, "handler subscribed");
        self.handlers
            .write()
            .entry(kind)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Delivers `event` to every handler subscribed to its kind.
    ///
    /// # Errors
    ///
    /// Returns the first handler failure. Handlers after the failing one are
    /// not invoked for this event.
    pub fn publish(&self, event: &Event) -> Result<(), EventError> {
        let handlers: Vec<Handler> = match self.handlers.read().get(event.kind()) {
            Some(list) => list.clone(),
            None => return Ok(()),
        };

        tracing::trace!(kind = %event.kind(), handlers = handlers.len(), "publishing event");

        for handler in &handlers {
            handler(event)?;
        }
        Ok(())
    }

    /// Returns the number of handlers subscribed to `kind`.
    #[must_use]
    pub fn handler_count(&self, kind: &EventKind) -> usize {
        self.handlers.read().get(kind).map_or(0, Vec::len)
    }

    /// Removes every handler for every kind.
    pub fn clear(&self) {
        self.handlers.write().clear();
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.read();
        let mut map = f.debug_map();
        for (kind, list) in handlers.iter() {
            map.entry(&kind.as_str(), &list.len());
        }
        map.finish()
    }
}
