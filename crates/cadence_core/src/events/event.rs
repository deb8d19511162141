//! # Events
//!
//! An event is a kind, a timestamp, and an optional typed payload. Events are
//! built right before [`publish`](super::EventDispatcher::publish) and are not
//! retained by the dispatcher after delivery.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Key that handlers subscribe to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKind(Cow<'static, str>);

impl EventKind {
    /// Creates a kind from a static name (usable in `const` items).
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a kind from an owned name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the kind's name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for EventKind {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

/// A notification delivered synchronously to subscribed handlers.
///
/// # Example
///
/// ```rust
/// use cadence_core::{Event, EventKind};
///
/// const SCORE_CHANGED: EventKind = EventKind::from_static("score_changed");
///
/// let event = Event::new(SCORE_CHANGED).with_payload(150_u32);
/// assert_eq!(event.payload::<u32>(), Some(&150));
/// ```
#[derive(Clone)]
pub struct Event {
    kind: EventKind,
    timestamp: Instant,
    payload: Option<Arc<dyn Any + Send + Sync>>,
}

impl Event {
    /// Creates an event stamped with the current time and no payload.
    #[must_use]
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self {
            kind: kind.into(),
            timestamp: Instant::now(),
            payload: None,
        }
    }

    /// Attaches a payload, replacing any previous one.
    #[must_use]
    pub fn with_payload<T: Any + Send + Sync>(mut self, payload: T) -> Self {
        self.payload = Some(Arc::new(payload));
        self
    }

    /// Returns the event kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Returns when the event was created.
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the payload if it is present and of type `T`.
    #[must_use]
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref().and_then(|p| p.downcast_ref::<T>())
    }

    /// Returns `true` if any payload is attached.
    #[must_use]
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("timestamp", &self.timestamp)
            .field("has_payload", &self.has_payload())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Collision {
        a: u64,
        b: u64,
    }

    #[test]
    fn test_kinds_compare_by_name() {
        assert_eq!(EventKind::from_static("hit"), EventKind::named("hit"));
        assert_ne!(EventKind::from("hit"), EventKind::from("miss"));
    }

    #[test]
    fn test_payload_downcast() {
        let event = Event::new("collision").with_payload(Collision { a: 1, b: 2 });
        assert_eq!(event.payload::<Collision>(), Some(&Collision { a: 1, b: 2 }));
        assert!(event.payload::<u32>().is_none());
    }

    #[test]
    fn test_event_without_payload() {
        let event = Event::new("tick");
        assert!(!event.has_payload());
        assert!(event.payload::<()>().is_none());
        assert_eq!(event.kind().as_str(), "tick");
    }
}
