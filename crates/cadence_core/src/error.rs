//! # Core Error Types
//!
//! Failures raised while a tick is running. Lookups never produce these;
//! a missing fragment or handler is `None`, not an error.

use thiserror::Error;

use crate::events::Event;

/// Errors raised by event handlers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// A handler rejected the event.
    #[error("handler for event '{kind}' failed: {reason}")]
    HandlerFailed {
        /// Kind of the event being delivered.
        kind: String,
        /// Handler-supplied reason.
        reason: String,
    },
}

impl EventError {
    /// Builds a [`EventError::HandlerFailed`] for `event`.
    #[must_use]
    pub fn handler_failed(event: &Event, reason: impl Into<String>) -> Self {
        Self::HandlerFailed {
            kind: event.kind().to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by a system's update or draw pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SystemError {
    /// An event published by the system was rejected by a handler.
    #[error(transparent)]
    Event(#[from] EventError),

    /// The system itself failed.
    #[error("system '{system}' failed: {reason}")]
    Failed {
        /// Name of the failing system.
        system: String,
        /// What went wrong.
        reason: String,
    },
}

impl SystemError {
    /// Builds a [`SystemError::Failed`].
    #[must_use]
    pub fn failed(system: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            system: system.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for system passes.
pub type SystemResult = Result<(), SystemError>;
