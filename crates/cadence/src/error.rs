//! # Engine Error Types

use cadence_schedule::ScheduleError;
use thiserror::Error;

/// Errors surfaced by the runtime crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Registration, resolution or a scheduled pass failed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// A manifest names a system nobody knows how to build.
    #[error("no factory for system '{0}'")]
    UnknownSystem(String),

    /// A config file could not be read.
    #[error("failed to read config '{path}': {reason}")]
    ConfigIo {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        reason: String,
    },

    /// A config file was read but is not valid.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for runtime operations.
pub type EngineResult<T> = Result<T, EngineError>;
