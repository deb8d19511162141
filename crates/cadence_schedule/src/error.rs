//! # Schedule Error Types
//!
//! All errors that can occur while registering systems, resolving their
//! execution order, or running a scheduled pass.

use std::fmt;

use cadence_core::SystemError;
use thiserror::Error;

/// One system caught in a dependency cycle, with the relations that put it there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleMember {
    /// System name.
    pub name: String,
    /// Declared explicit dependencies.
    pub dependencies: Vec<String>,
    /// Declared required capabilities.
    pub requires: Vec<String>,
    /// Declared provided capabilities.
    pub provides: Vec<String>,
}

impl fmt::Display for CycleMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (depends on [{}], requires [{}], provides [{}])",
            self.name,
            self.dependencies.join(", "),
            self.requires.join(", "),
            self.provides.join(", "),
        )
    }
}

fn describe_cycle(members: &[CycleMember]) -> String {
    members
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur in the scheduler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A system with this name is already registered.
    #[error("system '{0}' is already registered")]
    DuplicateSystem(String),

    /// A required capability has no provider.
    #[error("system '{system}' requires capability '{capability}' but no system provides it")]
    MissingCapability {
        /// The requiring system.
        system: String,
        /// The unprovided capability.
        capability: String,
    },

    /// An explicit dependency names a system that is not registered.
    #[error("system '{system}' depends on '{dependency}' which is not registered")]
    MissingDependency {
        /// The depending system.
        system: String,
        /// The missing dependency.
        dependency: String,
    },

    /// A system declares a conflict with another registered system.
    #[error("system '{system}' conflicts with registered system '{conflicts_with}'")]
    Conflict {
        /// The system declaring the conflict.
        system: String,
        /// The registered system it conflicts with.
        conflicts_with: String,
    },

    /// The dependency graph contains a cycle.
    ///
    /// `members` lists exactly the systems the topological sort could not
    /// place, in registration order.
    #[error("circular dependency among systems: {}", describe_cycle(.members))]
    CircularDependency {
        /// Systems left unsorted.
        members: Vec<CycleMember>,
    },

    /// A pass was requested before the execution order was built.
    #[error("execution order has not been built")]
    NotBuilt,

    /// The execution order is already built; it is computed exactly once.
    #[error("execution order is already built")]
    AlreadyBuilt,

    /// A system failed while running.
    #[error("system '{system}' failed during {phase}: {source}")]
    System {
        /// Name of the failing system.
        system: String,
        /// `"update"` or `"draw"`.
        phase: &'static str,
        /// Underlying failure.
        source: SystemError,
    },

    /// A schedule manifest could not be read or parsed.
    #[error("invalid schedule manifest: {0}")]
    InvalidManifest(String),
}

impl ScheduleError {
    /// Returns the names of the systems a resolution error is about.
    ///
    /// Empty for errors that are not tied to specific systems.
    #[must_use]
    pub fn systems(&self) -> Vec<&str> {
        match self {
            Self::DuplicateSystem(name) => vec![name.as_str()],
            Self::MissingCapability { system, .. }
            | Self::MissingDependency { system, .. }
            | Self::System { system, .. } => vec![system.as_str()],
            Self::Conflict {
                system,
                conflicts_with,
            } => vec![system.as_str(), conflicts_with.as_str()],
            Self::CircularDependency { members } => {
                members.iter().map(|m| m.name.as_str()).collect()
            }
            Self::NotBuilt | Self::AlreadyBuilt | Self::InvalidManifest(_) => Vec::new(),
        }
    }
}

/// Result type for scheduler operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;
