//! # Schedule Manifests
//!
//! System descriptors can live in a TOML file instead of code:
//!
//! ```toml
//! [[systems]]
//! name = "Spawn"
//! provides = ["spawning"]
//!
//! [[systems]]
//! name = "Movement"
//! dependencies = ["Spawn"]
//! requires = ["spawning"]
//!
//! [[systems]]
//! name = "Sprites"
//! dependencies = ["Movement"]
//! drawable = true
//! ```
//!
//! Every field except `name` is optional.

use std::path::Path;

use cadence_core::SystemInfo;
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::resolver::{Resolution, Resolver};

/// Ordered list of system descriptors (file order is registration order).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleManifest {
    /// Descriptors in registration order.
    #[serde(default)]
    pub systems: Vec<SystemInfo>,
}

impl ScheduleManifest {
    /// Parses a manifest from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidManifest` if the text is not a valid manifest.
    pub fn from_toml_str(text: &str) -> ScheduleResult<Self> {
        toml::from_str(text).map_err(|e| ScheduleError::InvalidManifest(e.to_string()))
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidManifest` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> ScheduleResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ScheduleError::InvalidManifest(format!("{}: {e}", path.display()))
        })?;
        let manifest = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            systems = manifest.systems.len(),
            "schedule manifest loaded"
        );
        Ok(manifest)
    }

    /// Serializes the manifest back to TOML.
    ///
    /// # Errors
    ///
    /// Returns `InvalidManifest` if serialization fails.
    pub fn to_toml_string(&self) -> ScheduleResult<String> {
        toml::to_string(self).map_err(|e| ScheduleError::InvalidManifest(e.to_string()))
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SystemInfo> {
        self.systems.iter().find(|info| info.name == name)
    }

    /// Resolves the manifest without instantiating any system.
    ///
    /// # Errors
    ///
    /// Any error from [`Resolver::resolve`].
    pub fn resolve(&self) -> ScheduleResult<Resolution> {
        Resolver::new(&self.systems).resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: &str = r#"
        [[systems]]
        name = "Spawn"
        provides = ["spawning"]

        [[systems]]
        name = "Movement"
        dependencies = ["Spawn"]
        requires = ["spawning"]

        [[systems]]
        name = "Sprites"
        dependencies = ["Movement"]
        drawable = true

        [[systems]]
        name = "Telemetry"
        requires = ["network"]
        optional = true
    "#;

    #[test]
    fn test_parse_defaults() {
        let manifest = ScheduleManifest::from_toml_str(GAME).unwrap();
        assert_eq!(manifest.systems.len(), 4);

        let spawn = manifest.get("Spawn").unwrap();
        assert!(spawn.dependencies.is_empty());
        assert!(spawn.conflicts.is_empty());
        assert!(!spawn.drawable);
        assert!(!spawn.optional);

        assert!(manifest.get("Sprites").unwrap().drawable);
        assert!(manifest.get("Telemetry").unwrap().optional);
        assert!(manifest.get("Nope").is_none());
    }

    #[test]
    fn test_resolve_manifest() {
        let manifest = ScheduleManifest::from_toml_str(GAME).unwrap();
        let resolution = manifest.resolve().unwrap();

        assert_eq!(resolution.update_order, vec!["Spawn", "Movement", "Sprites"]);
        assert_eq!(resolution.draw_order, vec!["Sprites"]);
        assert_eq!(resolution.pruned, vec!["Telemetry"]);
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = ScheduleManifest::from_toml_str("").unwrap();
        assert!(manifest.systems.is_empty());
        assert!(manifest.resolve().unwrap().update_order.is_empty());
    }

    #[test]
    fn test_invalid_manifest() {
        let err = ScheduleManifest::from_toml_str("[[systems]]\ndrawable = true\n").unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidManifest(_)));

        let err = ScheduleManifest::from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidManifest(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let manifest = ScheduleManifest::from_toml_str(GAME).unwrap();
        let text = manifest.to_toml_string().unwrap();
        assert_eq!(ScheduleManifest::from_toml_str(&text).unwrap(), manifest);
    }
}
