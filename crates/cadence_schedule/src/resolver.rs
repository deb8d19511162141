//! # Dependency Resolver - Directed Acyclic Graph (DAG)
//!
//! **Deterministic execution order with full diagnostics**
//!
//! Given every registered [`SystemInfo`], the resolver produces one linear
//! update order in which each system runs after everything it depends on,
//! directly or through a capability.
//!
//! ## Pipeline
//!
//! ```text
//! 0. Prune optional systems whose dependencies/capabilities are unmet
//! 1. Capability map     capability -> providers (registration order)
//! 2. Graph              system -> dependencies, plus reverse graph
//!                       (missing provider / missing dependency fail here)
//! 3. Conflict check     declared conflicts that are registered fail here
//! 4. Capability recheck every requirement still has a provider
//! 5. Kahn's algorithm   unsorted leftovers are reported as the cycle
//! 6. Draw order         update order filtered to drawable systems
//! ```
//!
//! Every step iterates in registration order, so the same registrations
//! always produce the same order.

use std::collections::{HashMap, HashSet, VecDeque};

use cadence_core::SystemInfo;

use crate::error::{CycleMember, ScheduleError, ScheduleResult};

/// Capability name mapped to the systems providing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityMap {
    providers: HashMap<String, Vec<String>>,
}

impl CapabilityMap {
    /// Builds the map from descriptors, keeping registration order per capability.
    #[must_use]
    pub fn build<'a>(infos: impl IntoIterator<Item = &'a SystemInfo>) -> Self {
        let mut providers: HashMap<String, Vec<String>> = HashMap::new();
        for info in infos {
            for capability in &info.provides {
                providers
                    .entry(capability.clone())
                    .or_default()
                    .push(info.name.clone());
            }
        }
        Self { providers }
    }

    /// Returns every provider of `capability`, in registration order.
    #[must_use]
    pub fn providers_of(&self, capability: &str) -> &[String] {
        self.providers.get(capability).map_or(&[][..], Vec::as_slice)
    }

    /// Returns the provider a requirement on `capability` resolves to.
    ///
    /// When several systems provide the same capability the first one
    /// registered wins.
    #[must_use]
    pub fn resolve(&self, capability: &str) -> Option<&str> {
        self.providers_of(capability).first().map(String::as_str)
    }

    /// Returns `true` if at least one system provides `capability`.
    #[must_use]
    pub fn is_provided(&self, capability: &str) -> bool {
        !self.providers_of(capability).is_empty()
    }
}

/// The "must run before" relation among systems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// System -> systems it depends on (explicit first, then capabilities).
    dependencies: HashMap<String, Vec<String>>,
    /// System -> systems depending on it.
    dependents: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Returns the resolved dependencies of `system`.
    #[must_use]
    pub fn dependencies_of(&self, system: &str) -> &[String] {
        self.dependencies.get(system).map_or(&[][..], Vec::as_slice)
    }

    /// Returns the systems that depend on `system`.
    #[must_use]
    pub fn dependents_of(&self, system: &str) -> &[String] {
        self.dependents.get(system).map_or(&[][..], Vec::as_slice)
    }

    /// Returns the number of systems in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Returns `true` if the graph has no systems.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Returns the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.dependencies.values().map(Vec::len).sum()
    }
}

/// A successful resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Every scheduled system, dependencies first.
    pub update_order: Vec<String>,
    /// Drawable systems, in update order.
    pub draw_order: Vec<String>,
    /// Optional systems left out of the schedule, in registration order.
    pub pruned: Vec<String>,
    /// Capability providers among scheduled systems.
    pub capabilities: CapabilityMap,
    /// The resolved dependency graph.
    pub graph: DependencyGraph,
}

impl Resolution {
    /// Returns the position of `system` in the update order.
    #[must_use]
    pub fn position(&self, system: &str) -> Option<usize> {
        self.update_order.iter().position(|name| name == system)
    }
}

/// Computes execution order for a fixed set of descriptors.
///
/// # Example
///
/// ```rust
/// use cadence_core::SystemInfo;
/// use cadence_schedule::Resolver;
///
/// let infos = vec![
///     SystemInfo::new("Physics").with_requirement("input"),
///     SystemInfo::new("Keyboard").with_capability("input"),
/// ];
/// let resolution = Resolver::new(&infos).resolve()?;
/// assert_eq!(resolution.update_order, vec!["Keyboard", "Physics"]);
/// # Ok::<(), cadence_schedule::ScheduleError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    infos: &'a [SystemInfo],
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over `infos` (registration order).
    #[must_use]
    pub const fn new(infos: &'a [SystemInfo]) -> Self {
        Self { infos }
    }

    /// Runs the full pipeline.
    ///
    /// # Errors
    ///
    /// - `DuplicateSystem` if two descriptors share a name
    /// - `MissingDependency` if a required system's explicit dependency is absent
    /// - `MissingCapability` if a required system's capability has no provider
    /// - `Conflict` if a declared conflict is registered
    /// - `CircularDependency` with exactly the unsortable systems
    pub fn resolve(&self) -> ScheduleResult<Resolution> {
        self.check_unique_names()?;

        let (active, pruned) = self.prune_optional();
        let names: HashSet<&str> = active.iter().map(|info| info.name.as_str()).collect();

        let capabilities = CapabilityMap::build(active.iter().copied());
        let graph = Self::build_graph(&active, &names, &capabilities)?;
        Self::check_conflicts(&active, &names)?;
        Self::check_capabilities(&active, &capabilities)?;
        let update_order = Self::topological_sort(&active, &graph)?;

        let drawable: HashSet<&str> = active
            .iter()
            .filter(|info| info.drawable)
            .map(|info| info.name.as_str())
            .collect();
        let draw_order = update_order
            .iter()
            .filter(|name| drawable.contains(name.as_str()))
            .cloned()
            .collect();

        tracing::debug!(
            systems = update_order.len(),
            edges = graph.edge_count(),
            pruned = pruned.len(),
            "execution order resolved"
        );

        Ok(Resolution {
            update_order,
            draw_order,
            pruned,
            capabilities,
            graph,
        })
    }

    fn check_unique_names(&self) -> ScheduleResult<()> {
        let mut seen = HashSet::new();
        for info in self.infos {
            if !seen.insert(info.name.as_str()) {
                return Err(ScheduleError::DuplicateSystem(info.name.clone()));
            }
        }
        Ok(())
    }

    /// Drops optional systems whose explicit dependencies are not scheduled or
    /// whose required capabilities have no scheduled provider. Repeats until
    /// nothing changes, since dropping a provider can strand its dependents.
    fn prune_optional(&self) -> (Vec<&'a SystemInfo>, Vec<String>) {
        let mut active: Vec<&'a SystemInfo> = self.infos.iter().collect();
        let mut pruned = Vec::new();

        loop {
            let names: HashSet<&str> = active.iter().map(|info| info.name.as_str()).collect();
            let provided: HashSet<&str> = active
                .iter()
                .flat_map(|info| info.provides.iter().map(String::as_str))
                .collect();

            let (keep, dropped): (Vec<&'a SystemInfo>, Vec<&'a SystemInfo>) =
                active.iter().copied().partition(|info| {
                    !info.optional
                        || (info.dependencies.iter().all(|d| names.contains(d.as_str()))
                            && info.requires.iter().all(|c| provided.contains(c.as_str())))
                });

            if dropped.is_empty() {
                return (keep, pruned);
            }

            for info in dropped {
                tracing::warn!(system = %info.name, "optional system pruned: requirements unmet");
                pruned.push(info.name.clone());
            }
            active = keep;
        }
    }

    fn build_graph(
        active: &[&SystemInfo],
        names: &HashSet<&str>,
        capabilities: &CapabilityMap,
    ) -> ScheduleResult<DependencyGraph> {
        let mut graph = DependencyGraph::default();

        for info in active {
            let mut dependencies: Vec<String> = Vec::new();

            for dependency in &info.dependencies {
                if !names.contains(dependency.as_str()) {
                    return Err(ScheduleError::MissingDependency {
                        system: info.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
                if !dependencies.contains(dependency) {
                    dependencies.push(dependency.clone());
                }
            }

            for capability in &info.requires {
                let provider = capabilities.resolve(capability).ok_or_else(|| {
                    ScheduleError::MissingCapability {
                        system: info.name.clone(),
                        capability: capability.clone(),
                    }
                })?;
                if !dependencies.iter().any(|d| d == provider) {
                    dependencies.push(provider.to_string());
                }
            }

            for dependency in &dependencies {
                graph
                    .dependents
                    .entry(dependency.clone())
                    .or_default()
                    .push(info.name.clone());
            }
            graph.dependencies.insert(info.name.clone(), dependencies);
        }

        Ok(graph)
    }

    /// Only the declaring system's list is consulted.
    fn check_conflicts(active: &[&SystemInfo], names: &HashSet<&str>) -> ScheduleResult<()> {
        for info in active {
            if let Some(other) = info
                .conflicts
                .iter()
                .find(|other| names.contains(other.as_str()))
            {
                return Err(ScheduleError::Conflict {
                    system: info.name.clone(),
                    conflicts_with: other.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_capabilities(active: &[&SystemInfo], capabilities: &CapabilityMap) -> ScheduleResult<()> {
        for info in active {
            if let Some(capability) = info
                .requires
                .iter()
                .find(|capability| !capabilities.is_provided(capability))
            {
                return Err(ScheduleError::MissingCapability {
                    system: info.name.clone(),
                    capability: capability.clone(),
                });
            }
        }
        Ok(())
    }

    /// Kahn's algorithm, seeded and drained in registration order.
    fn topological_sort(active: &[&SystemInfo], graph: &DependencyGraph) -> ScheduleResult<Vec<String>> {
        let mut in_degree: HashMap<&str, usize> = active
            .iter()
            .map(|info| (info.name.as_str(), graph.dependencies_of(&info.name).len()))
            .collect();

        let mut queue: VecDeque<&str> = active
            .iter()
            .map(|info| info.name.as_str())
            .filter(|name| in_degree.get(name) == Some(&0))
            .collect();

        let mut order: Vec<String> = Vec::with_capacity(active.len());

        while let Some(name) = queue.pop_front() {
            order.push(name.to_string());

            for dependent in graph.dependents_of(name) {
                if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent.as_str());
                    }
                }
            }
        }

        if order.len() < active.len() {
            let sorted: HashSet<&str> = order.iter().map(String::as_str).collect();
            let members = active
                .iter()
                .filter(|info| !sorted.contains(info.name.as_str()))
                .map(|info| CycleMember {
                    name: info.name.clone(),
                    dependencies: info.dependencies.clone(),
                    requires: info.requires.clone(),
                    provides: info.provides.clone(),
                })
                .collect();
            return Err(ScheduleError::CircularDependency { members });
        }

        Ok(order)
    }
}

/// Resolves `infos` in one call.
///
/// # Errors
///
/// See [`Resolver::resolve`].
pub fn resolve(infos: &[SystemInfo]) -> ScheduleResult<Resolution> {
    Resolver::new(infos).resolve()
}
