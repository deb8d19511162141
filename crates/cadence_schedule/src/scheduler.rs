//! # System Scheduler
//!
//! Owns every registered system and drives them in the order the
//! [`Resolver`] computed.
//!
//! ## Lifecycle
//!
//! ```text
//! register() ... register()      duplicates rejected, first one kept
//!         │
//! build_execution_order()        resolver runs exactly once
//!         │
//! update_all() / draw_all()      every tick, fixed order
//! ```
//!
//! Registering after the build, building twice, or ticking before a
//! successful build are all errors.

use std::collections::HashMap;
use std::fmt;

use cadence_core::{EntityRef, EventDispatcher, Surface, System, SystemInfo};

use crate::error::{ScheduleError, ScheduleResult};
use crate::resolver::{Resolution, Resolver};

struct Registered {
    info: SystemInfo,
    system: Box<dyn System>,
}

/// Cached execution plan: indices into the registration list.
struct Plan {
    resolution: Resolution,
    update: Vec<usize>,
    draw: Vec<usize>,
}

/// The system manager.
///
/// # Example
///
/// ```rust
/// use cadence_core::{EntityRef, EventDispatcher, System, SystemInfo, SystemResult};
/// use cadence_schedule::Scheduler;
///
/// struct Noop;
/// impl System for Noop {
///     fn update(&mut self, _: f32, _: &[EntityRef], _: &EventDispatcher) -> SystemResult {
///         Ok(())
///     }
/// }
///
/// let mut scheduler = Scheduler::new();
/// scheduler.register(SystemInfo::new("Movement").with_dependency("Spawn"), Noop)?;
/// scheduler.register(SystemInfo::new("Spawn"), Noop)?;
/// scheduler.build_execution_order()?;
/// assert_eq!(scheduler.update_order(), vec!["Spawn", "Movement"]);
///
/// scheduler.update_all(0.016, &[], &EventDispatcher::new())?;
/// # Ok::<(), cadence_schedule::ScheduleError>(())
/// ```
#[derive(Default)]
pub struct Scheduler {
    systems: Vec<Registered>,
    index: HashMap<String, usize>,
    plan: Option<Plan>,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a system under `info.name`.
    ///
    /// # Errors
    ///
    /// - `DuplicateSystem` if the name is taken (the first registration stays)
    /// - `AlreadyBuilt` if the execution order has been built
    pub fn register<S>(&mut self, info: SystemInfo, system: S) -> ScheduleResult<()>
    where
        S: System + 'static,
    {
        self.register_boxed(info, Box::new(system))
    }

    /// Registers an already boxed system.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn register_boxed(&mut self, info: SystemInfo, system: Box<dyn System>) -> ScheduleResult<()> {
        if self.plan.is_some() {
            return Err(ScheduleError::AlreadyBuilt);
        }
        if self.index.contains_key(&info.name) {
            return Err(ScheduleError::DuplicateSystem(info.name));
        }

        tracing::debug!(system = %info.name, "system registered");
        self.index.insert(info.name.clone(), self.systems.len());
        self.systems.push(Registered { info, system });
        Ok(())
    }

    /// Resolves and caches the update and draw orders.
    ///
    /// # Errors
    ///
    /// - `AlreadyBuilt` on a second call
    /// - any resolution error from [`Resolver::resolve`]; the scheduler stays
    ///   unbuilt and refuses to tick
    pub fn build_execution_order(&mut self) -> ScheduleResult<&Resolution> {
        if self.plan.is_some() {
            return Err(ScheduleError::AlreadyBuilt);
        }

        let infos: Vec<SystemInfo> = self.systems.iter().map(|r| r.info.clone()).collect();
        let resolution = Resolver::new(&infos).resolve().map_err(|err| {
            tracing::error!(error = %err, "failed to build execution order");
            err
        })?;

        let update = self.indices(&resolution.update_order);
        let draw = self.indices(&resolution.draw_order);

        tracing::info!(
            update = ?resolution.update_order,
            draw = ?resolution.draw_order,
            "execution order built"
        );

        let plan = self.plan.insert(Plan {
            resolution,
            update,
            draw,
        });
        Ok(&plan.resolution)
    }

    fn indices(&self, names: &[String]) -> Vec<usize> {
        names
            .iter()
            .filter_map(|name| self.index.get(name).copied())
            .collect()
    }

    /// Runs every scheduled system's update, in update order.
    ///
    /// # Errors
    ///
    /// - `NotBuilt` if the order has not been built
    /// - `System` with the first failing system; later systems do not run
    pub fn update_all(
        &mut self,
        delta_time: f32,
        entities: &[EntityRef],
        events: &EventDispatcher,
    ) -> ScheduleResult<()> {
        let plan = self.plan.as_ref().ok_or(ScheduleError::NotBuilt)?;

        for &idx in &plan.update {
            let entry = &mut self.systems[idx];
            entry
                .system
                .update(delta_time, entities, events)
                .map_err(|source| ScheduleError::System {
                    system: entry.info.name.clone(),
                    phase: "update",
                    source,
                })?;
        }
        Ok(())
    }

    /// Runs every drawable system's draw, in draw order.
    ///
    /// A system flagged drawable that does not expose
    /// [`Drawable`](cadence_core::Drawable) is skipped.
    ///
    /// # Errors
    ///
    /// - `NotBuilt` if the order has not been built
    /// - `System` with the first failing system
    pub fn draw_all(&mut self, surface: &mut dyn Surface, entities: &[EntityRef]) -> ScheduleResult<()> {
        let plan = self.plan.as_ref().ok_or(ScheduleError::NotBuilt)?;

        for &idx in &plan.draw {
            let entry = &mut self.systems[idx];
            let Some(drawable) = entry.system.as_drawable() else {
                tracing::debug!(system = %entry.info.name, "flagged drawable but not Drawable, skipped");
                continue;
            };
            drawable
                .draw(surface, entities)
                .map_err(|source| ScheduleError::System {
                    system: entry.info.name.clone(),
                    phase: "draw",
                    source,
                })?;
        }
        Ok(())
    }

    /// Looks up a system by name.
    #[must_use]
    pub fn get_system(&self, name: &str) -> Option<&dyn System> {
        let &idx = self.index.get(name)?;
        Some(self.systems[idx].system.as_ref())
    }

    /// Looks up a system by name, mutably.
    pub fn get_system_mut(&mut self, name: &str) -> Option<&mut dyn System> {
        let &idx = self.index.get(name)?;
        Some(self.systems[idx].system.as_mut())
    }

    /// Looks up a system's descriptor by name.
    #[must_use]
    pub fn get_system_info(&self, name: &str) -> Option<&SystemInfo> {
        let &idx = self.index.get(name)?;
        Some(&self.systems[idx].info)
    }

    /// Returns `true` once the execution order has been built.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.plan.is_some()
    }

    /// Returns the cached resolution, if built.
    #[must_use]
    pub fn resolution(&self) -> Option<&Resolution> {
        self.plan.as_ref().map(|plan| &plan.resolution)
    }

    /// Returns the update order (empty until built).
    #[must_use]
    pub fn update_order(&self) -> Vec<&str> {
        self.resolution()
            .map(|r| r.update_order.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the draw order (empty until built).
    #[must_use]
    pub fn draw_order(&self) -> Vec<&str> {
        self.resolution()
            .map(|r| r.draw_order.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns registered system names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|r| r.info.name.as_str())
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if no system is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("systems", &self.names().collect::<Vec<_>>())
            .field("update_order", &self.update_order())
            .field("draw_order", &self.draw_order())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::Arc;

    use cadence_core::{Drawable, SystemError, SystemResult};
    use parking_lot::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recording {
        name: &'static str,
        log: Log,
    }

    impl System for Recording {
        fn update(&mut self, _: f32, _: &[EntityRef], _: &EventDispatcher) -> SystemResult {
            self.log.lock().push(format!("update:{}", self.name));
            Ok(())
        }
    }

    struct Painter {
        name: &'static str,
        log: Log,
    }

    impl System for Painter {
        fn update(&mut self, _: f32, _: &[EntityRef], _: &EventDispatcher) -> SystemResult {
            Ok(())
        }

        fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
            Some(self)
        }
    }

    impl Drawable for Painter {
        fn draw(&mut self, surface: &mut dyn Surface, _: &[EntityRef]) -> SystemResult {
            if let Some(canvas) = surface.as_any_mut().downcast_mut::<Canvas>() {
                canvas.strokes.push(self.name);
            }
            self.log.lock().push(format!("draw:{}", self.name));
            Ok(())
        }
    }

    struct Failing;

    impl System for Failing {
        fn update(&mut self, _: f32, _: &[EntityRef], _: &EventDispatcher) -> SystemResult {
            Err(SystemError::failed("Failing", "out of fuel"))
        }
    }

    #[derive(Default)]
    struct Canvas {
        strokes: Vec<&'static str>,
    }

    impl Surface for Canvas {
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn recording(name: &'static str, log: &Log) -> Recording {
        Recording {
            name,
            log: Arc::clone(log),
        }
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .register(SystemInfo::new("A").with_capability("first"), recording("A", &log))
            .unwrap();

        let err = scheduler
            .register(SystemInfo::new("A").with_capability("second"), recording("A", &log))
            .unwrap_err();

        assert_eq!(err, ScheduleError::DuplicateSystem("A".into()));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(
            scheduler.get_system_info("A").unwrap().provides,
            vec!["first".to_string()]
        );
    }

    #[test]
    fn test_update_runs_in_resolved_order() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .register(SystemInfo::new("Movement").with_dependency("Spawn"), recording("Movement", &log))
            .unwrap();
        scheduler
            .register(SystemInfo::new("Spawn"), recording("Spawn", &log))
            .unwrap();
        scheduler.build_execution_order().unwrap();

        scheduler.update_all(0.1, &[], &EventDispatcher::new()).unwrap();
        assert_eq!(*log.lock(), vec!["update:Spawn", "update:Movement"]);
    }

    #[test]
    fn test_tick_refused_before_build() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler.register(SystemInfo::new("A"), recording("A", &log)).unwrap();

        assert_eq!(
            scheduler.update_all(0.1, &[], &EventDispatcher::new()),
            Err(ScheduleError::NotBuilt)
        );
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_failed_build_keeps_scheduler_unbuilt() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .register(SystemInfo::new("B").with_requirement("x"), recording("B", &log))
            .unwrap();

        assert!(matches!(
            scheduler.build_execution_order(),
            Err(ScheduleError::MissingCapability { .. })
        ));
        assert!(!scheduler.is_built());
        assert_eq!(
            scheduler.update_all(0.1, &[], &EventDispatcher::new()),
            Err(ScheduleError::NotBuilt)
        );
    }

    #[test]
    fn test_build_only_once_and_registration_closed() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler.register(SystemInfo::new("A"), recording("A", &log)).unwrap();
        scheduler.build_execution_order().unwrap();

        assert!(matches!(
            scheduler.build_execution_order(),
            Err(ScheduleError::AlreadyBuilt)
        ));
        assert_eq!(
            scheduler.register(SystemInfo::new("B"), recording("B", &log)),
            Err(ScheduleError::AlreadyBuilt)
        );
    }

    #[test]
    fn test_draw_skips_non_drawable() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .register(
                SystemInfo::new("Hud").with_drawable(true).with_dependency("Sprites"),
                Painter { name: "Hud", log: Arc::clone(&log) },
            )
            .unwrap();
        scheduler
            .register(
                SystemInfo::new("Sprites").with_drawable(true),
                Painter { name: "Sprites", log: Arc::clone(&log) },
            )
            .unwrap();
        scheduler
            .register(SystemInfo::new("Liar").with_drawable(true), recording("Liar", &log))
            .unwrap();
        scheduler
            .register(SystemInfo::new("Hidden"), Painter { name: "Hidden", log: Arc::clone(&log) })
            .unwrap();
        scheduler.build_execution_order().unwrap();

        assert_eq!(scheduler.draw_order(), vec!["Sprites", "Liar", "Hud"]);

        let mut canvas = Canvas::default();
        scheduler.draw_all(&mut canvas, &[]).unwrap();
        assert_eq!(canvas.strokes, vec!["Sprites", "Hud"]);
        assert_eq!(*log.lock(), vec!["draw:Sprites", "draw:Hud"]);
    }

    #[test]
    fn test_system_failure_stops_tick() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler.register(SystemInfo::new("First"), recording("First", &log)).unwrap();
        scheduler.register(SystemInfo::new("Failing"), Failing).unwrap();
        scheduler.register(SystemInfo::new("Last"), recording("Last", &log)).unwrap();
        scheduler.build_execution_order().unwrap();

        let err = scheduler.update_all(0.1, &[], &EventDispatcher::new()).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::System { ref system, phase: "update", .. } if system == "Failing"
        ));
        assert_eq!(*log.lock(), vec!["update:First"]);
    }

    #[test]
    fn test_lookups() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler.register(SystemInfo::new("A"), recording("A", &log)).unwrap();

        assert!(scheduler.get_system("A").is_some());
        assert!(scheduler.get_system("Missing").is_none());
        assert!(scheduler.get_system_info("Missing").is_none());
        assert!(scheduler.get_system_mut("A").is_some());
        assert_eq!(scheduler.names().collect::<Vec<_>>(), vec!["A"]);
    }
}
