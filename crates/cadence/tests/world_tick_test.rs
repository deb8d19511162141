//! # World Tick Integration Test
//!
//! A small simulation wired through every unit: fragments, capability
//! ordering, depth-first events, deferred spawning, the draw pass and the
//! game loop, configured from TOML.

use std::any::Any;
use std::sync::{Arc, Weak};

use cadence::{EngineConfig, GameLoop, World};
use cadence_core::{
    filter_entities, Component, ComponentTag, Drawable, EntityRef, EntitySpawner, Event,
    EventDispatcher, Surface, System, SystemInfo, SystemResult,
};
use parking_lot::Mutex;

#[derive(Clone, Debug, PartialEq)]
struct Transform {
    x: f32,
}

impl Component for Transform {
    const NAME: &'static str = "Transform";
}

#[derive(Clone, Debug, PartialEq)]
struct Velocity {
    dx: f32,
}

impl Component for Velocity {
    const NAME: &'static str = "Velocity";
}

/// Spawns a projectile on the first tick.
struct Spawn {
    spawner: EntitySpawner,
    fired: bool,
}

impl System for Spawn {
    fn update(&mut self, _: f32, _: &[EntityRef], _: &EventDispatcher) -> SystemResult {
        if !self.fired {
            let projectile = self.spawner.spawn();
            projectile.add_component(Transform { x: 0.0 });
            projectile.add_component(Velocity { dx: 10.0 });
            self.fired = true;
        }
        Ok(())
    }
}

struct Movement {
    required: [ComponentTag; 2],
}

impl System for Movement {
    fn update(&mut self, dt: f32, entities: &[EntityRef], _: &EventDispatcher) -> SystemResult {
        for entity in filter_entities(entities, &self.required) {
            let mut fragments = entity.fragments_mut();
            let Some(dx) = fragments.get::<Velocity>().map(|v| v.dx) else {
                continue;
            };
            if let Some(transform) = fragments.get_mut::<Transform>() {
                transform.x += dx * dt;
            }
        }
        Ok(())
    }

    fn required_components(&self) -> &[ComponentTag] {
        &self.required
    }
}

/// Deactivates anything past x = 12 and announces it.
struct Bounds;

impl System for Bounds {
    fn update(&mut self, _: f32, entities: &[EntityRef], events: &EventDispatcher) -> SystemResult {
        for entity in entities.iter().filter(|e| e.is_active()) {
            let out = entity.get_component::<Transform>().is_some_and(|t| t.x > 12.0);
            if out {
                entity.set_active(false);
                events.publish(&Event::new("out_of_bounds").with_payload(entity.id().get()))?;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Tape {
    frames: Vec<Vec<u64>>,
}

impl Surface for Tape {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Recorder;

impl System for Recorder {
    fn update(&mut self, _: f32, _: &[EntityRef], _: &EventDispatcher) -> SystemResult {
        Ok(())
    }

    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        Some(self)
    }
}

impl Drawable for Recorder {
    fn draw(&mut self, surface: &mut dyn Surface, entities: &[EntityRef]) -> SystemResult {
        if let Some(tape) = surface.as_any_mut().downcast_mut::<Tape>() {
            tape.frames.push(
                entities
                    .iter()
                    .filter(|e| e.is_active())
                    .map(|e| e.id().get())
                    .collect(),
            );
        }
        Ok(())
    }
}

const CONFIG: &str = r#"
    [game_loop]
    target_fps = 60
    max_delta_secs = 0.5
    sweep_inactive = true

    [[schedule.systems]]
    name = "Recorder"
    dependencies = ["Bounds"]
    drawable = true

    [[schedule.systems]]
    name = "Bounds"
    requires = ["positions"]

    [[schedule.systems]]
    name = "Movement"
    dependencies = ["Spawn"]
    provides = ["positions"]

    [[schedule.systems]]
    name = "Spawn"
"#;

#[test]
fn test_configured_simulation() {
    let config = EngineConfig::from_toml_str(CONFIG).unwrap();
    let manifest = config.schedule.clone().unwrap();

    let mut world = World::new();
    let player = world.new_entity();
    player.add_component(Transform { x: 0.0 });
    assert_eq!(player.id().get(), 1);

    // Nested event: the out-of-bounds handler publishes a score event,
    // which must be fully handled before the next out-of-bounds handler.
    let log: Arc<Mutex<Vec<String>>> = Arc::default();
    let weak: Weak<EventDispatcher> = Arc::downgrade(world.dispatcher());
    {
        let log = Arc::clone(&log);
        world.dispatcher().subscribe("out_of_bounds", move |event| {
            let id = event.payload::<u64>().copied().unwrap_or_default();
            log.lock().push(format!("out:{id}"));
            if let Some(events) = weak.upgrade() {
                events.publish(&Event::new("score"))?;
            }
            Ok(())
        });
    }
    {
        let log = Arc::clone(&log);
        world.dispatcher().subscribe("out_of_bounds", move |_| {
            log.lock().push("audit".into());
            Ok(())
        });
    }
    {
        let log = Arc::clone(&log);
        world.dispatcher().subscribe("score", move |_| {
            log.lock().push("score".into());
            Ok(())
        });
    }

    let spawner = world.spawner().clone();
    world
        .register_manifest(&manifest, |info| -> Option<Box<dyn System>> {
            match info.name.as_str() {
                "Spawn" => Some(Box::new(Spawn {
                    spawner: spawner.clone(),
                    fired: false,
                })),
                "Movement" => Some(Box::new(Movement {
                    required: [ComponentTag::of::<Transform>(), ComponentTag::of::<Velocity>()],
                })),
                "Bounds" => Some(Box::new(Bounds)),
                "Recorder" => Some(Box::new(Recorder)),
                _ => None,
            }
        })
        .unwrap();

    let resolution = world.build_execution_order().unwrap();
    assert_eq!(
        resolution.update_order,
        vec!["Spawn", "Movement", "Bounds", "Recorder"]
    );
    assert_eq!(resolution.draw_order, vec!["Recorder"]);

    let mut game_loop = GameLoop::new(world, config.game_loop.clone());
    let mut tape = Tape::default();

    // Frame 0: projectile #2 spawned after the tick, not yet moved.
    let stats = game_loop.step(0.5, Some(&mut tape)).unwrap();
    assert_eq!(stats.spawned, 1);

    // Frames 1..=3: projectile moves 5 units per frame and leaves at x = 15.
    for _ in 0..3 {
        game_loop.step(0.5, Some(&mut tape)).unwrap();
    }

    assert_eq!(tape.frames, vec![vec![1, 2], vec![1, 2], vec![1, 2], vec![1]]);
    assert_eq!(*log.lock(), vec!["out:2", "score", "audit"]);

    let mut world = game_loop.into_world();
    let ids: Vec<u64> = world.entities().iter().map(|e| e.id().get()).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(world.new_entity().id().get(), 3);
}
