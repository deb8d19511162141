//! # CADENCE Game Loop
//!
//! Frame lifecycle around a [`World`]:
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. BEGIN FRAME                                                      │
//! │    └─ Measure and clamp delta time                                  │
//! │                                                                     │
//! │ 2. UPDATE                                                           │
//! │    ├─ Every system in resolved update order                         │
//! │    └─ Append entities spawned during the tick                       │
//! │                                                                     │
//! │ 3. DRAW (if a surface is supplied)                                  │
//! │    └─ Drawable systems in resolved draw order                       │
//! │                                                                     │
//! │ 4. SWEEP (if enabled)                                               │
//! │    └─ Drop inactive entities                                        │
//! │                                                                     │
//! │ 5. END FRAME                                                        │
//! │    └─ Record timing, warn on slow frames                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use cadence_core::Surface;

use crate::config::GameLoopConfig;
use crate::error::EngineResult;
use crate::world::World;

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Frame timing statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Total frame time in microseconds.
    pub total_us: u64,
    /// Update pass time in microseconds.
    pub update_us: u64,
    /// Draw pass time in microseconds.
    pub draw_us: u64,
    /// Inactive sweep time in microseconds.
    pub sweep_us: u64,
    /// Frame number.
    pub frame: u64,
    /// Entities spawned during the frame.
    pub spawned: usize,
    /// Inactive entities removed at the end of the frame.
    pub swept: usize,
}

/// The main loop driver.
///
/// Owns the world, manages frame lifecycle.
pub struct GameLoop {
    world: World,
    config: GameLoopConfig,
    frame_count: u64,
    last_frame_time: Instant,
    stats_accumulator: FrameStatsAccumulator,
}

impl GameLoop {
    /// Creates a loop around `world`.
    ///
    /// The world's execution order should already be built.
    #[must_use]
    pub fn new(world: World, config: GameLoopConfig) -> Self {
        let stats_accumulator = FrameStatsAccumulator::new(config.target_frame_time());
        Self {
            world,
            config,
            frame_count: 0,
            last_frame_time: Instant::now(),
            stats_accumulator,
        }
    }

    /// Measures wall-clock time since the last frame and clamps it.
    #[must_use]
    pub fn begin_frame(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;

        // Clamp so a pause or breakpoint doesn't produce one giant step
        delta.as_secs_f32().min(self.config.max_delta_secs)
    }

    /// Runs one frame with wall-clock delta time.
    ///
    /// # Errors
    ///
    /// Returns the first update or draw failure. The frame is not recorded.
    pub fn run_frame(&mut self, surface: Option<&mut dyn Surface>) -> EngineResult<FrameStats> {
        let delta_time = self.begin_frame();
        self.step(delta_time, surface)
    }

    /// Runs one frame with an explicit delta time (clamped like wall-clock
    /// deltas).
    ///
    /// # Errors
    ///
    /// Returns the first update or draw failure. The frame is not recorded.
    pub fn step(&mut self, delta_time: f32, surface: Option<&mut dyn Surface>) -> EngineResult<FrameStats> {
        let delta_time = delta_time.max(0.0).min(self.config.max_delta_secs);
        let frame_start = Instant::now();

        let before = self.world.entity_count();
        self.world.update(delta_time)?;
        let spawned = self.world.entity_count().saturating_sub(before);
        let update_done = Instant::now();

        if let Some(surface) = surface {
            self.world.draw(surface)?;
        }
        let draw_done = Instant::now();

        let swept = if self.config.sweep_inactive {
            self.world.remove_inactive_entities()
        } else {
            0
        };
        let sweep_done = Instant::now();

        let stats = FrameStats {
            total_us: micros(sweep_done - frame_start),
            update_us: micros(update_done - frame_start),
            draw_us: micros(draw_done - update_done),
            sweep_us: micros(sweep_done - draw_done),
            frame: self.frame_count,
            spawned,
            swept,
        };
        self.end_frame(stats);
        Ok(stats)
    }

    /// Records a finished frame.
    pub fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats_accumulator.record(stats);

        let slow = 2 * micros(self.stats_accumulator.budget);
        if self.config.enable_timing_logs && stats.total_us > slow {
            tracing::warn!(
                frame = stats.frame,
                total_us = stats.total_us,
                update_us = stats.update_us,
                draw_us = stats.draw_us,
                budget_us = micros(self.stats_accumulator.budget),
                "frame exceeded budget"
            );
        }
    }

    /// Returns the current frame count.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns the world, mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Returns the loop configuration.
    #[must_use]
    pub fn config(&self) -> &GameLoopConfig {
        &self.config
    }

    /// Returns the accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats_accumulator
    }

    /// Consumes the loop and returns the world.
    #[must_use]
    pub fn into_world(self) -> World {
        self.world
    }
}

impl fmt::Debug for GameLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameLoop")
            .field("frame_count", &self.frame_count)
            .field("config", &self.config)
            .field("world", &self.world)
            .finish_non_exhaustive()
    }
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Frame budget frames are measured against.
    pub budget: Duration,
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of update pass times.
    pub update_us_sum: u64,
    /// Sum of draw pass times.
    pub draw_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
    /// Entities spawned across all frames.
    pub entities_spawned: u64,
    /// Entities swept across all frames.
    pub entities_swept: u64,
}

impl FrameStatsAccumulator {
    /// Creates an accumulator measuring against `budget`.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            frames_recorded: 0,
            total_us_sum: 0,
            update_us_sum: 0,
            draw_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            entities_spawned: 0,
            entities_swept: 0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum = self.total_us_sum.saturating_add(stats.total_us);
        self.update_us_sum = self.update_us_sum.saturating_add(stats.update_us);
        self.draw_us_sum = self.draw_us_sum.saturating_add(stats.draw_us);
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.entities_spawned += stats.spawned as u64;
        self.entities_swept += stats.swept as u64;

        if stats.total_us > micros(self.budget) {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new(GameLoopConfig::default().target_frame_time())
    }
}

#[allow(clippy::cast_precision_loss)]
impl fmt::Display for FrameStatsAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frames recorded:  {}", self.frames_recorded)?;
        writeln!(
            f,
            "Average frame:    {:.3} ms ({:.1} FPS)",
            self.avg_frame_ms(),
            self.avg_fps()
        )?;
        if self.frames_recorded > 0 {
            writeln!(f, "Min frame:        {:.3} ms", self.min_frame_us as f64 / 1000.0)?;
            writeln!(f, "Max frame:        {:.3} ms", self.max_frame_us as f64 / 1000.0)?;
        }
        writeln!(
            f,
            "Over budget:      {} frames ({:.1}%) against {:.3} ms",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0,
            self.budget.as_secs_f64() * 1000.0
        )?;
        write!(
            f,
            "Entities:         {} spawned, {} swept",
            self.entities_spawned, self.entities_swept
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{EntityRef, EntitySpawner, EventDispatcher, System, SystemInfo, SystemResult};

    /// Spawns one entity per frame and retires the oldest active one.
    struct Churn {
        spawner: EntitySpawner,
    }

    impl System for Churn {
        fn update(&mut self, _: f32, entities: &[EntityRef], _: &EventDispatcher) -> SystemResult {
            if let Some(oldest) = entities.iter().find(|e| e.is_active()) {
                oldest.set_active(false);
            }
            self.spawner.spawn();
            Ok(())
        }
    }

    fn churn_loop(config: GameLoopConfig) -> GameLoop {
        let mut world = World::new();
        world.new_entity();
        let spawner = world.spawner().clone();
        world.register_system(SystemInfo::new("Churn"), Churn { spawner }).unwrap();
        world.build_execution_order().unwrap();
        GameLoop::new(world, config)
    }

    #[test]
    fn test_game_loop_creation() {
        let game_loop = GameLoop::new(World::new(), GameLoopConfig::default());
        assert_eq!(game_loop.frame_count(), 0);
        assert_eq!(game_loop.stats().frames_recorded, 0);
    }

    #[test]
    fn test_frame_cycle_spawns_and_sweeps() {
        let mut game_loop = churn_loop(GameLoopConfig::default());

        let stats = game_loop.step(0.016, None).unwrap();
        assert_eq!(stats.frame, 0);
        assert_eq!(stats.spawned, 1);
        assert_eq!(stats.swept, 1);
        assert_eq!(game_loop.frame_count(), 1);

        let ids: Vec<u64> = game_loop.world().entities().iter().map(|e| e.id().get()).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_sweep_can_be_disabled() {
        let mut game_loop = churn_loop(GameLoopConfig {
            sweep_inactive: false,
            ..Default::default()
        });

        for _ in 0..3 {
            game_loop.step(0.016, None).unwrap();
        }
        assert_eq!(game_loop.world().entity_count(), 4);
        assert_eq!(game_loop.stats().entities_spawned, 3);
        assert_eq!(game_loop.stats().entities_swept, 0);
    }

    #[test]
    fn test_unbuilt_world_fails_frame() {
        let mut game_loop = GameLoop::new(World::new(), GameLoopConfig::default());
        assert!(game_loop.run_frame(None).is_err());
        assert_eq!(game_loop.frame_count(), 0);
    }

    #[test]
    fn test_begin_frame_clamps_delta() {
        let mut game_loop = GameLoop::new(
            World::new(),
            GameLoopConfig {
                max_delta_secs: 0.05,
                ..Default::default()
            },
        );
        std::thread::sleep(Duration::from_millis(60));
        let delta = game_loop.begin_frame();
        assert!(delta <= 0.05);
    }

    #[test]
    fn test_stats_accumulator() {
        let mut acc = FrameStatsAccumulator::new(Duration::from_micros(16_666));

        for i in 0..100 {
            acc.record(FrameStats {
                total_us: 10_000 + (i * 100),
                update_us: 6_000,
                draw_us: 3_000,
                sweep_us: 100,
                frame: i,
                spawned: 1,
                swept: 0,
            });
        }

        assert_eq!(acc.frames_recorded, 100);
        assert_eq!(acc.entities_spawned, 100);
        assert_eq!(acc.min_frame_us, 10_000);
        assert_eq!(acc.max_frame_us, 19_900);
        // 16_700 .. 19_900
        assert_eq!(acc.frames_over_budget, 33);
        assert!(acc.avg_fps() > 50.0);
        assert!(acc.avg_fps() < 100.0);
        assert!(acc.to_string().contains("Frames recorded:  100"));
    }
}
