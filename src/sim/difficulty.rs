//! Difficulty ramp over session time
//!
//! One-directional: hostiles only get faster and spawn more often.

use std::ops::RangeInclusive;

use crate::tuning::{DifficultyTuning, HostileTuning};

#[derive(Debug, Clone, PartialEq)]
pub struct Difficulty {
    /// Minimum time between hostile spawns (ms)
    pub spawn_interval_ms: f64,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Sim time of the last ramp step (ms)
    pub last_increase_ms: f64,
    /// Shown to the player, starts at 1
    pub level: u32,
}

impl Difficulty {
    pub fn new(hostile: &HostileTuning) -> Self {
        Self {
            spawn_interval_ms: hostile.initial_spawn_interval_ms,
            speed_min: hostile.initial_speed_min,
            speed_max: hostile.initial_speed_max,
            last_increase_ms: 0.0,
            level: 1,
        }
    }

    /// Speed range new and recycled hostiles are drawn from
    pub fn speed_range(&self) -> RangeInclusive<f32> {
        self.speed_min..=self.speed_max
    }

    /// Step the ramp if its interval has passed. Returns true on a step.
    pub fn update(&mut self, now_ms: f64, tuning: &DifficultyTuning) -> bool {
        if now_ms - self.last_increase_ms < tuning.increase_interval_ms {
            return false;
        }

        self.speed_min += tuning.speed_step;
        self.speed_max += tuning.speed_step;
        self.spawn_interval_ms = (self.spawn_interval_ms - tuning.spawn_interval_step_ms)
            .max(tuning.min_spawn_interval_ms);
        self.last_increase_ms = now_ms;
        self.level += 1;

        log::info!(
            "Level {}: hostile speed {:.1}-{:.1}, spawn every {}ms",
            self.level,
            self.speed_min,
            self.speed_max,
            self.spawn_interval_ms
        );
        true
    }
}
