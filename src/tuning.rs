//! Data-driven game balance
//!
//! Every gameplay constant lives here so a session can be built from a JSON
//! blob. Missing fields fall back to the shipped defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Visible simulation area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub size: Vec2,
    /// Pixels per baseline frame
    pub speed: f32,
    pub max_health: u32,
    /// Base time between shots (ms), scaled by cooldown reduction
    pub shot_cooldown_ms: f64,
    /// Gap between the spawn position and the bottom of the playfield
    pub spawn_bottom_margin: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            size: Vec2::new(50.0, 50.0),
            speed: 5.0,
            max_health: 3,
            shot_cooldown_ms: 150.0,
            spawn_bottom_margin: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub size: Vec2,
    pub speed: f32,
    /// Angles (degrees, 0 = straight up) of a multi-shot volley
    pub spread_degrees: Vec<f32>,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            size: Vec2::new(5.0, 10.0),
            speed: 7.0,
            spread_degrees: vec![-15.0, 0.0, 15.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostileTuning {
    pub size: Vec2,
    pub initial_speed_min: f32,
    pub initial_speed_max: f32,
    pub initial_spawn_interval_ms: f64,
    /// Hostiles spawned when the session starts
    pub initial_batch: usize,
    /// Spawning pauses while this many hostiles are alive
    pub max_alive: usize,
    /// Base points for destroying one
    pub points: u32,
    /// Health lost on contact with the player
    pub contact_damage: u32,
    /// Health lost when one slips past the bottom edge
    pub escape_penalty: u32,
}

impl Default for HostileTuning {
    fn default() -> Self {
        Self {
            size: Vec2::new(50.0, 50.0),
            initial_speed_min: 1.0,
            initial_speed_max: 2.0,
            initial_spawn_interval_ms: 2000.0,
            initial_batch: 3,
            max_alive: 32,
            points: 100,
            contact_damage: 1,
            escape_penalty: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    pub size: Vec2,
    pub speed: f32,
    /// How long a collected effect stays active (ms)
    pub duration_ms: f32,
    /// Minimum time between pickup spawns (ms)
    pub spawn_interval_ms: f64,
    /// Chance per step of spawning once the interval has passed
    pub spawn_chance: f64,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            size: Vec2::new(30.0, 30.0),
            speed: 2.0,
            duration_ms: 5000.0,
            spawn_interval_ms: 15000.0,
            spawn_chance: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionTuning {
    pub size: Vec2,
    pub frame_duration_ms: f32,
    pub total_frames: u32,
}

impl Default for ExplosionTuning {
    fn default() -> Self {
        Self {
            size: Vec2::new(64.0, 64.0),
            frame_duration_ms: 50.0,
            total_frames: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Inactivity window after which the combo drops to zero (ms)
    pub combo_window_ms: f32,
    /// Extra multiplier per combo step
    pub combo_bonus: f32,
    pub multiplier: f32,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            combo_window_ms: 2000.0,
            combo_bonus: 0.1,
            multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    pub increase_interval_ms: f64,
    pub speed_step: f32,
    pub spawn_interval_step_ms: f64,
    pub min_spawn_interval_ms: f64,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            increase_interval_ms: 30000.0,
            speed_step: 0.2,
            spawn_interval_step_ms: 100.0,
            min_spawn_interval_ms: 500.0,
        }
    }
}

/// Complete balance sheet for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub playfield: Playfield,
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub hostile: HostileTuning,
    pub pickup: PickupTuning,
    pub explosion: ExplosionTuning,
    pub scoring: ScoringTuning,
    pub difficulty: DifficultyTuning,
}

impl Tuning {
    /// Parse and validate a tuning blob
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let field = self.playfield;
        for (name, size) in [
            ("player.size", self.player.size),
            ("projectile.size", self.projectile.size),
            ("hostile.size", self.hostile.size),
            ("pickup.size", self.pickup.size),
            ("explosion.size", self.explosion.size),
        ] {
            if size.x <= 0.0 || size.y <= 0.0 {
                return Err(invalid(name, format!("extent must be positive, got {size}")));
            }
        }
        // Spawn positions are drawn from [0, width - entity width)
        for (name, size) in [
            ("player.size", self.player.size),
            ("hostile.size", self.hostile.size),
            ("pickup.size", self.pickup.size),
        ] {
            if size.x >= field.width || size.y >= field.height {
                return Err(invalid(
                    name,
                    format!("does not fit a {}x{} playfield", field.width, field.height),
                ));
            }
        }
        for (name, value) in [
            ("player.speed", self.player.speed as f64),
            ("projectile.speed", self.projectile.speed as f64),
            ("hostile.initial_speed_min", self.hostile.initial_speed_min as f64),
            ("hostile.initial_spawn_interval_ms", self.hostile.initial_spawn_interval_ms),
            ("pickup.speed", self.pickup.speed as f64),
            ("pickup.duration_ms", self.pickup.duration_ms as f64),
            ("difficulty.increase_interval_ms", self.difficulty.increase_interval_ms),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(invalid(name, format!("must be positive, got {value}")));
            }
        }
        // The ramp only ever makes things harder
        for (name, value) in [
            ("difficulty.speed_step", self.difficulty.speed_step as f64),
            ("difficulty.spawn_interval_step_ms", self.difficulty.spawn_interval_step_ms),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(invalid(name, format!("must not be negative, got {value}")));
            }
        }
        if self.hostile.initial_speed_min > self.hostile.initial_speed_max {
            return Err(invalid(
                "hostile.initial_speed_min",
                "must not exceed initial_speed_max".to_string(),
            ));
        }
        if self.player.max_health == 0 {
            return Err(invalid("player.max_health", "must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.pickup.spawn_chance) {
            return Err(invalid(
                "pickup.spawn_chance",
                format!("{} is not a probability", self.pickup.spawn_chance),
            ));
        }
        if self.explosion.total_frames == 0 {
            return Err(invalid("explosion.total_frames", "must be at least 1".to_string()));
        }
        if self.difficulty.min_spawn_interval_ms <= 0.0 {
            return Err(invalid(
                "difficulty.min_spawn_interval_ms",
                "must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "playfield": { "height": 1000 } }"#).unwrap();
        assert_eq!(tuning.playfield.width, 800.0);
        assert_eq!(tuning.playfield.height, 1000.0);
        assert_eq!(tuning.player.shot_cooldown_ms, 150.0);
        assert_eq!(tuning.hostile.initial_batch, 3);
    }

    #[test]
    fn test_rejects_oversized_hostile() {
        let json = r#"{ "playfield": { "width": 40, "height": 600 } }"#;
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "player.size", .. }));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = Tuning::from_json(r#"{ "pickup": { "spawn_chance": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pickup.spawn_chance", .. }));
    }

    #[test]
    fn test_rejects_backwards_ramp() {
        let err = Tuning::from_json(r#"{ "difficulty": { "speed_step": -0.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "difficulty.speed_step", .. }));

        let json = r#"{ "difficulty": { "spawn_interval_step_ms": -400 } }"#;
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "difficulty.spawn_interval_step_ms", .. }
        ));
    }

    #[test]
    fn test_rejects_zero_ramp_interval() {
        let json = r#"{ "difficulty": { "increase_interval_ms": 0 } }"#;
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "difficulty.increase_interval_ms", .. }
        ));
    }

    #[test]
    fn test_rejects_stalled_movers() {
        let json = r#"{ "hostile": { "initial_speed_min": -1, "initial_speed_max": 3 } }"#;
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "hostile.initial_speed_min", .. }));

        let err = Tuning::from_json(r#"{ "pickup": { "speed": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pickup.speed", .. }));
    }

    #[test]
    fn test_flat_ramp_is_allowed() {
        let json = r#"{ "difficulty": { "speed_step": 0, "spawn_interval_step_ms": 0 } }"#;
        assert!(Tuning::from_json(json).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(Tuning::from_json("{"), Err(ConfigError::Parse(_))));
    }
}
