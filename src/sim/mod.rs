//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through the `dt` handed to `tick`
//! - Seeded RNG only
//! - Timers are countdowns inside the step, never host callbacks
//! - No rendering or platform dependencies beyond the collaborator types

pub mod collision;
pub mod difficulty;
pub mod entities;
pub mod powerup;
pub mod score;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Overlap, check_bounds, overlap, overlaps};
pub use difficulty::Difficulty;
pub use entities::{
    Body, EntityKind, Explosion, Hostile, Pickup, PickupKind, Player, Projectile, Spatial,
};
pub use powerup::ActivePowerUp;
pub use score::ScoreTracker;
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{tick, try_fire};
