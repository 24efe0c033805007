//! Game state and core simulation types
//!
//! Everything a step reads or writes is owned here and passed explicitly.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::difficulty::Difficulty;
use super::entities::{Explosion, Hostile, Pickup, PickupKind, Player, Projectile, Spatial};
use super::score::ScoreTracker;
use super::spawn;
use crate::platform::{AssetCatalog, SpriteKind, VisualHandle};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Something the outside world may want to react to, queued during a step
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ShotFired { count: usize },
    HostileDestroyed { at: Vec2, points: u64 },
    /// A hostile rammed the player and the damage landed
    PlayerHit { health: u32 },
    /// A hostile slipped past the bottom edge
    HostileEscaped { health: u32 },
    PowerUpCollected(PickupKind),
    PowerUpExpired(PickupKind),
    LevelUp(u32),
    Paused(bool),
    GameOver { score: u64 },
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub assets: AssetCatalog,
    /// Simulation clock (ms since session start)
    pub clock_ms: f64,
    pub phase: GamePhase,
    pub player: Player,
    pub projectiles: Vec<Projectile>,
    pub hostiles: Vec<Hostile>,
    pub pickups: Vec<Pickup>,
    pub explosions: Vec<Explosion>,
    pub score: ScoreTracker,
    pub difficulty: Difficulty,
    /// Sim time of the last shot; negative infinity until the first one
    pub last_shot_ms: f64,
    pub last_enemy_spawn_ms: f64,
    pub last_pickup_spawn_ms: f64,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed, initial hostiles included
    pub fn new(tuning: Tuning, assets: AssetCatalog, seed: u64) -> Self {
        let player = Player::new(
            &tuning.player,
            tuning.playfield,
            assets.get(SpriteKind::Player),
        );
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: ScoreTracker::new(&tuning.scoring),
            difficulty: Difficulty::new(&tuning.hostile),
            tuning,
            assets,
            clock_ms: 0.0,
            phase: GamePhase::Playing,
            player,
            projectiles: Vec::new(),
            hostiles: Vec::new(),
            pickups: Vec::new(),
            explosions: Vec::new(),
            last_shot_ms: f64::NEG_INFINITY,
            last_enemy_spawn_ms: 0.0,
            last_pickup_spawn_ms: 0.0,
            events: Vec::new(),
        };

        spawn::initial_batch(&mut state);

        state
    }

    pub fn visual(&self, sprite: SpriteKind) -> Option<VisualHandle> {
        self.assets.get(sprite)
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// End the run (idempotent)
    pub fn game_over(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver {
            score: self.score.score,
        });
        log::info!(
            "Game over: score {}, level {}",
            self.score.score,
            self.difficulty.level
        );
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Every drawable entity in paint order (back to front)
    pub fn drawables(&self) -> impl Iterator<Item = &dyn Spatial> {
        self.projectiles
            .iter()
            .map(|p| p as &dyn Spatial)
            .chain(std::iter::once(&self.player as &dyn Spatial))
            .chain(self.hostiles.iter().map(|h| h as &dyn Spatial))
            .chain(self.pickups.iter().map(|p| p as &dyn Spatial))
            .chain(self.explosions.iter().map(|e| e as &dyn Spatial))
    }
}
