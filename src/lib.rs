//! Galactic Fighter - A vertical arcade shoot-em-up
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, spawning, scoring)
//! - `session`: Frame loop boundary that drives `sim` and talks to collaborators
//! - `platform`: Collaborator interfaces (input, assets, sound, UI, rendering)
//! - `highscores`: Score records and the leaderboard table
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod error;
pub mod highscores;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod renderer;

pub use error::{AssetError, ConfigError, GameError, PersistenceError, StepError};
pub use highscores::{HighScores, ScoreRecord};
pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Frame length the per-frame speeds are expressed against (60 fps)
    pub const BASELINE_FRAME_MS: f32 = 16.0;
    /// Largest frame delta fed to the simulation (tab-resume guard)
    pub const MAX_FRAME_DELTA_MS: f64 = 100.0;

    /// Per-axis speed factor when moving diagonally
    pub const DIAGONAL_FACTOR: f32 = 0.707;

    /// Leaderboard size fetched at game over
    pub const LEADERBOARD_LIMIT: usize = 10;
}

/// Scale a per-frame speed to the elapsed frame time
#[inline]
pub fn frame_scale(dt_ms: f32) -> f32 {
    dt_ms / consts::BASELINE_FRAME_MS
}
