//! Error types for the game.
//!
//! Nothing here is retried automatically. Asset and config errors stop a
//! session from starting, step errors halt a running session, and
//! persistence errors are logged and swallowed by the caller.

use crate::sim::EntityKind;

/// Top-level error returned from session setup.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Step error: {0}")]
    Step(#[from] StepError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("Failed to load image: {0}")]
    LoadFailed(String),

    #[error("Asset not registered: {0}")]
    Missing(String),
}

/// A simulation step could not complete. The session halts on any of these.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("Frame delta is not a finite non-negative number: {0}")]
    InvalidDelta(f32),

    #[error("{0:?} left the simulation with a non-finite position")]
    CorruptEntity(EntityKind),
}

#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("Score storage unavailable: {0}")]
    Unavailable(String),

    #[error("Score data could not be encoded: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Tuning could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
