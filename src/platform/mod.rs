//! Platform abstraction layer
//!
//! The simulation never touches the browser. Everything it consumes (input
//! snapshots, asset handles) or calls into (sound, UI, score storage,
//! rendering) goes through the interfaces defined here:
//! - `headless`: logging/recording implementations for native runs and tests
//! - `web`: DOM, keyboard and image loading for the browser build

use std::collections::HashMap;

use crate::error::{AssetError, PersistenceError};
use crate::highscores::ScoreRecord;
use crate::sim::{GameState, PickupKind};

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

/// Input state polled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub shoot: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
}

/// Opaque handle to a loaded image, owned by the asset collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u32);

/// Image slots the game knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Background,
    Player,
    Hostile,
    Projectile,
    Explosion,
    Pickup(PickupKind),
}

impl SpriteKind {
    pub const ALL: [SpriteKind; 8] = [
        SpriteKind::Background,
        SpriteKind::Player,
        SpriteKind::Hostile,
        SpriteKind::Projectile,
        SpriteKind::Explosion,
        SpriteKind::Pickup(PickupKind::Shield),
        SpriteKind::Pickup(PickupKind::RapidFire),
        SpriteKind::Pickup(PickupKind::MultiShot),
    ];
}

/// Sprite slot → handle table handed to the simulation
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    handles: HashMap<SpriteKind, VisualHandle>,
}

impl AssetCatalog {
    pub fn insert(&mut self, sprite: SpriteKind, handle: VisualHandle) {
        self.handles.insert(sprite, handle);
    }

    /// Missing sprites are drawn with fallback shapes
    pub fn get(&self, sprite: SpriteKind) -> Option<VisualHandle> {
        self.handles.get(&sprite).copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Produces the asset catalog before a session starts
pub trait AssetLoader {
    fn load(&mut self) -> Result<AssetCatalog, AssetError>;
}

/// Sound triggers raised by the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    Shoot,
    Explosion,
    PowerUp,
    GameOver,
}

impl SoundEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEvent::Shoot => "shoot",
            SoundEvent::Explosion => "explosion",
            SoundEvent::PowerUp => "powerUp",
            SoundEvent::GameOver => "gameOver",
        }
    }
}

/// Fire-and-forget sound output
pub trait SoundSink {
    fn play(&mut self, sound: SoundEvent);
    /// Flip the mute state, returning the new value
    fn toggle_mute(&mut self) -> bool;
}

/// Screens the UI can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Game,
    Paused,
    GameOver,
}

/// HUD and screen updates
pub trait UiSink {
    fn update_score(&mut self, score: u64);
    fn update_lives(&mut self, lives: u32);
    fn update_level(&mut self, level: u32);
    fn show_screen(&mut self, screen: Screen);
}

/// High score persistence. Only called at game over.
pub trait ScoreStore {
    fn save_score(&mut self, name: &str, score: u64) -> Result<ScoreRecord, PersistenceError>;
    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, PersistenceError>;
}

/// Draws the current state after each frame
pub trait Renderer {
    fn render(&mut self, state: &GameState);
}

/// Everything a session talks to besides the simulation
pub struct Collaborators {
    pub sound: Box<dyn SoundSink>,
    pub ui: Box<dyn UiSink>,
    pub scores: Box<dyn ScoreStore>,
    pub renderer: Box<dyn Renderer>,
}
