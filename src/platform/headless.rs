//! Headless collaborators
//!
//! Used by the native binary and by tests. Each one shares its record
//! through `Rc` so a clone kept outside the session can inspect what the
//! session did.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{
    AssetCatalog, AssetLoader, Renderer, Screen, ScoreStore, SoundEvent, SoundSink, SpriteKind,
    UiSink, VisualHandle,
};
use crate::error::{AssetError, PersistenceError};
use crate::highscores::{HighScores, ScoreRecord};
use crate::sim::GameState;

/// Hands out sequential handles for every sprite slot
#[derive(Debug, Default)]
pub struct StaticAssets {
    /// Simulate a missing file
    pub fail_on: Option<String>,
}

impl AssetLoader for StaticAssets {
    fn load(&mut self) -> Result<AssetCatalog, AssetError> {
        if let Some(path) = &self.fail_on {
            return Err(AssetError::LoadFailed(path.clone()));
        }
        let mut catalog = AssetCatalog::default();
        for (i, sprite) in SpriteKind::ALL.iter().enumerate() {
            catalog.insert(*sprite, VisualHandle(i as u32));
        }
        log::debug!(target: "assets", "registered {} headless sprites", catalog.len());
        Ok(catalog)
    }
}

#[derive(Debug, Default)]
struct SoundLog {
    played: Vec<SoundEvent>,
    muted: bool,
}

/// Logs sound triggers instead of playing them
#[derive(Debug, Clone, Default)]
pub struct RecordingSound {
    log: Rc<RefCell<SoundLog>>,
}

impl RecordingSound {
    /// Sounds played while unmuted, in order
    pub fn played(&self) -> Vec<SoundEvent> {
        self.log.borrow().played.clone()
    }

    pub fn is_muted(&self) -> bool {
        self.log.borrow().muted
    }
}

impl SoundSink for RecordingSound {
    fn play(&mut self, sound: SoundEvent) {
        let mut log = self.log.borrow_mut();
        if log.muted {
            return;
        }
        log::trace!(target: "sound", "play {}", sound.as_str());
        log.played.push(sound);
    }

    fn toggle_mute(&mut self) -> bool {
        let mut log = self.log.borrow_mut();
        log.muted = !log.muted;
        log::debug!(target: "sound", "{}", if log.muted { "mute" } else { "unmute" });
        log.muted
    }
}

/// Last values pushed to the HUD
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudSnapshot {
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub screens: Vec<Screen>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    hud: Rc<RefCell<HudSnapshot>>,
}

impl RecordingUi {
    pub fn snapshot(&self) -> HudSnapshot {
        self.hud.borrow().clone()
    }

    pub fn current_screen(&self) -> Option<Screen> {
        self.hud.borrow().screens.last().copied()
    }
}

impl UiSink for RecordingUi {
    fn update_score(&mut self, score: u64) {
        self.hud.borrow_mut().score = score;
    }

    fn update_lives(&mut self, lives: u32) {
        self.hud.borrow_mut().lives = lives;
    }

    fn update_level(&mut self, level: u32) {
        self.hud.borrow_mut().level = level;
    }

    fn show_screen(&mut self, screen: Screen) {
        log::debug!("screen -> {screen:?}");
        self.hud.borrow_mut().screens.push(screen);
    }
}

/// Leaderboard kept in memory for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    table: Rc<RefCell<HighScores>>,
    unavailable: Rc<Cell<bool>>,
}

impl MemoryScoreStore {
    /// Make every call fail, as a dropped connection would
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    pub fn table(&self) -> HighScores {
        self.table.borrow().clone()
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.unavailable.get() {
            return Err(PersistenceError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

impl ScoreStore for MemoryScoreStore {
    fn save_score(&mut self, name: &str, score: u64) -> Result<ScoreRecord, PersistenceError> {
        self.check()?;
        let record = ScoreRecord::new(name, score, now_ms());
        self.table.borrow_mut().insert(record.clone());
        Ok(record)
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, PersistenceError> {
        self.check()?;
        Ok(self.table.borrow().top(limit))
    }
}

/// Counts frames handed to it
#[derive(Debug, Clone, Default)]
pub struct NullRenderer {
    frames: Rc<Cell<u64>>,
}

impl NullRenderer {
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }
}

impl Renderer for NullRenderer {
    fn render(&mut self, _state: &GameState) {
        self.frames.set(self.frames.get() + 1);
    }
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}
