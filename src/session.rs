//! Frame loop boundary
//!
//! A `Session` owns the game state and the collaborators. Each animation
//! frame it turns a host timestamp into a clamped delta, runs one
//! simulation step, forwards the step's events to sound and UI, and hands
//! the state to the renderer. A failed step stops the session for good;
//! only `restart` brings it back.

use crate::consts::MAX_FRAME_DELTA_MS;
use crate::error::{GameError, StepError};
use crate::highscores::ScoreRecord;
use crate::platform::{AssetCatalog, AssetLoader, Collaborators, InputSnapshot, Screen, SoundEvent};
use crate::sim::{self, GameEvent, GamePhase, GameState};
use crate::tuning::Tuning;

pub struct Session {
    state: GameState,
    assets: AssetCatalog,
    collab: Collaborators,
    active: bool,
    last_frame_ms: Option<f64>,
    /// Why the session stopped, if a step failed
    fault: Option<StepError>,
}

impl Session {
    /// Validate the tuning and load every asset. No session exists if
    /// either fails.
    pub fn init(
        tuning: Tuning,
        loader: &mut dyn AssetLoader,
        collab: Collaborators,
        seed: u64,
    ) -> Result<Self, GameError> {
        tuning.validate()?;
        let assets = loader.load()?;
        log::info!(target: "assets", "{} sprites ready", assets.len());

        Ok(Self {
            state: GameState::new(tuning, assets.clone(), seed),
            assets,
            collab,
            active: false,
            last_frame_ms: None,
            fault: None,
        })
    }

    /// Begin accepting frames
    pub fn start(&mut self) {
        self.active = true;
        self.last_frame_ms = None;
        self.collab.ui.show_screen(Screen::Game);
        self.push_hud();
        log::info!("Session started (seed {})", self.state.seed);
    }

    /// Run one frame. Returns whether another frame should be requested.
    pub fn frame(&mut self, timestamp_ms: f64, input: &InputSnapshot) -> bool {
        if !self.active {
            return false;
        }

        let dt_ms = match self.last_frame_ms {
            Some(last) => clamp_delta(timestamp_ms - last),
            None => 0.0,
        };
        self.last_frame_ms = Some(timestamp_ms);

        if let Err(e) = sim::tick(&mut self.state, input, dt_ms as f32) {
            log::error!("Step failed, halting session: {e}");
            self.fault = Some(e);
            self.active = false;
            return false;
        }

        self.dispatch_events();
        self.collab.renderer.render(&self.state);
        self.active
    }

    pub fn stop(&mut self) {
        if self.active {
            log::info!("Session stopped");
        }
        self.active = false;
    }

    /// Pause from outside the input stream (tab hidden)
    pub fn pause(&mut self) {
        if self.state.phase == GamePhase::Playing {
            self.state.phase = GamePhase::Paused;
            self.collab.ui.show_screen(Screen::Paused);
            log::debug!("Paused by host");
        }
    }

    /// Rebuild all owned state and start again
    pub fn restart(&mut self, seed: u64) {
        let tuning = self.state.tuning.clone();
        self.state = GameState::new(tuning, self.assets.clone(), seed);
        self.fault = None;
        self.start();
    }

    /// Flip the mute state, returning the new value
    pub fn toggle_mute(&mut self) -> bool {
        self.collab.sound.toggle_mute()
    }

    /// Save the finished run. Storage failures are logged and swallowed.
    pub fn record_score(&mut self, name: &str) -> Option<ScoreRecord> {
        if !self.state.is_over() {
            log::warn!("Ignoring score submission before game over");
            return None;
        }
        match self.collab.scores.save_score(name, self.state.score.score) {
            Ok(record) => {
                log::info!("Saved score {} for {}", record.score, record.name);
                Some(record)
            }
            Err(e) => {
                log::warn!("Could not save score: {e}");
                None
            }
        }
    }

    /// Best runs so far, empty if storage is unavailable
    pub fn leaderboard(&self, limit: usize) -> Vec<ScoreRecord> {
        self.collab.scores.top_scores(limit).unwrap_or_else(|e| {
            log::warn!("Could not fetch high scores: {e}");
            Vec::new()
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn fault(&self) -> Option<&StepError> {
        self.fault.as_ref()
    }

    fn push_hud(&mut self) {
        self.collab.ui.update_score(self.state.score.score);
        self.collab.ui.update_lives(self.state.player.health);
        self.collab.ui.update_level(self.state.difficulty.level);
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::ShotFired { .. } => self.collab.sound.play(SoundEvent::Shoot),
                GameEvent::HostileDestroyed { .. } => {
                    self.collab.sound.play(SoundEvent::Explosion);
                    self.collab.ui.update_score(self.state.score.score);
                }
                GameEvent::PlayerHit { health } => {
                    self.collab.sound.play(SoundEvent::Explosion);
                    self.collab.ui.update_lives(health);
                }
                GameEvent::HostileEscaped { health } => self.collab.ui.update_lives(health),
                GameEvent::PowerUpCollected(kind) => {
                    log::debug!(target: "powerups", "collect {}", kind.as_str());
                    self.collab.sound.play(SoundEvent::PowerUp);
                }
                GameEvent::PowerUpExpired(kind) => {
                    log::debug!(target: "powerups", "expire {}", kind.as_str());
                }
                GameEvent::LevelUp(level) => self.collab.ui.update_level(level),
                GameEvent::Paused(true) => self.collab.ui.show_screen(Screen::Paused),
                GameEvent::Paused(false) => self.collab.ui.show_screen(Screen::Game),
                GameEvent::GameOver { score } => {
                    self.collab.sound.play(SoundEvent::GameOver);
                    self.collab.ui.update_score(score);
                    self.collab.ui.show_screen(Screen::GameOver);
                    self.active = false;
                }
            }
        }
    }
}

/// Absorb tab-resume gaps and clock skew. NaN passes through so the step
/// can reject it.
fn clamp_delta(dt_ms: f64) -> f64 {
    dt_ms.clamp(0.0, MAX_FRAME_DELTA_MS)
}
