//! Score accumulation with a decaying combo multiplier

use crate::tuning::ScoringTuning;

/// Score and combo state for one session
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTracker {
    pub score: u64,
    /// Scoring events since the combo window last lapsed
    pub combo: u32,
    /// Time left before the combo drops to zero (ms)
    pub combo_timer_ms: f32,
    pub multiplier: f32,
    combo_window_ms: f32,
    combo_bonus: f32,
}

impl ScoreTracker {
    pub fn new(tuning: &ScoringTuning) -> Self {
        Self {
            score: 0,
            combo: 0,
            combo_timer_ms: 0.0,
            multiplier: tuning.multiplier,
            combo_window_ms: tuning.combo_window_ms,
            combo_bonus: tuning.combo_bonus,
        }
    }

    /// Record a scoring event. Returns the points actually added.
    pub fn award_points(&mut self, base: u32) -> u64 {
        self.combo += 1;
        self.combo_timer_ms = self.combo_window_ms;

        let factor =
            self.multiplier as f64 * (1.0 + self.combo as f64 * self.combo_bonus as f64);
        // Negative multipliers would make the score go backwards
        let points = (base as f64 * factor).floor().max(0.0) as u64;
        self.score += points;
        points
    }

    /// Advance the combo window
    pub fn tick(&mut self, dt_ms: f32) {
        if self.combo == 0 {
            return;
        }
        self.combo_timer_ms -= dt_ms;
        if self.combo_timer_ms <= 0.0 {
            log::trace!("combo of {} lapsed", self.combo);
            self.combo = 0;
            self.combo_timer_ms = 0.0;
        }
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.combo = 0;
        self.combo_timer_ms = 0.0;
    }
}
