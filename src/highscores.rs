//! High score leaderboard
//!
//! Persisted to LocalStorage on the web build, kept in memory natively.
//! Tracks the top 10 runs.

use serde::{Deserialize, Serialize};

use crate::consts::LEADERBOARD_LIMIT;

/// Name stored when the player leaves the prompt blank
pub const ANONYMOUS: &str = "Anonymous";

/// Longest name kept on the board
pub const MAX_NAME_LEN: usize = 16;

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "player_name")]
    pub name: String,
    pub score: u64,
    /// Unix timestamp (ms) when saved
    #[serde(rename = "created_at")]
    pub date: f64,
}

impl ScoreRecord {
    pub fn new(name: &str, score: u64, date: f64) -> Self {
        Self {
            name: sanitize_name(name),
            score,
            date,
        }
    }
}

/// Trim whitespace, cap the length and fall back to [`ANONYMOUS`]
pub fn sanitize_name(name: &str) -> String {
    let trimmed: String = name.trim().chars().take(MAX_NAME_LEN).collect();
    if trimmed.is_empty() {
        ANONYMOUS.to_string()
    } else {
        trimmed
    }
}

/// Leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<ScoreRecord>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "galactic_fighter_highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < LEADERBOARD_LIMIT {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Full board and the score falls short of the last row
    pub fn is_low_score(&self, score: u64) -> bool {
        self.entries.len() >= LEADERBOARD_LIMIT
            && self.entries.last().is_some_and(|e| score < e.score)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a record if it qualifies.
    /// Returns the rank achieved (1-indexed) or None.
    pub fn insert(&mut self, record: ScoreRecord) -> Option<usize> {
        if !self.qualifies(record.score) {
            return None;
        }

        // Ties keep the earlier run ahead
        let pos = self.entries.iter().position(|e| record.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, record);
                i + 1
            }
            None => {
                self.entries.push(record);
                self.entries.len()
            }
        };

        self.entries.truncate(LEADERBOARD_LIMIT);
        Some(rank)
    }

    /// First `limit` rows
    pub fn top(&self, limit: usize) -> Vec<ScoreRecord> {
        self.entries.iter().take(limit).cloned().collect()
    }

    /// Best score recorded under `name`
    pub fn player_best(&self, name: &str) -> Option<u64> {
        let name = sanitize_name(name);
        self.entries
            .iter()
            .filter(|e| e.name == name)
            .map(|e| e.score)
            .max()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<HighScores>(&json) {
                    Ok(scores) => {
                        log::info!("Loaded {} high scores", scores.entries.len());
                        return scores;
                    }
                    Err(e) => log::warn!("Discarding unreadable high scores: {e}"),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), crate::error::PersistenceError> {
        use crate::error::PersistenceError;

        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistenceError::Unavailable("no localStorage".to_string()))?;

        let json = serde_json::to_string(self)?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// LocalStorage-backed [`ScoreStore`](crate::platform::ScoreStore)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalScoreStore {
    table: HighScores,
}

#[cfg(target_arch = "wasm32")]
impl LocalScoreStore {
    pub fn load() -> Self {
        Self {
            table: HighScores::load(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl crate::platform::ScoreStore for LocalScoreStore {
    fn save_score(
        &mut self,
        name: &str,
        score: u64,
    ) -> Result<ScoreRecord, crate::error::PersistenceError> {
        let record = ScoreRecord::new(name, score, js_sys::Date::now());
        if let Some(rank) = self.table.insert(record.clone()) {
            log::info!("{} placed #{rank} with {score}", record.name);
            self.table.save()?;
        }
        Ok(record)
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, crate::error::PersistenceError> {
        Ok(self.table.top(limit))
    }
}

/// Format a timestamp as a relative date string
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let diff_mins = (js_sys::Date::now() - timestamp) / 60_000.0;
    let diff_hours = diff_mins / 60.0;

    if diff_hours >= 24.0 {
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
        format!(
            "{}/{}/{}",
            date.get_month() + 1,
            date.get_date(),
            date.get_full_year() % 100
        )
    } else if diff_hours >= 1.0 {
        format!("{}h ago", diff_hours.floor() as i32)
    } else if diff_mins >= 1.0 {
        format!("{}m ago", diff_mins.floor() as i32)
    } else {
        "Just now".to_string()
    }
}
