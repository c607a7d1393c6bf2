//! High score leaderboard
//!
//! Persisted to LocalStorage, tracks the top 10 finished sessions.

use serde::{Deserialize, Serialize};

use crate::storage;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// World and level where the session ended
    pub world: u32,
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl HighScoreEntry {
    /// "W-L" label for the leaderboard
    pub fn stage(&self) -> String {
        format!("{}-{}", self.world, self.level)
    }
}

/// High score leaderboard, sorted by descending score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "pocket_platformer_highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a finished session. Returns the 1-indexed rank, or None if the
    /// score didn't make the board.
    pub fn add_score(
        &mut self,
        score: u64,
        world: u32,
        level: u32,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            world,
            level,
            timestamp,
        };

        // Ties keep the older entry ahead
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the leaderboard, starting fresh if none is stored
    pub fn load() -> Self {
        let Some(json) = storage::read(Self::STORAGE_KEY) else {
            return Self::new();
        };
        serde_json::from_str::<HighScores>(&json).unwrap_or_else(|e| {
            log::warn!("Discarding unreadable high scores: {}", e);
            Self::new()
        })
    }

    pub fn save(&self) {
        match serde_json::to_string(self) {
            Ok(json) if storage::write(Self::STORAGE_KEY, &json) => {
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
            Ok(_) => {}
            Err(e) => log::warn!("Could not encode high scores: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_stay_sorted() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(500, 1, 2, 0.0), Some(1));
        assert_eq!(scores.add_score(1500, 2, 1, 1.0), Some(1));
        assert_eq!(scores.add_score(800, 1, 3, 2.0), Some(2));

        let values: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(values, vec![1500, 800, 500]);
        assert_eq!(scores.entries[0].stage(), "2-1");
        assert_eq!(scores.top_score(), Some(1500));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(0, 1, 1, 0.0), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_board_is_capped() {
        let mut scores = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u64 {
            scores.add_score(i * 100, 1, 1, 0.0);
        }
        assert!(!scores.qualifies(50));
        assert_eq!(scores.add_score(50, 1, 1, 0.0), None);

        assert_eq!(scores.add_score(250, 1, 1, 0.0), Some(9));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(200));
    }
}
