//! Best score and the top 10 leaderboard
//!
//! The best score has its own key; the leaderboard is one JSON blob.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, keys, load_json, load_parsed, save_json};
use crate::settings::Difficulty;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    pub difficulty: Difficulty,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Best score plus leaderboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighScores {
    pub best: u32,
    /// Sorted descending by score
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Record a finished run. Returns the leaderboard rank (1-indexed) if it placed.
    pub fn add_score(
        &mut self,
        score: u32,
        difficulty: Difficulty,
        timestamp: f64,
    ) -> Option<usize> {
        self.best = self.best.max(score);
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            difficulty,
            timestamp,
        };

        // Ties go below existing entries
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

    /// True if `score` beats the stored best (check before recording it)
    pub fn is_new_best(&self, score: u32) -> bool {
        score > self.best
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let mut entries: Vec<HighScoreEntry> = load_json(store, keys::LEADERBOARD);
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        let top = entries.first().map_or(0, |e| e.score);
        let best = load_parsed(store, keys::HIGH_SCORE, 0u32).max(top);
        log::info!("Loaded high scores (best {}, {} entries)", best, entries.len());
        Self { best, entries }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        store.set(keys::HIGH_SCORE, &self.best.to_string())?;
        save_json(store, keys::LEADERBOARD, &self.entries)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_ranking() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(10, Difficulty::Normal, 0.0), Some(1));
        assert_eq!(scores.add_score(30, Difficulty::Hard, 1.0), Some(1));
        assert_eq!(scores.add_score(20, Difficulty::Easy, 2.0), Some(2));
        assert_eq!(scores.add_score(20, Difficulty::Easy, 3.0), Some(3));
        assert_eq!(scores.entries.first().map(|e| e.score), Some(30));
        assert_eq!(scores.best, 30);
        assert_eq!(scores.add_score(0, Difficulty::Easy, 4.0), None);
    }

    #[test]
    fn test_leaderboard_capped_at_ten() {
        let mut scores = HighScores::new();
        for s in 1..=12 {
            scores.add_score(s, Difficulty::Normal, s as f64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(3));
        assert!(!scores.qualifies(3));
        assert!(scores.qualifies(4));
    }

    #[test]
    fn test_persisted() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        scores.add_score(17, Difficulty::Extreme, 99.0);
        scores.save(&mut store).unwrap();
        assert_eq!(store.get(keys::HIGH_SCORE).as_deref(), Some("17"));
        assert_eq!(HighScores::load(&store), scores);
    }

    #[test]
    fn test_best_survives_missing_leaderboard() {
        let mut store = MemoryStore::new();
        store.set(keys::HIGH_SCORE, "250").unwrap();
        let scores = HighScores::load(&store);
        assert_eq!(scores.best, 250);
        assert!(scores.is_empty());
        assert!(scores.is_new_best(251));
        assert!(!scores.is_new_best(250));
        assert!(!HighScores::new().is_new_best(0));
    }
}
