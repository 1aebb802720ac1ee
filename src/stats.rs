//! Cumulative play statistics
//!
//! Folded once per finished run and persisted as one JSON blob.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, keys, load_json, save_json};
use crate::settings::Difficulty;
use crate::sim::{PowerUpKind, RunSummary};

/// Lifetime counters across every run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStatistics {
    pub games_played: u32,
    pub total_score: u64,
    pub high_score: u32,
    pub total_powerups: u32,
    pub shields_collected: u32,
    pub powerup_kinds: BTreeSet<PowerUpKind>,
    /// Most obstacles passed in a single run
    pub best_obstacles: u32,
    pub total_play_ms: f64,
    pub consecutive_days: u32,
    /// Day index (days since the Unix epoch) of the last finished run
    pub last_play_day: Option<i64>,
    pub difficulties_played: BTreeSet<Difficulty>,
    pub perfect_runs: u32,
}

impl RunStatistics {
    /// Fold a finished run into the totals.
    ///
    /// God mode runs count as played but never raise the high score.
    pub fn record_run(&mut self, run: &RunSummary, day: i64) {
        self.games_played += 1;
        self.total_score += run.score as u64;
        if !run.god_mode {
            self.high_score = self.high_score.max(run.score);
        }

        self.total_powerups += run.powerups_collected;
        self.shields_collected += run.shields_collected;
        self.powerup_kinds.extend(run.powerup_kinds.iter().copied());

        self.best_obstacles = self.best_obstacles.max(run.obstacles_passed);
        self.total_play_ms += run.duration_ms.max(0.0);
        self.difficulties_played.insert(run.difficulty);
        if run.is_perfect() {
            self.perfect_runs += 1;
        }

        self.record_play_day(day);
    }

    /// Same day: unchanged. The day after: the streak grows. Otherwise it restarts.
    fn record_play_day(&mut self, day: i64) {
        match self.last_play_day {
            Some(last) if last == day => {}
            Some(last) if last + 1 == day => self.consecutive_days += 1,
            _ => self.consecutive_days = 1,
        }
        self.last_play_day = Some(day);
    }

    pub fn play_minutes(&self) -> u64 {
        (self.total_play_ms / 60_000.0).floor() as u64
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let stats: Self = load_json(store, keys::STATS);
        log::info!("Loaded statistics ({} games played)", stats.games_played);
        stats
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        save_json(store, keys::STATS, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn run(score: u32, obstacles: u32) -> RunSummary {
        RunSummary {
            score,
            obstacles_passed: obstacles,
            duration_ms: 30_000.0,
            ..RunSummary::default()
        }
    }

    #[test]
    fn test_record_run() {
        let mut stats = RunStatistics::default();
        let mut summary = run(42, 25);
        summary.powerups_collected = 3;
        summary.shields_collected = 1;
        summary.powerup_kinds.insert(PowerUpKind::Shield);
        summary.powerup_kinds.insert(PowerUpKind::Magnet);
        stats.record_run(&summary, 100);

        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.high_score, 42);
        assert_eq!(stats.total_powerups, 3);
        assert_eq!(stats.powerup_kinds.len(), 2);
        assert_eq!(stats.best_obstacles, 25);
        assert_eq!(stats.perfect_runs, 1);
        assert!(stats.difficulties_played.contains(&Difficulty::Normal));

        stats.record_run(&run(10, 5), 100);
        assert_eq!(stats.high_score, 42);
        assert_eq!(stats.total_score, 52);
        assert_eq!(stats.best_obstacles, 25);
        assert_eq!(stats.perfect_runs, 1);
        assert_eq!(stats.total_play_ms, 60_000.0);
        assert_eq!(stats.play_minutes(), 1);
    }

    #[test]
    fn test_god_mode_keeps_high_score() {
        let mut stats = RunStatistics::default();
        let mut summary = run(900, 300);
        summary.god_mode = true;
        stats.record_run(&summary, 1);
        assert_eq!(stats.high_score, 0);
        assert_eq!(stats.games_played, 1);
    }

    #[test]
    fn test_consecutive_days() {
        let mut stats = RunStatistics::default();
        stats.record_run(&run(1, 0), 10);
        assert_eq!(stats.consecutive_days, 1);
        stats.record_run(&run(1, 0), 10);
        assert_eq!(stats.consecutive_days, 1);
        stats.record_run(&run(1, 0), 11);
        stats.record_run(&run(1, 0), 12);
        assert_eq!(stats.consecutive_days, 3);
        stats.record_run(&run(1, 0), 14);
        assert_eq!(stats.consecutive_days, 1);
    }

    #[test]
    fn test_persisted_blob() {
        let mut store = MemoryStore::new();
        let mut stats = RunStatistics::default();
        stats.record_run(&run(12, 3), 5);
        stats.save(&mut store).unwrap();
        assert_eq!(RunStatistics::load(&store), stats);

        // Older blobs without newer fields still load
        store.set(keys::STATS, r#"{"games_played":4}"#).unwrap();
        let partial = RunStatistics::load(&store);
        assert_eq!(partial.games_played, 4);
        assert!(partial.powerup_kinds.is_empty());
    }
}
