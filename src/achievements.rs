//! Achievements and the unlock notification queue
//!
//! The rule set is a fixed table. Each rule is either a threshold check or a
//! counter with a target, both reading one [`Metric`] of the lifetime
//! [`RunStatistics`]. Unlocks are permanent.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::consts::NOTIFICATION_INTERVAL_MS;
use crate::persistence::{KeyValueStore, StorageError, keys, load_json, save_json};
use crate::stats::RunStatistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// A statistic an achievement can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    GamesPlayed,
    HighScore,
    TotalPowerUps,
    ShieldsCollected,
    PowerUpKinds,
    PerfectRuns,
    PlayMinutes,
    DifficultiesPlayed,
    ConsecutiveDays,
    BestObstacles,
}

impl Metric {
    pub fn value(&self, stats: &RunStatistics) -> u64 {
        match self {
            Metric::GamesPlayed => stats.games_played as u64,
            Metric::HighScore => stats.high_score as u64,
            Metric::TotalPowerUps => stats.total_powerups as u64,
            Metric::ShieldsCollected => stats.shields_collected as u64,
            Metric::PowerUpKinds => stats.powerup_kinds.len() as u64,
            Metric::PerfectRuns => stats.perfect_runs as u64,
            Metric::PlayMinutes => stats.play_minutes(),
            Metric::DifficultiesPlayed => stats.difficulties_played.len() as u64,
            Metric::ConsecutiveDays => stats.consecutive_days as u64,
            Metric::BestObstacles => stats.best_obstacles as u64,
        }
    }
}

/// Unlock rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Unlocks the first time the metric reaches the threshold
    Reached { metric: Metric, at_least: u64 },
    /// Tracks progress toward a target and unlocks on reaching it
    Progress { metric: Metric, target: u64 },
}

impl Condition {
    /// Progress value that means "done"
    pub fn target(&self) -> u64 {
        match self {
            Condition::Reached { .. } => 1,
            Condition::Progress { target, .. } => *target,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    pub condition: Condition,
}

const fn reached(metric: Metric, at_least: u64) -> Condition {
    Condition::Reached { metric, at_least }
}

const fn progress(metric: Metric, target: u64) -> Condition {
    Condition::Progress { metric, target }
}

pub static ACHIEVEMENTS: [AchievementDef; 18] = [
    AchievementDef {
        id: "first_flight",
        title: "First Flight",
        description: "Play your first game",
        rarity: Rarity::Common,
        condition: reached(Metric::GamesPlayed, 1),
    },
    AchievementDef {
        id: "score_10",
        title: "Getting Started",
        description: "Score 10 points",
        rarity: Rarity::Common,
        condition: reached(Metric::HighScore, 10),
    },
    AchievementDef {
        id: "score_50",
        title: "Cave Explorer",
        description: "Score 50 points",
        rarity: Rarity::Common,
        condition: reached(Metric::HighScore, 50),
    },
    AchievementDef {
        id: "score_100",
        title: "Centurion",
        description: "Score 100 points",
        rarity: Rarity::Rare,
        condition: reached(Metric::HighScore, 100),
    },
    AchievementDef {
        id: "score_200",
        title: "Deep Diver",
        description: "Score 200 points",
        rarity: Rarity::Epic,
        condition: reached(Metric::HighScore, 200),
    },
    AchievementDef {
        id: "games_10",
        title: "Regular",
        description: "Play 10 games",
        rarity: Rarity::Common,
        condition: progress(Metric::GamesPlayed, 10),
    },
    AchievementDef {
        id: "games_50",
        title: "Veteran",
        description: "Play 50 games",
        rarity: Rarity::Rare,
        condition: progress(Metric::GamesPlayed, 50),
    },
    AchievementDef {
        id: "games_100",
        title: "Cave Dweller",
        description: "Play 100 games",
        rarity: Rarity::Epic,
        condition: progress(Metric::GamesPlayed, 100),
    },
    AchievementDef {
        id: "first_powerup",
        title: "Powered Up",
        description: "Collect your first power-up",
        rarity: Rarity::Common,
        condition: reached(Metric::TotalPowerUps, 1),
    },
    AchievementDef {
        id: "powerup_collector",
        title: "Collector",
        description: "Collect 50 power-ups",
        rarity: Rarity::Rare,
        condition: progress(Metric::TotalPowerUps, 50),
    },
    AchievementDef {
        id: "shield_master",
        title: "Shield Master",
        description: "Pick up 10 shields",
        rarity: Rarity::Rare,
        condition: progress(Metric::ShieldsCollected, 10),
    },
    AchievementDef {
        id: "power_variety",
        title: "Variety Pack",
        description: "Collect every kind of power-up",
        rarity: Rarity::Epic,
        condition: progress(Metric::PowerUpKinds, 6),
    },
    AchievementDef {
        id: "perfect_start",
        title: "Perfect Start",
        description: "Pass the first 20 obstacles without a hit",
        rarity: Rarity::Rare,
        condition: reached(Metric::PerfectRuns, 1),
    },
    AchievementDef {
        id: "marathon_player",
        title: "Marathon",
        description: "Play for 60 minutes in total",
        rarity: Rarity::Rare,
        condition: progress(Metric::PlayMinutes, 60),
    },
    AchievementDef {
        id: "difficulty_master",
        title: "Difficulty Master",
        description: "Play on every difficulty",
        rarity: Rarity::Epic,
        condition: progress(Metric::DifficultiesPlayed, 4),
    },
    AchievementDef {
        id: "daily_player",
        title: "Daily Flyer",
        description: "Play 5 days in a row",
        rarity: Rarity::Rare,
        condition: progress(Metric::ConsecutiveDays, 5),
    },
    AchievementDef {
        id: "cave_legend",
        title: "Cave Legend",
        description: "Score 500 points",
        rarity: Rarity::Legendary,
        condition: reached(Metric::HighScore, 500),
    },
    AchievementDef {
        id: "immortal_bat",
        title: "Immortal Bat",
        description: "Pass 100 obstacles in one game",
        rarity: Rarity::Legendary,
        condition: reached(Metric::BestObstacles, 100),
    },
];

pub fn find(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Persisted state of one achievement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementRecord {
    pub unlocked: bool,
    /// Wall-clock ms of the unlock
    pub unlocked_at: Option<f64>,
    pub progress: u64,
}

impl AchievementRecord {
    pub fn percent(&self, def: &AchievementDef) -> u32 {
        let target = def.condition.target().max(1);
        ((self.progress.min(target) * 100) / target) as u32
    }
}

/// Unlocked / total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    pub unlocked: usize,
    pub total: usize,
}

/// Evaluates achievements and paces unlock notifications
#[derive(Debug, Default)]
pub struct ProgressTracker {
    records: BTreeMap<String, AchievementRecord>,
    queue: VecDeque<&'static AchievementDef>,
    next_notification_ms: f64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let mut records: BTreeMap<String, AchievementRecord> = load_json(store, keys::ACHIEVEMENTS);
        records.retain(|id, _| find(id).is_some());
        let tracker = Self {
            records,
            ..Self::default()
        };
        let summary = tracker.summary();
        log::info!(
            "Loaded achievements ({}/{} unlocked)",
            summary.unlocked,
            summary.total
        );
        tracker
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        save_json(store, keys::ACHIEVEMENTS, &self.records)
    }

    pub fn record(&self, id: &str) -> AchievementRecord {
        self.records.get(id).copied().unwrap_or_default()
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.record(id).unlocked
    }

    /// Evaluate every locked achievement against `stats`.
    ///
    /// Returns (and queues for display) the ones unlocked by this call.
    pub fn evaluate(&mut self, stats: &RunStatistics, now_ms: f64) -> Vec<&'static AchievementDef> {
        let mut unlocked = Vec::new();
        for def in ACHIEVEMENTS.iter() {
            let record = self.records.entry(def.id.to_string()).or_default();
            if record.unlocked {
                continue;
            }

            let done = match def.condition {
                Condition::Reached { metric, at_least } => metric.value(stats) >= at_least,
                Condition::Progress { metric, target } => {
                    let value = metric.value(stats).min(target);
                    record.progress = record.progress.max(value);
                    record.progress >= target
                }
            };

            if done {
                record.unlocked = true;
                record.unlocked_at = Some(now_ms);
                record.progress = def.condition.target();
                log::info!("Achievement unlocked: {} ({})", def.title, def.rarity.label());
                unlocked.push(def);
            }
        }

        self.queue.extend(unlocked.iter().copied());
        unlocked
    }

    /// Next notification to show, at most one per `NOTIFICATION_INTERVAL_MS`
    pub fn poll_notification(&mut self, now_ms: f64) -> Option<&'static AchievementDef> {
        if now_ms < self.next_notification_ms {
            return None;
        }
        let def = self.queue.pop_front()?;
        self.next_notification_ms = now_ms + NOTIFICATION_INTERVAL_MS;
        Some(def)
    }

    pub fn pending_notifications(&self) -> usize {
        self.queue.len()
    }

    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            unlocked: ACHIEVEMENTS
                .iter()
                .filter(|a| self.is_unlocked(a.id))
                .count(),
            total: ACHIEVEMENTS.len(),
        }
    }

    /// Every achievement for display: unlocked first, then rarest first
    pub fn display_list(&self) -> Vec<(&'static AchievementDef, AchievementRecord)> {
        let mut list: Vec<_> = ACHIEVEMENTS
            .iter()
            .map(|def| (def, self.record(def.id)))
            .collect();
        list.sort_by(|(a_def, a), (b_def, b)| {
            b.unlocked
                .cmp(&a.unlocked)
                .then(b_def.rarity.cmp(&a_def.rarity))
        });
        list
    }
}
