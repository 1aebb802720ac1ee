//! Game settings and preferences
//!
//! Each setting is its own key in the store so a corrupt entry only resets
//! that one setting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::GOD_MODE_SPEED_MULTIPLIER;
use crate::persistence::{KeyValueStore, StorageError, keys, load_parsed};
use crate::sim::{ArchetypeTable, RunConfig};

/// A stored difficulty name that matches no level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDifficulty(pub String);

impl fmt::Display for UnknownDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown difficulty: {:?}", self.0)
    }
}

impl std::error::Error for UnknownDifficulty {}

/// Difficulty levels
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Extreme,
}

/// Tuning tuple for one difficulty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyParams {
    pub gap: f32,
    pub obstacle_speed: f32,
    pub powerup_chance: f64,
    pub spawn_distance: f32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Extreme,
    ];

    pub fn params(&self) -> DifficultyParams {
        match self {
            Difficulty::Easy => DifficultyParams {
                gap: 140.0,
                obstacle_speed: 1.5,
                powerup_chance: 0.3,
                spawn_distance: 250.0,
            },
            Difficulty::Normal => DifficultyParams {
                gap: 120.0,
                obstacle_speed: 2.0,
                powerup_chance: 0.2,
                spawn_distance: 200.0,
            },
            Difficulty::Hard => DifficultyParams {
                gap: 100.0,
                obstacle_speed: 2.5,
                powerup_chance: 0.15,
                spawn_distance: 180.0,
            },
            Difficulty::Extreme => DifficultyParams {
                gap: 80.0,
                obstacle_speed: 3.0,
                powerup_chance: 0.1,
                spawn_distance: 160.0,
            },
        }
    }

    pub fn archetypes(&self) -> ArchetypeTable {
        match self {
            Difficulty::Extreme => ArchetypeTable::EXTREME,
            Difficulty::Easy | Difficulty::Normal | Difficulty::Hard => ArchetypeTable::STANDARD,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Extreme => "extreme",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Extreme => "Extreme",
        }
    }

    /// Next level, wrapping (menu cycling)
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Extreme,
            Difficulty::Extreme => Difficulty::Easy,
        }
    }
}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" | "medium" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "extreme" => Ok(Difficulty::Extreme),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub powerups_enabled: bool,
    pub sound_enabled: bool,
    /// Developer mode: collisions never end the run
    pub god_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            powerups_enabled: true,
            sound_enabled: true,
            god_mode: false,
        }
    }
}

impl Settings {
    /// Snapshot consumed by the simulation at run start
    pub fn run_config(&self) -> RunConfig {
        let params = self.difficulty.params();
        let speed_multiplier = if self.god_mode {
            GOD_MODE_SPEED_MULTIPLIER
        } else {
            1.0
        };
        RunConfig {
            difficulty: self.difficulty,
            gap: params.gap,
            obstacle_speed: params.obstacle_speed * speed_multiplier,
            powerup_chance: params.powerup_chance,
            spawn_distance: params.spawn_distance,
            archetypes: self.difficulty.archetypes(),
            powerups_enabled: self.powerups_enabled,
            god_mode: self.god_mode,
        }
    }

    /// Load settings; every absent or unreadable key keeps its default
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let defaults = Self::default();
        let settings = Self {
            difficulty: load_parsed(store, keys::DIFFICULTY, defaults.difficulty),
            powerups_enabled: load_parsed(store, keys::POWERUPS, defaults.powerups_enabled),
            sound_enabled: load_parsed(store, keys::SOUND, defaults.sound_enabled),
            god_mode: load_parsed(store, keys::GOD_MODE, defaults.god_mode),
        };
        log::info!(
            "Loaded settings: difficulty={}, powerups={}, sound={}, god_mode={}",
            settings.difficulty.as_str(),
            settings.powerups_enabled,
            settings.sound_enabled,
            settings.god_mode
        );
        settings
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        store.set(keys::DIFFICULTY, self.difficulty.as_str())?;
        store.set(keys::POWERUPS, &self.powerups_enabled.to_string())?;
        store.set(keys::SOUND, &self.sound_enabled.to_string())?;
        store.set(keys::GOD_MODE, &self.god_mode.to_string())?;
        log::info!("Settings saved");
        Ok(())
    }
}
