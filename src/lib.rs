//! Cave Flap - a bat navigating a procedurally generated cave
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, power-ups, collisions)
//! - `game`: Root orchestrator wiring the simulation to settings, scores and progress
//! - `achievements` / `stats`: Cumulative statistics and unlockable achievements
//! - `renderer`: Abstract 2D drawing surface and scene rendering
//! - `audio`: Sound cues for game events (Web Audio playback on wasm)
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Key-value storage (LocalStorage on web)

pub mod achievements;
pub mod audio;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod stats;

pub use achievements::ProgressTracker;
pub use game::Game;
pub use highscores::HighScores;
pub use settings::{Difficulty, DifficultyParams, Settings};
pub use stats::RunStatistics;

/// Game configuration constants
///
/// Speeds and accelerations are expressed per 16 ms frame; every update
/// scales them by `dt / FRAME_MS`.
pub mod consts {
    /// Reference frame length all per-frame rates are tuned for (ms)
    pub const FRAME_MS: f32 = 16.0;
    /// Longest frame the simulation will integrate in one tick (tab switches etc.)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Playfield defaults (resized to the canvas in the browser)
    pub const DEFAULT_PLAYFIELD_WIDTH: f32 = 480.0;
    pub const DEFAULT_PLAYFIELD_HEIGHT: f32 = 720.0;
    /// Cave floor strip; touching it counts as a boundary hit
    pub const GROUND_HEIGHT: f32 = 20.0;

    /// Bat physics
    pub const GRAVITY: f32 = 0.35;
    pub const JUMP_IMPULSE: f32 = -6.0;
    pub const TERMINAL_VELOCITY: f32 = 12.0;
    pub const MAX_TILT: f32 = std::f32::consts::FRAC_PI_6; // 30 degrees
    pub const TILT_RATE: f32 = 0.1;
    pub const WING_FLAP_RATE: f32 = 0.3;

    /// Bat dimensions (normal and under the shrink effect)
    pub const BAT_WIDTH: f32 = 30.0;
    pub const BAT_HEIGHT: f32 = 25.0;
    pub const BAT_SMALL_WIDTH: f32 = 20.0;
    pub const BAT_SMALL_HEIGHT: f32 = 15.0;
    /// Collision box inset on every side, identical for every size
    pub const COLLISION_INSET: f32 = 2.0;

    /// Obstacle geometry
    pub const OBSTACLE_WIDTH: f32 = 60.0;
    pub const NARROW_GAP_FACTOR: f32 = 0.7;
    pub const WIDE_GAP_FACTOR: f32 = 1.5;
    pub const MOVING_RANGE: f32 = 30.0;
    pub const MOVING_SPEED: f32 = 1.0;
    pub const ROTATION_SPEED: f32 = 0.01;
    /// Horizontal inset of both solid spans of a rotating obstacle
    pub const ROTATING_COLLISION_MARGIN: f32 = 20.0;
    /// Gap centre keeps this far from the ceiling / floor
    pub const GAP_TOP_MARGIN: f32 = 50.0;
    pub const GAP_BOTTOM_MARGIN: f32 = 70.0;
    /// Largest gap centre change between consecutive obstacles
    pub const MAX_GAP_DELTA: f32 = 80.0;
    /// Chance that a spawn starts a streak of one archetype
    pub const STREAK_CHANCE: f64 = 0.2;
    pub const STREAK_MIN: u32 = 2;
    pub const STREAK_MAX: u32 = 4;

    /// Power-ups
    pub const POWERUP_SIZE: f32 = 25.0;
    pub const POWERUP_DRIFT_SPEED: f32 = 2.0;
    /// Virtual distance added to the spawn counter every tick
    pub const POWERUP_COUNTER_RATE: f32 = 2.0;
    pub const POWERUP_SPAWN_THRESHOLD: f32 = 300.0;
    pub const POWERUP_SPAWN_TOP: f32 = 50.0;
    pub const POWERUP_SPAWN_BOTTOM_MARGIN: f32 = 150.0;
    pub const MAGNET_RANGE: f32 = 100.0;
    pub const MAGNET_STRENGTH: f32 = 50.0;
    pub const MAGNET_MAX_STEP: f32 = 3.0;
    pub const LIFE_BONUS_POINTS: u32 = 5;

    /// Scoring milestones
    pub const THEME_STEP: u32 = 10;
    pub const CENTURY_STEP: u32 = 100;
    pub const FINALE_SCORE: u32 = 1000;
    pub const GOD_MODE_SPEED_MULTIPLIER: f32 = 4.0;
    /// Obstacles a run must pass without an absorbed hit to count as perfect
    pub const PERFECT_RUN_OBSTACLES: u32 = 20;

    /// Achievement toast display interval (ms)
    pub const NOTIFICATION_INTERVAL_MS: f64 = 3000.0;
}

pub use sim::collision::Rect;
