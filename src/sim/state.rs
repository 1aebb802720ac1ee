//! Game state and core simulation types
//!
//! Everything a run needs lives in [`GameState`]; the root orchestrator owns
//! it and passes it to [`super::tick`].

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::Bat;
use super::celebration::{CaveTheme, Celebrations, Scheduler, schedule_century, schedule_finale};
use super::effects::EffectKind;
use super::obstacle::{ArchetypeTable, ObstacleStream};
use super::powerup::{PowerUpKind, PowerUpStream};
use crate::consts::*;
use crate::settings::Difficulty;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for Start
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended by a fatal hit
    GameOver,
    /// God mode reached the finale score; fireworks, then the reveal
    Finale,
}

/// Things that happened during a tick, for audio, UI and bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    RunStarted,
    Flapped,
    Scored { points: u32, total: u32 },
    ThemeChanged(CaveTheme),
    Century(u32),
    PowerUpCollected(PowerUpKind),
    EffectExpired(EffectKind),
    ShieldAbsorbed,
    Paused,
    Resumed,
    GameOver { score: u32 },
    FinaleStarted { score: u32 },
    /// Finale fireworks have played long enough to show the results
    FinaleReveal,
}

impl GameEvent {
    /// The run is over (either way) after this event
    pub fn ends_run(&self) -> bool {
        matches!(self, GameEvent::GameOver { .. } | GameEvent::FinaleStarted { .. })
    }
}

/// Playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: DEFAULT_PLAYFIELD_WIDTH,
            height: DEFAULT_PLAYFIELD_HEIGHT,
        }
    }
}

/// Settings snapshot taken when a run starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    pub difficulty: Difficulty,
    pub gap: f32,
    pub obstacle_speed: f32,
    pub powerup_chance: f64,
    pub spawn_distance: f32,
    pub archetypes: ArchetypeTable,
    pub powerups_enabled: bool,
    pub god_mode: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        let params = Difficulty::Normal.params();
        Self {
            difficulty: Difficulty::Normal,
            gap: params.gap,
            obstacle_speed: params.obstacle_speed,
            powerup_chance: params.powerup_chance,
            spawn_distance: params.spawn_distance,
            archetypes: ArchetypeTable::STANDARD,
            powerups_enabled: true,
            god_mode: false,
        }
    }
}

/// What happened during one run, folded into the statistics when it ends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u32,
    pub obstacles_passed: u32,
    pub powerups_collected: u32,
    pub powerup_kinds: BTreeSet<PowerUpKind>,
    pub shields_collected: u32,
    /// Shield absorptions before the run passed `PERFECT_RUN_OBSTACLES`
    pub early_hits_absorbed: u32,
    pub duration_ms: f64,
    pub difficulty: Difficulty,
    pub god_mode: bool,
    pub reached_finale: bool,
}

impl RunSummary {
    /// Long enough and untouched through the opening stretch
    pub fn is_perfect(&self) -> bool {
        self.obstacles_passed >= PERFECT_RUN_OBSTACLES && self.early_hits_absorbed == 0
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub field: Playfield,
    pub config: RunConfig,
    pub bat: Bat,
    pub obstacles: ObstacleStream,
    pub powerups: PowerUpStream,
    pub celebrations: Celebrations,
    pub scheduler: Scheduler,
    pub score: u32,
    pub run: RunSummary,
    /// Simulation clock (ms); advances with every unpaused tick
    pub clock_ms: f64,
    run_started_ms: f64,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, field: Playfield) -> Self {
        let start = Bat::spawn_point(field.width, field.height);
        let config = RunConfig::default();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Menu,
            field,
            config,
            bat: Bat::new(start.x, start.y),
            obstacles: ObstacleStream::new(&config),
            powerups: PowerUpStream::new(&config),
            celebrations: Celebrations::new(),
            scheduler: Scheduler::new(),
            score: 0,
            run: RunSummary::default(),
            clock_ms: 0.0,
            run_started_ms: 0.0,
            events: Vec::new(),
        }
    }

    /// Begin a fresh run with `config`.
    ///
    /// Pending scheduled work from the previous run is discarded. The bat
    /// keeps any effects it still carries.
    pub fn start_run(&mut self, config: RunConfig) {
        self.config = config;
        self.bat.reset();
        self.obstacles.reset(&config);
        self.powerups.reset(&config);
        self.celebrations.reset();
        self.scheduler.reset();
        self.score = 0;
        self.run = RunSummary {
            difficulty: config.difficulty,
            god_mode: config.god_mode,
            ..RunSummary::default()
        };
        self.run_started_ms = self.clock_ms;
        self.phase = GamePhase::Playing;
        self.push_event(GameEvent::RunStarted);
        log::info!(
            "Run started: difficulty={}, seed={}, god_mode={}",
            config.difficulty.as_str(),
            self.seed,
            config.god_mode
        );
    }

    /// Resize the playfield; the bat's start point follows
    pub fn resize(&mut self, field: Playfield) {
        self.field = field;
        self.bat
            .set_start(Bat::spawn_point(field.width, field.height));
    }

    /// Add points and fire any milestones they cross
    pub fn add_score(&mut self, points: u32) {
        if points == 0 {
            return;
        }
        let old = self.score;
        self.score = self.score.saturating_add(points);
        self.run.score = self.score;

        let milestones = self.celebrations.on_score(old, self.score);
        if let Some(theme) = milestones.theme {
            log::info!("Entering the {}", theme.name());
            self.push_event(GameEvent::ThemeChanged(theme));
        }
        if let Some(century) = milestones.century {
            log::info!("Century celebration at {}", century);
            schedule_century(&mut self.scheduler, self.clock_ms);
            self.push_event(GameEvent::Century(century));
        }

        if self.config.god_mode && self.score >= FINALE_SCORE && self.phase == GamePhase::Playing {
            self.begin_finale();
        } else {
            self.push_event(GameEvent::Scored {
                points,
                total: self.score,
            });
        }
    }

    fn begin_finale(&mut self) {
        self.phase = GamePhase::Finale;
        self.run.reached_finale = true;
        self.finish_run();
        schedule_finale(&mut self.scheduler, self.clock_ms);
        self.celebrations.fireworks_active = true;
        log::info!("Finale reached at {}", self.score);
        self.push_event(GameEvent::FinaleStarted { score: self.score });
    }

    /// Fatal hit: the run ends and every effect is lost
    pub fn end_run(&mut self) {
        self.phase = GamePhase::GameOver;
        self.bat.clear_effects();
        self.finish_run();
        log::info!(
            "Game over: score={}, obstacles={}",
            self.score,
            self.run.obstacles_passed
        );
        self.push_event(GameEvent::GameOver { score: self.score });
    }

    fn finish_run(&mut self) {
        self.run.score = self.score;
        self.run.duration_ms = (self.clock_ms - self.run_started_ms).max(0.0);
    }

    /// Playing <-> Paused; ignored in other phases
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                self.phase = GamePhase::Paused;
                self.push_event(GameEvent::Paused);
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                self.push_event(GameEvent::Resumed);
            }
            GamePhase::Menu | GamePhase::GameOver | GamePhase::Finale => {}
        }
    }

    /// Pause only if running (window lost focus)
    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.toggle_pause();
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn theme(&self) -> CaveTheme {
        self.celebrations.theme
    }
}
