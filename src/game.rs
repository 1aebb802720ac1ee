//! Root orchestrator
//!
//! Owns the simulation state, settings, scores, statistics and achievement
//! progress, and the key-value store they persist to. The platform layer
//! feeds it actions and frame times; nothing here touches the DOM.

use crate::achievements::{AchievementDef, ProgressTracker};
use crate::consts::NOTIFICATION_INTERVAL_MS;
use crate::highscores::HighScores;
use crate::persistence::{KeyValueStore, warn_on_error};
use crate::platform::{InputAction, InputQueue, day_index};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, Playfield, RunSummary, TickInput, tick};
use crate::stats::RunStatistics;

/// Outcome of the last finished run, for the results screen
#[derive(Debug, Clone)]
pub struct RunResult {
    pub summary: RunSummary,
    /// Leaderboard placement (1-indexed)
    pub rank: Option<usize>,
    pub new_best: bool,
    pub unlocked: Vec<&'static AchievementDef>,
}

/// An achievement toast currently on screen
#[derive(Debug, Clone, Copy)]
pub struct Notification {
    pub achievement: &'static AchievementDef,
    pub shown_at_ms: f64,
}

pub struct Game<S: KeyValueStore> {
    pub state: GameState,
    pub settings: Settings,
    pub stats: RunStatistics,
    pub progress: ProgressTracker,
    pub highscores: HighScores,
    store: S,
    input: InputQueue,
    /// Steer automatically (menu attract mode, headless demo)
    pub autopilot: bool,
    last_result: Option<RunResult>,
    notification: Option<Notification>,
    finale_revealed: bool,
}

impl<S: KeyValueStore> Game<S> {
    /// Load everything persisted in `store` and wait in the menu
    pub fn new(store: S, seed: u64, field: Playfield) -> Self {
        let settings = Settings::load(&store);
        let stats = RunStatistics::load(&store);
        let progress = ProgressTracker::load(&store);
        let highscores = HighScores::load(&store);
        Self {
            state: GameState::new(seed, field),
            settings,
            stats,
            progress,
            highscores,
            store,
            input: InputQueue::new(),
            autopilot: false,
            last_result: None,
            notification: None,
            finale_revealed: false,
        }
    }

    /// Queue an action for the next frame
    pub fn handle(&mut self, action: InputAction) {
        self.input.push(action);
    }

    /// Window lost focus
    pub fn blur(&mut self) {
        self.state.pause();
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Start a run with the current settings
    pub fn start_run(&mut self) {
        self.last_result = None;
        self.finale_revealed = false;
        self.state.start_run(self.settings.run_config());
    }

    /// Advance one animation frame. Returns the frame's events.
    pub fn frame(&mut self, dt_ms: f32, now_ms: f64) -> Vec<GameEvent> {
        let mut input = TickInput {
            autopilot: self.autopilot,
            ..TickInput::default()
        };

        for action in self.input.drain() {
            match action {
                InputAction::Flap => input.flap = true,
                InputAction::PauseToggle => input.pause = !input.pause,
                InputAction::Start => {
                    if matches!(
                        self.state.phase,
                        GamePhase::Menu | GamePhase::GameOver | GamePhase::Finale
                    ) {
                        self.start_run();
                    }
                }
            }
        }

        tick(&mut self.state, &input, dt_ms);

        let events = self.state.take_events();
        if events.iter().any(GameEvent::ends_run) {
            self.finish_run(now_ms);
        }
        if events.contains(&GameEvent::FinaleReveal) {
            self.finale_revealed = true;
        }
        self.update_notification(now_ms);
        events
    }

    /// Fold the finished run into statistics, achievements and scores, then persist
    fn finish_run(&mut self, now_ms: f64) {
        let summary = self.state.run.clone();

        self.stats.record_run(&summary, day_index(now_ms));
        let unlocked = self.progress.evaluate(&self.stats, now_ms);

        let (rank, new_best) = if summary.god_mode {
            (None, false)
        } else {
            let new_best = self.highscores.is_new_best(summary.score);
            let rank = self
                .highscores
                .add_score(summary.score, summary.difficulty, now_ms);
            (rank, new_best)
        };

        self.persist();
        self.last_result = Some(RunResult {
            summary,
            rank,
            new_best,
            unlocked,
        });
    }

    fn persist(&mut self) {
        warn_on_error("statistics", self.stats.save(&mut self.store));
        warn_on_error("achievements", self.progress.save(&mut self.store));
        warn_on_error("high scores", self.highscores.save(&mut self.store));
    }

    fn update_notification(&mut self, now_ms: f64) {
        if self
            .notification
            .is_some_and(|n| now_ms - n.shown_at_ms >= NOTIFICATION_INTERVAL_MS)
        {
            self.notification = None;
        }
        if let Some(achievement) = self.progress.poll_notification(now_ms) {
            self.notification = Some(Notification {
                achievement,
                shown_at_ms: now_ms,
            });
        }
    }

    /// Achievement toast to show this frame
    pub fn notification(&self) -> Option<Notification> {
        self.notification
    }

    pub fn last_result(&self) -> Option<&RunResult> {
        self.last_result.as_ref()
    }

    /// The finale fireworks are done and the results may be shown
    pub fn finale_revealed(&self) -> bool {
        self.finale_revealed
    }

    /// Replace and persist settings; they apply from the next run
    pub fn apply_settings(&mut self, settings: Settings) {
        self.settings = settings;
        warn_on_error("settings", self.settings.save(&mut self.store));
    }

    pub fn resize(&mut self, field: Playfield) {
        self.state.resize(field);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, keys};
    use crate::settings::Difficulty;

    const DAY: f64 = 86_400_000.0;

    fn game() -> Game<MemoryStore> {
        Game::new(MemoryStore::new(), 7, Playfield::default())
    }

    /// Frames until the run ends (the bat falls without input)
    fn play_until_over(game: &mut Game<MemoryStore>, now: f64) {
        for i in 0..2000 {
            game.frame(16.0, now + i as f64 * 16.0);
            if game.phase() != GamePhase::Playing {
                return;
            }
        }
    }

    #[test]
    fn test_start_from_menu() {
        let mut game = game();
        assert_eq!(game.phase(), GamePhase::Menu);
        game.handle(InputAction::Flap);
        game.frame(16.0, 0.0);
        assert_eq!(game.phase(), GamePhase::Menu);

        game.handle(InputAction::Start);
        let events = game.frame(16.0, 16.0);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(events.contains(&GameEvent::RunStarted));
    }

    #[test]
    fn test_menu_prompt_key_starts_run() {
        use crate::platform::action_for_key;
        use crate::renderer::RecordingSurface;
        use crate::renderer::scene::render_frame;

        let mut game = game();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        render_frame(&mut surface, &game);
        assert!(surface.texts().contains(&"Press ENTER or tap to start"));

        // Space flaps; it does not start a run from the title screen
        game.handle(action_for_key("Space").unwrap());
        game.frame(16.0, 0.0);
        assert_eq!(game.phase(), GamePhase::Menu);

        game.handle(action_for_key("Enter").unwrap());
        let events = game.frame(16.0, 16.0);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(events.contains(&GameEvent::RunStarted));
    }

    #[test]
    fn test_pause_actions_in_one_frame_cancel() {
        let mut game = game();
        game.start_run();
        game.handle(InputAction::PauseToggle);
        game.handle(InputAction::PauseToggle);
        game.frame(16.0, 0.0);
        assert_eq!(game.phase(), GamePhase::Playing);

        game.handle(InputAction::PauseToggle);
        game.frame(16.0, 16.0);
        assert_eq!(game.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_blur_pauses() {
        let mut game = game();
        game.start_run();
        game.blur();
        assert_eq!(game.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_finished_run_is_recorded_and_persisted() {
        let mut game = game();
        game.start_run();
        game.state.add_score(12);
        play_until_over(&mut game, 5.0 * DAY);
        assert_eq!(game.phase(), GamePhase::GameOver);

        let result = game.last_result().cloned().unwrap();
        assert_eq!(result.summary.score, 12);
        assert!(result.new_best);
        assert_eq!(result.rank, Some(1));
        assert!(result.unlocked.iter().any(|a| a.id == "first_flight"));

        assert_eq!(game.stats.games_played, 1);
        assert_eq!(game.highscores.best, 12);
        assert!(game.store().get(keys::STATS).is_some());
        assert!(game.store().get(keys::ACHIEVEMENTS).is_some());
        assert_eq!(game.store().get(keys::HIGH_SCORE).as_deref(), Some("12"));
    }

    #[test]
    fn test_tying_the_best_is_not_a_new_best() {
        let mut game = game();
        game.highscores.best = 12;
        game.start_run();
        game.state.add_score(12);
        play_until_over(&mut game, DAY);

        let result = game.last_result().cloned().unwrap();
        assert!(!result.new_best);
        assert_eq!(game.highscores.best, 12);
    }

    #[test]
    fn test_god_mode_run_skips_high_score() {
        let mut game = game();
        game.apply_settings(Settings {
            god_mode: true,
            ..Settings::default()
        });
        game.start_run();
        game.state.add_score(crate::consts::FINALE_SCORE);
        game.frame(16.0, DAY);
        assert_eq!(game.phase(), GamePhase::Finale);

        let result = game.last_result().cloned().unwrap();
        assert!(result.summary.reached_finale);
        assert_eq!(result.rank, None);
        assert_eq!(game.highscores.best, 0);
        assert_eq!(game.stats.games_played, 1);
        assert!(!game.finale_revealed());

        for i in 1..=130 {
            game.frame(16.0, DAY + i as f64 * 16.0);
        }
        assert!(game.finale_revealed());
        game.start_run();
        assert!(!game.finale_revealed());
    }

    #[test]
    fn test_notifications_shown_one_at_a_time() {
        let mut game = game();
        game.start_run();
        game.state.add_score(55);
        play_until_over(&mut game, 0.0);

        // first_flight, score_10, score_50
        let first = game.notification().map(|n| n.achievement.id);
        assert_eq!(first, Some("first_flight"));
        let over_at = game.notification().map(|n| n.shown_at_ms).unwrap_or_default();

        game.frame(16.0, over_at + 1000.0);
        assert_eq!(game.notification().map(|n| n.achievement.id), Some("first_flight"));
        game.frame(16.0, over_at + 3000.0);
        assert_eq!(game.notification().map(|n| n.achievement.id), Some("score_10"));
    }

    #[test]
    fn test_settings_apply_to_next_run() {
        let mut game = game();
        game.apply_settings(Settings {
            difficulty: Difficulty::Extreme,
            ..Settings::default()
        });
        assert_eq!(game.store().get(keys::DIFFICULTY).as_deref(), Some("extreme"));
        game.start_run();
        assert_eq!(game.state.config.gap, 80.0);
        assert_eq!(game.state.run.difficulty, Difficulty::Extreme);
    }
}
