// Integration tests (native) for the `cave-flap` crate.
// Whole runs through the public `Game` API against an in-memory store, then a
// reload from the same store, the way the browser does it across sessions.

use cave_flap::persistence::{KeyValueStore, MemoryStore, keys};
use cave_flap::platform::InputAction;
use cave_flap::sim::{GameEvent, GamePhase, Playfield};
use cave_flap::{Difficulty, Game, Settings};

const DAY_MS: f64 = 86_400_000.0;

fn new_game(store: MemoryStore, seed: u64) -> Game<MemoryStore> {
    Game::new(store, seed, Playfield::default())
}

/// Step frames until the run is no longer playing; returns every event seen
fn play_out(game: &mut Game<MemoryStore>, now: f64, max_frames: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for i in 0..max_frames {
        events.extend(game.frame(16.0, now + i as f64 * 16.0));
        if game.phase() != GamePhase::Playing {
            break;
        }
    }
    events
}

#[test]
fn run_is_recorded_and_survives_reload() {
    let mut game = new_game(MemoryStore::new(), 11);
    game.handle(InputAction::Start);
    game.frame(16.0, DAY_MS);
    assert_eq!(game.phase(), GamePhase::Playing);

    game.state.add_score(15);
    let events = play_out(&mut game, DAY_MS, 5000);
    assert_eq!(game.phase(), GamePhase::GameOver);
    assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { score: 15 })));

    let played = game.stats.clone();
    assert_eq!(played.games_played, 1);
    assert_eq!(played.high_score, 15);

    let reloaded = new_game(game.into_store(), 12);
    assert_eq!(reloaded.stats, played);
    assert_eq!(reloaded.highscores.best, 15);
    assert_eq!(reloaded.highscores.entries.len(), 1);
    assert!(reloaded.progress.is_unlocked("first_flight"));
    assert!(reloaded.progress.is_unlocked("score_10"));
    assert!(!reloaded.progress.is_unlocked("score_50"));
}

#[test]
fn settings_persist_between_sessions() {
    let mut game = new_game(MemoryStore::new(), 1);
    game.apply_settings(Settings {
        difficulty: Difficulty::Hard,
        powerups_enabled: false,
        sound_enabled: false,
        god_mode: false,
    });

    let reloaded = new_game(game.into_store(), 2);
    assert_eq!(reloaded.settings.difficulty, Difficulty::Hard);
    assert!(!reloaded.settings.powerups_enabled);
    assert!(!reloaded.settings.sound_enabled);
}

#[test]
fn corrupt_storage_falls_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.set(keys::STATS, "{not json").unwrap();
    store.set(keys::LEADERBOARD, "[1, 2").unwrap();
    store.set(keys::ACHIEVEMENTS, "null").unwrap();
    store.set(keys::DIFFICULTY, "impossible").unwrap();

    let game = new_game(store, 3);
    assert_eq!(game.stats.games_played, 0);
    assert!(game.highscores.is_empty());
    assert_eq!(game.progress.summary().unlocked, 0);
    assert_eq!(game.settings.difficulty, Difficulty::Normal);
}

#[test]
fn same_seed_same_run() {
    let mut a = new_game(MemoryStore::new(), 99);
    let mut b = new_game(MemoryStore::new(), 99);
    for game in [&mut a, &mut b] {
        game.autopilot = true;
        game.start_run();
    }

    for i in 0..600 {
        let now = i as f64 * 16.0;
        if i % 37 == 0 {
            a.handle(InputAction::Flap);
            b.handle(InputAction::Flap);
        }
        assert_eq!(a.frame(16.0, now), b.frame(16.0, now));
    }

    assert_eq!(a.state.score, b.state.score);
    assert_eq!(a.state.bat.pos, b.state.bat.pos);
    let gaps = |g: &Game<MemoryStore>| -> Vec<f32> {
        g.state.obstacles.obstacles.iter().map(|o| o.gap_y).collect()
    };
    assert_eq!(gaps(&a), gaps(&b));
}

#[test]
fn consecutive_days_accumulate_across_sessions() {
    let mut store = MemoryStore::new();
    for day in 0..5 {
        let mut game = new_game(store, day);
        game.start_run();
        play_out(&mut game, (100 + day) as f64 * DAY_MS, 5000);
        assert_eq!(game.phase(), GamePhase::GameOver);
        store = game.into_store();
    }

    let game = new_game(store, 0);
    assert_eq!(game.stats.games_played, 5);
    assert_eq!(game.stats.consecutive_days, 5);
    assert!(game.progress.is_unlocked("daily_player"));
}

#[test]
fn restart_from_results_screen() {
    let mut game = new_game(MemoryStore::new(), 5);
    game.start_run();
    play_out(&mut game, 0.0, 5000);
    assert_eq!(game.phase(), GamePhase::GameOver);
    assert!(game.last_result().is_some());

    // Flap does nothing on the results screen; Start begins a fresh run
    game.handle(InputAction::Flap);
    game.frame(16.0, 100_000.0);
    assert_eq!(game.phase(), GamePhase::GameOver);

    game.handle(InputAction::Start);
    let events = game.frame(16.0, 100_016.0);
    assert!(events.contains(&GameEvent::RunStarted));
    assert_eq!(game.phase(), GamePhase::Playing);
    assert_eq!(game.state.score, 0);
    assert!(game.last_result().is_none());
}
