//! Per-frame simulation tick
//!
//! Advances the bat and both streams, resolves at most one hazard, then
//! pickups and scoring, then drains due scheduled work.

use super::celebration::ScheduledKind;
use super::collision::{HazardResponse, clamp_to_playfield, resolve_hazard, touches_boundary};
use super::effects::EffectKind;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Discrete actions for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Flap (edge-triggered by the input layer)
    pub flap: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - the bat steers itself toward the next gap
    pub autopilot: bool,
}

/// Advance the game state by `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if input.pause {
        state.toggle_pause();
    }

    if state.phase == GamePhase::Paused {
        return;
    }

    let dt_ms = dt_ms.clamp(0.0, MAX_FRAME_MS);
    state.clock_ms += dt_ms as f64;
    state.celebrations.update(dt_ms);

    if state.phase == GamePhase::Playing {
        let flap = input.flap || (input.autopilot && autopilot_wants_flap(state));
        step_run(state, flap, dt_ms);
    }

    drain_scheduled(state);
}

/// One tick of an active run
fn step_run(state: &mut GameState, flap: bool, dt_ms: f32) {
    if flap {
        state.bat.flap(&mut state.rng);
        state.push_event(GameEvent::Flapped);
    }

    for expired in state.bat.update(dt_ms, &mut state.rng) {
        state.push_event(GameEvent::EffectExpired(expired));
    }

    let field = state.field;
    state.obstacles.update(dt_ms, field, &mut state.rng);

    let magnet_target = state
        .bat
        .effects
        .is_active(EffectKind::Magnet)
        .then(|| state.bat.center());
    state
        .powerups
        .update(dt_ms, field, magnet_target, &mut state.rng);

    // Hazards: obstacles before the cave walls, one resolution per tick
    let hitbox = state.bat.collision_box();
    let hit_obstacle = state.obstacles.collides(&hitbox, field.height);
    let hit_boundary = touches_boundary(state.bat.pos.y, field.height, GROUND_HEIGHT);

    if hit_obstacle || hit_boundary {
        let response = resolve_hazard(&mut state.bat, state.config.god_mode);
        if hit_boundary && !response.ends_run() {
            clamp_to_playfield(&mut state.bat, field.height, GROUND_HEIGHT);
        }
        match response {
            HazardResponse::Fatal => {
                state.end_run();
                return;
            }
            HazardResponse::ShieldAbsorbed => {
                absorb_hit(state);
                return;
            }
            HazardResponse::GodMode | HazardResponse::Invulnerable => {}
        }
    }

    collect_pickup(state);
    score_obstacles(state);
}

fn absorb_hit(state: &mut GameState) {
    let center = state.bat.center();
    state.celebrations.shield_break(center, &mut state.rng);
    if state.run.obstacles_passed < PERFECT_RUN_OBSTACLES {
        state.run.early_hits_absorbed += 1;
    }
    log::debug!("Shield absorbed a hit");
    state.push_event(GameEvent::ShieldAbsorbed);
}

/// At most one pickup per tick
fn collect_pickup(state: &mut GameState) {
    let hitbox = state.bat.collision_box();
    let Some(kind) = state.powerups.take_pickup(&hitbox) else {
        return;
    };

    state.run.powerups_collected += 1;
    state.run.powerup_kinds.insert(kind);
    match kind.effect() {
        Some(effect) => {
            if effect == EffectKind::Shield {
                state.run.shields_collected += 1;
            }
            state
                .bat
                .activate(effect, kind.duration_ms(), &mut state.rng);
        }
        None => state.add_score(LIFE_BONUS_POINTS),
    }
    state.push_event(GameEvent::PowerUpCollected(kind));
}

fn score_obstacles(state: &mut GameState) {
    let multiplier = state.bat.effects.is_active(EffectKind::ScoreMultiplier);
    let passed = state
        .obstacles
        .collect_scores(state.bat.center().x, multiplier);
    for obstacle in passed {
        // The finale stops the run mid-loop
        if state.phase != GamePhase::Playing {
            break;
        }
        state.run.obstacles_passed += 1;
        state.add_score(obstacle.points);
    }
}

fn drain_scheduled(state: &mut GameState) {
    let field = state.field;
    for kind in state.scheduler.drain_due(state.clock_ms) {
        if kind == ScheduledKind::FinaleReveal {
            state.push_event(GameEvent::FinaleReveal);
        }
        state.celebrations.fire(kind, field, &mut state.rng);
    }
}

/// Flap when the bat sinks below the centre of the next gap
fn autopilot_wants_flap(state: &GameState) -> bool {
    let bat = &state.bat;
    let center = bat.center();
    let target = state
        .obstacles
        .obstacles
        .iter()
        .find(|o| o.right() > bat.pos.x)
        .map(|o| o.gap_y)
        .unwrap_or(state.field.height * 0.5);
    center.y > target + 10.0 && bat.velocity > -1.0
}
