//! Scene rendering: one function per component, composed by [`render_frame`]
//!
//! Everything here is cosmetic. Hit boxes live in the simulation; the shapes
//! drawn stay inside them closely enough to look fair.

use glam::Vec2;

use super::shapes;
use super::{Color, Surface, TextAlign};
use crate::consts::GROUND_HEIGHT;
use crate::game::Game;
use crate::persistence::KeyValueStore;
use crate::sim::{
    Archetype, Bat, CaveTheme, Celebrations, EffectKind, GamePhase, GameState, Obstacle, PowerUp,
    PowerUpKind, Rect,
};

/// Colours of one cave theme
#[derive(Debug, Clone, Copy)]
pub struct ThemePalette {
    /// Gradient stops at 0, 0.3, 0.7 and 1 of the height
    pub gradient: [Color; 4],
    /// Distant bat silhouettes
    pub silhouettes: Color,
}

pub fn theme_palette(theme: CaveTheme) -> ThemePalette {
    let (stops, silhouettes) = match theme {
        CaveTheme::Deep => (
            [0x1A1A2E, 0x16213E, 0x0F3460, 0x0A1F3B],
            Color::rgba(0.31, 0.31, 0.31, 0.4),
        ),
        CaveTheme::Crystal => (
            [0x2D1B69, 0x11998E, 0x38EF7D, 0x0F4C75],
            Color::rgba(0.39, 0.78, 1.0, 0.3),
        ),
        CaveTheme::Fire => (
            [0x3C1053, 0xAD5389, 0xFF6B6B, 0xEE5A24],
            Color::rgba(1.0, 0.39, 0.39, 0.4),
        ),
        CaveTheme::Ice => (
            [0x667EEA, 0x764BA2, 0xA8EDEA, 0xFED6E3],
            Color::rgba(0.59, 0.78, 1.0, 0.5),
        ),
        CaveTheme::Mystic => (
            [0x2C3E50, 0x4A00E0, 0x8E2DE2, 0x74B9FF],
            Color::rgba(0.71, 0.47, 1.0, 0.4),
        ),
    };
    ThemePalette {
        gradient: stops.map(Color::hex),
        silhouettes,
    }
}

const GROUND: Color = Color::hex(0x2D1B1B);
const GROUND_STONE: Color = Color::hex(0x3D2B2B);
const CAVE_SPIKE: Color = Color::hex(0x4A4A4A);
const ROCK_EDGE: Color = Color::hex(0x2F2F2F);
const SHIELD_BLUE: Color = Color::hex(0x00BFFF);
const SHIELD_PALE: Color = Color::hex(0x87CEEB);
const EYE_RED: Color = Color::hex(0xFF4444);

/// Themed gradient, drifting bat silhouettes, ceiling and floor spikes, ground
pub fn render_background<S: Surface + ?Sized>(surface: &mut S, theme: CaveTheme, time_ms: f64) {
    let size = surface.size();
    let palette = theme_palette(theme);
    let stops = [
        (0.0, palette.gradient[0]),
        (0.3, palette.gradient[1]),
        (0.7, palette.gradient[2]),
        (1.0, palette.gradient[3]),
    ];
    surface.fill_vertical_gradient(Rect::new(0.0, 0.0, size.x, size.y), &stops);

    // Distant bats drift left slowly
    let wrap = size.x + 60.0;
    for i in 0..5 {
        let span = 14.0 + (i % 3) as f32 * 6.0;
        let start = i as f32 * 137.0;
        let x = (start - (time_ms * 0.02) as f32 * (1.0 + i as f32 * 0.2)).rem_euclid(wrap) - 30.0;
        let y = 60.0 + (i as f32 * 53.0) % (size.y * 0.4).max(1.0);
        surface.save();
        surface.translate(Vec2::new(x, y));
        surface.fill_polygon(&shapes::bat_silhouette(span), palette.silhouettes);
        surface.restore();
    }

    let floor = size.y - GROUND_HEIGHT;
    let mut x = 50.0;
    while x < size.x {
        let length = 15.0 + (x * 0.05).sin() * 10.0;
        surface.fill_polygon(&shapes::spike(x, 0.0, 8.0, length), CAVE_SPIKE);
        x += 80.0;
    }
    let mut x = 80.0;
    while x < size.x {
        let length = 12.0 + (x * 0.07).sin() * 8.0;
        surface.fill_polygon(&shapes::spike(x, floor, 6.0, -length), CAVE_SPIKE);
        x += 90.0;
    }

    surface.fill_rect(Rect::new(0.0, floor, size.x, GROUND_HEIGHT), GROUND);
    let mut x = 0.0;
    while x < size.x {
        let stone = 8.0 + (x * 0.1).sin() * 4.0;
        surface.fill_rect(Rect::new(x, floor + 4.0, stone, 8.0), GROUND_STONE);
        surface.fill_rect(Rect::new(x + 15.0, floor + 9.0, stone * 0.7, 6.0), GROUND_STONE);
        x += 30.0;
    }
}

fn rock_color(archetype: Archetype) -> Color {
    match archetype {
        Archetype::Normal | Archetype::Moving => Color::hex(0x5A5A5A),
        Archetype::Narrow => Color::hex(0x8B4513),
        Archetype::Wide => Color::hex(0x696969),
        Archetype::Rotating => Color::hex(0x4A4A4A),
    }
}

/// Stalactite above the gap, stalagmite below it, plus archetype accents
pub fn render_obstacle<S: Surface + ?Sized>(
    surface: &mut S,
    obstacle: &Obstacle,
    playfield_height: f32,
) {
    let color = rock_color(obstacle.archetype);
    let floor = playfield_height - GROUND_HEIGHT;
    let top = obstacle.top_height();
    let bottom = obstacle.bottom_y();

    surface.save();
    if obstacle.archetype == Archetype::Rotating {
        let pivot = Vec2::new(obstacle.center_x(), obstacle.gap_y);
        surface.translate(pivot);
        surface.rotate(obstacle.angle());
        surface.translate(-pivot);
    }

    render_rock(surface, obstacle.x, 0.0, obstacle.width, top, true, color);
    render_rock(surface, obstacle.x, bottom, obstacle.width, floor - bottom, false, color);

    let band = |y: f32, h: f32| Rect::new(obstacle.x - 5.0, y, obstacle.width + 10.0, h);
    match obstacle.archetype {
        Archetype::Moving => {
            let center = Vec2::new(obstacle.right() + 5.0, obstacle.gap_y);
            let arrow = shapes::arrow(center, 5.0, obstacle.direction() > 0.0);
            surface.fill_polygon(&arrow, Color::hex(0xFFD700));
        }
        Archetype::Narrow => {
            let pulse = 0.7 + (obstacle.anim_phase * 5.0).sin() * 0.3;
            let warning = Color::hex(0xFF0000).with_alpha(pulse);
            surface.fill_rect(band(top, 5.0), warning);
            surface.fill_rect(band(bottom - 5.0, 5.0), warning);
        }
        Archetype::Wide => {
            let calm = Color::hex(0x00FF00).with_alpha(0.5);
            surface.fill_rect(band(top, 3.0), calm);
            surface.fill_rect(band(bottom - 3.0, 3.0), calm);
        }
        Archetype::Rotating => {
            surface.fill_rect(band(0.0, playfield_height), color.with_alpha(0.3));
        }
        Archetype::Normal => {}
    }
    surface.restore();
}

fn render_rock<S: Surface + ?Sized>(
    surface: &mut S,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    hanging: bool,
    color: Color,
) {
    let outline = shapes::rock_outline(x, y, width, height, hanging);
    if outline.is_empty() {
        return;
    }
    surface.fill_polygon(&outline, color);
    let mut edge = outline.clone();
    edge.push(outline[0]);
    surface.stroke_polyline(&edge, 2.0, ROCK_EDGE);

    // Strata
    let strata = Color::BLACK.with_alpha(0.2);
    let mut layer = y + 20.0;
    while layer < y + height - 20.0 {
        surface.fill_rect(Rect::new(x + 5.0, layer, width - 10.0, 3.0), strata);
        layer += 25.0;
    }
}

pub fn powerup_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::Shield => Color::hex(0x00BFFF),
        PowerUpKind::TimeWarp => Color::hex(0x9370DB),
        PowerUpKind::ScoreMultiplier => Color::hex(0x32CD32),
        PowerUpKind::Shrink => Color::hex(0xFF69B4),
        PowerUpKind::LifeBonus => Color::hex(0xFFD700),
        PowerUpKind::Magnet => Color::hex(0xFFA500),
    }
}

/// Floating orb with a per-kind icon
pub fn render_powerup<S: Surface + ?Sized>(surface: &mut S, powerup: &PowerUp) {
    let color = powerup_color(powerup.kind);
    let pulse = 1.0 + (powerup.anim_phase * 2.0).sin() * 0.1;
    let radius = powerup.size / 2.0 * pulse;

    surface.save();
    surface.translate(powerup.center() + Vec2::new(0.0, powerup.float_offset()));
    surface.rotate((powerup.anim_phase * 0.5).sin() * 0.3);

    surface.fill_circle(Vec2::ZERO, radius + 4.0, color.with_alpha(0.25));
    surface.fill_circle(Vec2::ZERO, radius, color.with_alpha(0.8));
    surface.fill_circle(Vec2::ZERO, radius * 2.0 / 3.0, Color::WHITE.with_alpha(0.3));
    render_icon(surface, powerup.kind);

    surface.restore();
}

fn render_icon<S: Surface + ?Sized>(surface: &mut S, kind: PowerUpKind) {
    match kind {
        PowerUpKind::Shield => {
            let badge = shapes::shield_icon();
            surface.fill_polygon(&badge, Color::WHITE);
            let mut edge = badge.to_vec();
            edge.push(badge[0]);
            surface.stroke_polyline(&edge, 1.0, Color::BLACK);
        }
        PowerUpKind::TimeWarp => {
            surface.fill_circle(Vec2::ZERO, 6.0, Color::WHITE);
            surface.stroke_circle(Vec2::ZERO, 6.0, 1.0, Color::BLACK);
            let hands = [Vec2::new(0.0, -4.0), Vec2::ZERO, Vec2::new(3.0, 0.0)];
            surface.stroke_polyline(&hands, 1.0, Color::BLACK);
        }
        PowerUpKind::ScoreMultiplier => {
            surface.fill_circle(Vec2::ZERO, 6.0, Color::WHITE);
            surface.stroke_circle(Vec2::ZERO, 6.0, 1.0, Color::BLACK);
            surface.fill_text("2x", Vec2::new(0.0, 3.0), 8.0, TextAlign::Center, Color::BLACK);
        }
        PowerUpKind::Shrink => {
            surface.fill_ellipse(Vec2::ZERO, Vec2::new(4.0, 3.0), Color::WHITE);
            surface.fill_circle(Vec2::new(2.0, -1.0), 1.0, Color::BLACK);
        }
        PowerUpKind::LifeBonus => {
            surface.fill_polygon(&shapes::heart_icon(), Color::hex(0xFF0000));
        }
        PowerUpKind::Magnet => {
            surface.fill_rect(Rect::new(-4.0, -6.0, 3.0, 8.0), Color::hex(0xFF0000));
            surface.fill_rect(Rect::new(1.0, -6.0, 3.0, 8.0), Color::hex(0x0000FF));
            surface.fill_rect(Rect::new(-1.0, -6.0, 2.0, 8.0), Color::WHITE);
        }
    }
}

/// Body, wing and vein colours for the bat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatColors {
    pub body: Color,
    pub wing: Color,
    pub vein: Color,
}

/// Colour scheme picked by the highest-priority active effect
pub fn bat_colors(effect: Option<EffectKind>) -> BatColors {
    let [body, wing, vein] = match effect {
        None => [0x2C1810, 0x1A0F08, 0x8B4513],
        Some(EffectKind::Shield) => [0x1E3A8A, 0x1E40AF, 0x3B82F6],
        Some(EffectKind::Invulnerable) => [0xFFD700, 0xFFA500, 0xFF8C00],
        Some(EffectKind::ScoreMultiplier) => [0x166534, 0x15803D, 0x22C55E],
        Some(EffectKind::Shrink) => [0xBE185D, 0xE11D48, 0xF472B6],
        Some(EffectKind::Magnet) => [0xC2410C, 0xEA580C, 0xFB923C],
    };
    BatColors {
        body: Color::hex(body),
        wing: Color::hex(wing),
        vein: Color::hex(vein),
    }
}

pub fn effect_color(kind: EffectKind) -> Color {
    match kind {
        EffectKind::Shield => Color::hex(0x00BFFF),
        EffectKind::Invulnerable => Color::hex(0xFFD700),
        EffectKind::ScoreMultiplier => Color::hex(0x32CD32),
        EffectKind::Shrink => Color::hex(0xFF69B4),
        EffectKind::Magnet => Color::hex(0xFFA500),
    }
}

/// Full duration of the power-up that grants `kind`
fn full_duration_ms(kind: EffectKind) -> f32 {
    PowerUpKind::ALL
        .iter()
        .find(|p| p.effect() == Some(kind))
        .map_or(1.0, |p| p.duration_ms())
}

/// Trail, then the tilted bat with shield ring and glow, then effect timers
pub fn render_bat<S: Surface + ?Sized>(surface: &mut S, bat: &Bat, time_ms: f64) {
    for particle in &bat.trail {
        let fade = particle.fade();
        surface.fill_circle(particle.pos, 2.0 * fade, Color::hex(particle.color).with_alpha(fade));
    }

    let colors = bat_colors(bat.dominant_effect());
    let size = Vec2::new(bat.width, bat.height);
    let (w, h) = (bat.width, bat.height);

    surface.save();
    surface.translate(bat.center());
    surface.rotate(bat.rotation);

    if bat.has_shield() {
        let radius = w.max(h) / 2.0 + 8.0;
        let pulse = 0.7 + ((time_ms * 0.01).sin() as f32) * 0.3;
        surface.stroke_circle(Vec2::ZERO, radius, 3.0, SHIELD_BLUE.with_alpha(pulse));
        surface.stroke_circle(Vec2::ZERO, radius + 2.0, 1.0, SHIELD_PALE.with_alpha(0.5));
    }

    if bat.is_invulnerable() || bat.effects.is_active(EffectKind::ScoreMultiplier) {
        surface.fill_ellipse(Vec2::ZERO, size / 2.0 + 8.0, colors.body.with_alpha(0.4));
    }

    let flap = bat.flap_phase.sin();
    let lift = flap * 0.5 + 0.5;
    let spread = flap * 8.0;

    surface.fill_ellipse(Vec2::new(0.0, 2.0), Vec2::new(w / 2.5, h / 3.0), colors.body);
    for side in [-1.0, 1.0] {
        surface.fill_polygon(&shapes::wing(size, side, spread, lift), colors.wing);
        let veins = [
            Vec2::new(side * (w / 2.5 + spread * 0.7), -h / 4.0 - lift * 3.0),
            Vec2::new(side * w / 5.0, -2.0),
            Vec2::new(side * w / 6.0, 2.0),
            Vec2::new(side * (w / 3.0 + spread * 0.7), h / 6.0 + lift * 2.0),
        ];
        surface.stroke_polyline(&veins, 1.0, colors.vein);
    }

    surface.fill_ellipse(Vec2::new(0.0, -h / 4.0), Vec2::new(w / 4.0, h / 4.0), colors.body);
    for side in [-1.0, 1.0] {
        surface.fill_polygon(&shapes::ear(size, side), colors.wing);
        surface.fill_circle(Vec2::new(side * 4.0, -h / 3.5), 2.0, EYE_RED);
        surface.fill_circle(Vec2::new(side * 4.0 + 1.0, -h / 3.2), 0.8, Color::WHITE);
    }

    surface.restore();

    render_effect_timers(surface, bat);
}

/// One bar per active effect, right of the bat, showing time left
pub fn render_effect_timers<S: Surface + ?Sized>(surface: &mut S, bat: &Bat) {
    for (i, (kind, remaining)) in bat.effects.iter_active().enumerate() {
        let x = bat.pos.x + bat.width + 10.0;
        let y = bat.pos.y + i as f32 * 15.0;
        let fraction = (remaining / full_duration_ms(kind)).clamp(0.0, 1.0);
        surface.fill_rect(Rect::new(x, y, 30.0, 6.0), Color::BLACK.with_alpha(0.5));
        surface.fill_rect(Rect::new(x, y, 30.0 * fraction, 6.0), effect_color(kind));
    }
}

/// Firework sparks and expanding shield-break rings
pub fn render_celebrations<S: Surface + ?Sized>(surface: &mut S, celebrations: &Celebrations) {
    for spark in &celebrations.particles {
        let fade = spark.fade();
        let color = Color::hex(spark.color).with_alpha(fade);
        surface.fill_circle(spark.pos, spark.size * fade.max(0.3), color);
    }
    for ring in &celebrations.shield_breaks {
        let fade = (ring.life / 30.0).clamp(0.0, 1.0);
        surface.stroke_circle(ring.center, ring.radius, 3.0, SHIELD_BLUE.with_alpha(fade));
    }
}

/// Everything in the cave: background, rocks, power-ups, bat, fireworks
pub fn render_world<S: Surface + ?Sized>(surface: &mut S, state: &GameState) {
    render_background(surface, state.theme(), state.clock_ms);

    if state.phase != GamePhase::Menu {
        for obstacle in &state.obstacles.obstacles {
            render_obstacle(surface, obstacle, state.field.height);
        }
        if state.powerups.enabled {
            for powerup in &state.powerups.items {
                render_powerup(surface, powerup);
            }
        }
    }
    render_bat(surface, &state.bat, state.clock_ms);
    render_celebrations(surface, &state.celebrations);
}

/// Score and current cave while a run is on screen
pub fn render_hud<S: Surface + ?Sized>(surface: &mut S, state: &GameState, best: u32) {
    let size = surface.size();
    surface.fill_text(
        &state.score.to_string(),
        Vec2::new(size.x / 2.0, 60.0),
        40.0,
        TextAlign::Center,
        Color::WHITE,
    );
    surface.fill_text(
        &format!("Best {}", best.max(state.score)),
        Vec2::new(size.x - 12.0, 28.0),
        16.0,
        TextAlign::Right,
        Color::WHITE.with_alpha(0.8),
    );
    surface.fill_text(
        state.theme().name(),
        Vec2::new(12.0, 28.0),
        16.0,
        TextAlign::Left,
        Color::WHITE.with_alpha(0.8),
    );
}

fn dim<S: Surface + ?Sized>(surface: &mut S, alpha: f32) {
    let size = surface.size();
    surface.fill_rect(Rect::new(0.0, 0.0, size.x, size.y), Color::BLACK.with_alpha(alpha));
}

pub fn render_pause<S: Surface + ?Sized>(surface: &mut S) {
    let center = surface.size() / 2.0;
    dim(surface, 0.5);
    surface.fill_text("PAUSED", center, 32.0, TextAlign::Center, Color::WHITE);
    surface.fill_text(
        "Press P or tap to continue",
        center + Vec2::new(0.0, 40.0),
        16.0,
        TextAlign::Center,
        Color::WHITE,
    );
}

/// Title screen
pub fn render_menu<S: Surface + ?Sized, K: KeyValueStore>(surface: &mut S, game: &Game<K>) {
    let center = surface.size() / 2.0;
    let progress = game.progress.summary();
    let lines = [
        (format!("Difficulty: {}", game.settings.difficulty.label()), 18.0),
        (format!("Best: {}", game.highscores.best), 18.0),
        (format!("Achievements: {}/{}", progress.unlocked, progress.total), 16.0),
        ("Press ENTER or tap to start".to_string(), 16.0),
    ];

    dim(surface, 0.3);
    surface.fill_text(
        "CAVE FLAP",
        center - Vec2::new(0.0, 80.0),
        44.0,
        TextAlign::Center,
        Color::WHITE,
    );
    for (i, (text, px)) in lines.iter().enumerate() {
        let pos = center + Vec2::new(0.0, i as f32 * 30.0);
        surface.fill_text(text, pos, *px, TextAlign::Center, Color::WHITE);
    }
}

/// Results after a fatal hit, or after the finale reveal
pub fn render_results<S: Surface + ?Sized, K: KeyValueStore>(surface: &mut S, game: &Game<K>) {
    let Some(result) = game.last_result() else {
        return;
    };
    let center = surface.size() / 2.0;
    let title = if result.summary.reached_finale {
        "LEGEND OF THE CAVE"
    } else {
        "GAME OVER"
    };

    let mut lines = vec![
        format!("Score: {}", result.summary.score),
        format!("Best: {}", game.highscores.best),
        format!("Obstacles: {}", result.summary.obstacles_passed),
    ];
    if result.new_best {
        lines.push("New best!".to_string());
    }
    if let Some(rank) = result.rank {
        lines.push(format!("#{} on the leaderboard", rank));
    }
    if !result.unlocked.is_empty() {
        lines.push(format!("{} achievement(s) unlocked", result.unlocked.len()));
    }
    lines.push("Press ENTER or tap to fly again".to_string());

    dim(surface, 0.55);
    surface.fill_text(title, center - Vec2::new(0.0, 100.0), 36.0, TextAlign::Center, Color::WHITE);
    for (i, line) in lines.iter().enumerate() {
        let pos = center + Vec2::new(0.0, i as f32 * 28.0 - 40.0);
        surface.fill_text(line, pos, 18.0, TextAlign::Center, Color::WHITE);
    }
}

/// Achievement toast at the top of the screen
pub fn render_notification<S: Surface + ?Sized, K: KeyValueStore>(surface: &mut S, game: &Game<K>) {
    let Some(notification) = game.notification() else {
        return;
    };
    let width = surface.size().x;
    let achievement = notification.achievement;

    let panel = Rect::new(width * 0.1, 90.0, width * 0.8, 56.0);
    surface.fill_rect(panel, Color::BLACK.with_alpha(0.7));
    surface.fill_text(
        &format!("{} achievement: {}", achievement.rarity.label(), achievement.title),
        Vec2::new(width / 2.0, 112.0),
        16.0,
        TextAlign::Center,
        Color::hex(0xFFD700),
    );
    surface.fill_text(
        achievement.description,
        Vec2::new(width / 2.0, 134.0),
        13.0,
        TextAlign::Center,
        Color::WHITE,
    );
}

/// Draw one complete frame for the current phase
pub fn render_frame<S: Surface + ?Sized, K: KeyValueStore>(surface: &mut S, game: &Game<K>) {
    let state = &game.state;
    render_world(surface, state);

    match state.phase {
        GamePhase::Menu => render_menu(surface, game),
        GamePhase::Playing => render_hud(surface, state, game.highscores.best),
        GamePhase::Paused => {
            render_hud(surface, state, game.highscores.best);
            render_pause(surface);
        }
        GamePhase::GameOver => render_results(surface, game),
        GamePhase::Finale => {
            if game.finale_revealed() {
                render_results(surface, game);
            } else {
                render_hud(surface, state, game.highscores.best);
            }
        }
    }

    render_notification(surface, game);
}
