//! Collectible power-ups and their spawn pacing

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::effects::EffectKind;
use super::state::{Playfield, RunConfig};
use crate::consts::*;

/// Power-up variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Shield,
    TimeWarp,
    ScoreMultiplier,
    Shrink,
    LifeBonus,
    Magnet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::Shield,
        PowerUpKind::TimeWarp,
        PowerUpKind::ScoreMultiplier,
        PowerUpKind::Shrink,
        PowerUpKind::LifeBonus,
        PowerUpKind::Magnet,
    ];

    /// Timed effect granted on pickup; `None` for instant kinds
    pub fn effect(&self) -> Option<EffectKind> {
        match self {
            PowerUpKind::Shield => Some(EffectKind::Shield),
            PowerUpKind::TimeWarp => Some(EffectKind::Invulnerable),
            PowerUpKind::ScoreMultiplier => Some(EffectKind::ScoreMultiplier),
            PowerUpKind::Shrink => Some(EffectKind::Shrink),
            PowerUpKind::Magnet => Some(EffectKind::Magnet),
            PowerUpKind::LifeBonus => None,
        }
    }

    pub fn duration_ms(&self) -> f32 {
        match self {
            PowerUpKind::Shield => 8000.0,
            PowerUpKind::TimeWarp => 5000.0,
            PowerUpKind::ScoreMultiplier => 10000.0,
            PowerUpKind::Shrink => 8000.0,
            PowerUpKind::Magnet => 12000.0,
            PowerUpKind::LifeBonus => 0.0,
        }
    }

    /// Relative spawn weight (all weights sum to 1)
    pub fn weight(&self) -> f64 {
        match self {
            PowerUpKind::Shield => 0.25,
            PowerUpKind::TimeWarp => 0.20,
            PowerUpKind::ScoreMultiplier => 0.25,
            PowerUpKind::Shrink => 0.15,
            PowerUpKind::LifeBonus => 0.05,
            PowerUpKind::Magnet => 0.10,
        }
    }

    #[inline]
    pub fn is_instant(&self) -> bool {
        self.effect().is_none()
    }

    /// Weighted choice from a roll in [0, 1)
    pub fn pick(roll: f64) -> PowerUpKind {
        let mut cumulative = 0.0;
        for kind in Self::ALL {
            cumulative += kind.weight();
            if roll < cumulative {
                return kind;
            }
        }
        PowerUpKind::Magnet
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "shield",
            PowerUpKind::TimeWarp => "time_warp",
            PowerUpKind::ScoreMultiplier => "score_multiplier",
            PowerUpKind::Shrink => "shrink",
            PowerUpKind::LifeBonus => "life_bonus",
            PowerUpKind::Magnet => "magnet",
        }
    }
}

/// A floating orb waiting to be collected
#[derive(Debug, Clone)]
pub struct PowerUp {
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
    pub kind: PowerUpKind,
    /// Float/pulse animation phase
    pub anim_phase: f32,
}

impl PowerUp {
    pub fn new(pos: Vec2, kind: PowerUpKind) -> Self {
        Self {
            pos,
            size: POWERUP_SIZE,
            kind,
            anim_phase: 0.0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn update(&mut self, frames: f32) {
        self.pos.x -= POWERUP_DRIFT_SPEED * frames;
        self.anim_phase += 0.1 * frames;
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.size < 0.0
    }

    /// Vertical bob used when drawing (not part of the hit box)
    pub fn float_offset(&self) -> f32 {
        self.anim_phase.sin() * 3.0
    }
}

/// Spawns, moves and hands out power-ups
#[derive(Debug, Clone)]
pub struct PowerUpStream {
    pub items: Vec<PowerUp>,
    pub chance: f64,
    pub enabled: bool,
    /// Virtual distance since the last spawn attempt
    counter: f32,
}

impl Default for PowerUpStream {
    fn default() -> Self {
        Self::new(&RunConfig::default())
    }
}

impl PowerUpStream {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            items: Vec::new(),
            chance: config.powerup_chance,
            enabled: config.powerups_enabled,
            counter: 0.0,
        }
    }

    pub fn reset(&mut self, config: &RunConfig) {
        *self = Self::new(config);
    }

    /// Count one tick of virtual distance.
    ///
    /// Returns true when a spawn attempt is due. The threshold is consumed
    /// by every attempt, so a failed roll waits a full interval.
    pub fn advance_counter(&mut self) -> bool {
        self.counter += POWERUP_COUNTER_RATE;
        if self.counter >= POWERUP_SPAWN_THRESHOLD {
            self.counter = 0.0;
            true
        } else {
            false
        }
    }

    /// Per-tick update: pacing, drift, magnet pull and retirement
    pub fn update<R: Rng>(
        &mut self,
        dt_ms: f32,
        field: Playfield,
        magnet_target: Option<Vec2>,
        rng: &mut R,
    ) {
        if !self.enabled {
            self.items.clear();
            return;
        }

        if self.advance_counter() && rng.random_bool(self.chance.clamp(0.0, 1.0)) {
            self.spawn(field, rng);
        }

        let frames = dt_ms / FRAME_MS;
        for item in self.items.iter_mut() {
            item.update(frames);
        }

        if let Some(target) = magnet_target {
            self.attract(target);
        }

        self.items.retain(|p| !p.is_off_screen());
    }

    pub fn spawn<R: Rng>(&mut self, field: Playfield, rng: &mut R) {
        let span = (field.height - POWERUP_SPAWN_BOTTOM_MARGIN).max(0.0);
        let y = POWERUP_SPAWN_TOP + rng.random::<f32>() * span;
        let kind = PowerUpKind::pick(rng.random::<f64>());
        log::debug!("Spawning {} power-up", kind.as_str());
        self.items.push(PowerUp::new(Vec2::new(field.width, y), kind));
    }

    /// Pull nearby timed power-ups toward `target`
    pub fn attract(&mut self, target: Vec2) {
        for item in self.items.iter_mut().filter(|p| !p.kind.is_instant()) {
            let offset = target - item.center();
            let distance = offset.length();
            if distance <= 0.0 || distance >= MAGNET_RANGE {
                continue;
            }
            let step = (MAGNET_STRENGTH / distance)
                .min(MAGNET_MAX_STEP)
                .min(distance);
            item.pos += offset / distance * step;
        }
    }

    /// Remove and return the first power-up touching `hitbox`
    pub fn take_pickup(&mut self, hitbox: &Rect) -> Option<PowerUpKind> {
        let index = self
            .items
            .iter()
            .position(|p| p.bounds().overlaps(hitbox))?;
        Some(self.items.remove(index).kind)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.counter = 0.0;
    }
}
