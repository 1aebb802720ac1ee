//! Score milestones, cave themes, fireworks and the deferred-work queue
//!
//! Bursts that are staggered in time never use timers. They are queued in
//! the [`Scheduler`] against the simulation clock and drained once per tick.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Playfield;
use crate::consts::*;

const FIREWORK_GRAVITY: f32 = 0.1;
const MAX_FIREWORK_PARTICLES: usize = 1500;

/// Firework palette (0xRRGGBB)
pub const FIREWORK_COLORS: [u32; 7] = [
    0xFF_D700, 0xFF_4500, 0x00_FF7F, 0x1E_90FF, 0xFF_69B4, 0x9B_30FF, 0xFF_FFFF,
];

const CENTURY_BURSTS: usize = 8;
const CENTURY_BURST_INTERVAL_MS: f64 = 150.0;
const CENTURY_BIG_BURSTS: usize = 5;
const CENTURY_BIG_BURST_START_MS: f64 = 500.0;
const CENTURY_BIG_BURST_INTERVAL_MS: f64 = 300.0;
const CENTURY_END_MS: f64 = 4000.0;

const FINALE_BURSTS: usize = 20;
const FINALE_BURST_INTERVAL_MS: f64 = 100.0;
const FINALE_REVEAL_MS: f64 = 2000.0;
const FINALE_END_MS: f64 = 5000.0;

/// Cave background themes, cycled every `THEME_STEP` points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaveTheme {
    #[default]
    Deep,
    Crystal,
    Fire,
    Ice,
    Mystic,
}

impl CaveTheme {
    pub const ALL: [CaveTheme; 5] = [
        CaveTheme::Deep,
        CaveTheme::Crystal,
        CaveTheme::Fire,
        CaveTheme::Ice,
        CaveTheme::Mystic,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::from_index(index + 1)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CaveTheme::Deep => "Deep Cave",
            CaveTheme::Crystal => "Crystal Cave",
            CaveTheme::Fire => "Fire Cave",
            CaveTheme::Ice => "Ice Cave",
            CaveTheme::Mystic => "Mystic Cave",
        }
    }
}

/// The multiple of `step` crossed by going from `old` to `new`, if any
pub fn crossed_multiple(old: u32, new: u32, step: u32) -> Option<u32> {
    if step == 0 || new / step <= old / step {
        None
    } else {
        Some(new / step * step)
    }
}

/// Deferred celebration work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledKind {
    CenturyBurst,
    CenturyBigBurst,
    CenturyEnd,
    FinaleBurst,
    FinaleReveal,
    FinaleEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scheduled {
    /// Simulation time the entry becomes due
    pub due_ms: f64,
    /// Run the entry was queued in
    pub generation: u64,
    pub kind: ScheduledKind,
}

/// Queue of deferred work, drained once per tick
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: Vec<Scheduled>,
    generation: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, kind: ScheduledKind) {
        self.queue.push(Scheduled {
            due_ms: now_ms + delay_ms.max(0.0),
            generation: self.generation,
            kind,
        });
    }

    /// Remove and return every current-run entry due at `now_ms`, oldest first
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<ScheduledKind> {
        let generation = self.generation;
        let (mut due, pending): (Vec<Scheduled>, Vec<Scheduled>) = self
            .queue
            .drain(..)
            .filter(|s| s.generation == generation)
            .partition(|s| s.due_ms <= now_ms);
        self.queue = pending;
        // Stable, so equal due times keep queue order
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due.into_iter().map(|s| s.kind).collect()
    }

    /// Drop everything queued and start a new generation
    pub fn reset(&mut self) {
        self.queue.clear();
        self.generation += 1;
    }
}

/// Queue the century show: quick bursts, then big ones, then the end marker
pub fn schedule_century(scheduler: &mut Scheduler, now_ms: f64) {
    for i in 0..CENTURY_BURSTS {
        scheduler.schedule(
            now_ms,
            i as f64 * CENTURY_BURST_INTERVAL_MS,
            ScheduledKind::CenturyBurst,
        );
    }
    for i in 0..CENTURY_BIG_BURSTS {
        scheduler.schedule(
            now_ms,
            CENTURY_BIG_BURST_START_MS + i as f64 * CENTURY_BIG_BURST_INTERVAL_MS,
            ScheduledKind::CenturyBigBurst,
        );
    }
    scheduler.schedule(now_ms, CENTURY_END_MS, ScheduledKind::CenturyEnd);
}

/// Queue the god mode finale
pub fn schedule_finale(scheduler: &mut Scheduler, now_ms: f64) {
    for i in 0..FINALE_BURSTS {
        scheduler.schedule(
            now_ms,
            i as f64 * FINALE_BURST_INTERVAL_MS,
            ScheduledKind::FinaleBurst,
        );
    }
    scheduler.schedule(now_ms, FINALE_REVEAL_MS, ScheduledKind::FinaleReveal);
    scheduler.schedule(now_ms, FINALE_END_MS, ScheduledKind::FinaleEnd);
}

/// A single firework spark (lifetimes in 16 ms frames)
#[derive(Debug, Clone)]
pub struct Firework {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub color: u32,
}

impl Firework {
    pub fn fade(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Expanding ring left behind when the shield breaks
#[derive(Debug, Clone, Copy)]
pub struct ShieldBreak {
    pub center: Vec2,
    pub radius: f32,
    pub life: f32,
}

/// Milestones reached by one score increment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Milestones {
    pub theme: Option<CaveTheme>,
    pub century: Option<u32>,
}

/// Celebration and theme state for the current run
#[derive(Debug, Clone, Default)]
pub struct Celebrations {
    pub theme: CaveTheme,
    /// Highest century already celebrated
    pub last_celebrated: u32,
    pub fireworks_active: bool,
    pub particles: Vec<Firework>,
    pub shield_breaks: Vec<ShieldBreak>,
}

impl Celebrations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Edge-detect theme and century milestones for `old -> new`
    pub fn on_score(&mut self, old: u32, new: u32) -> Milestones {
        let mut milestones = Milestones::default();

        if crossed_multiple(old, new, THEME_STEP).is_some() {
            self.theme = self.theme.next();
            milestones.theme = Some(self.theme);
        }

        let century =
            crossed_multiple(old, new, CENTURY_STEP).filter(|c| *c > self.last_celebrated);
        if let Some(century) = century {
            self.last_celebrated = century;
            self.fireworks_active = true;
            milestones.century = Some(century);
        }

        milestones
    }

    /// Run a due visual entry
    pub fn fire<R: Rng>(&mut self, kind: ScheduledKind, field: Playfield, rng: &mut R) {
        match kind {
            ScheduledKind::CenturyBurst => {
                let origin = Vec2::new(
                    field.width * (0.2 + rng.random::<f32>() * 0.6),
                    field.height * (0.15 + rng.random::<f32>() * 0.35),
                );
                self.burst(origin, 30, 6.0, rng);
            }
            ScheduledKind::CenturyBigBurst => {
                let origin = Vec2::new(
                    field.width * (0.25 + rng.random::<f32>() * 0.5),
                    field.height * (0.2 + rng.random::<f32>() * 0.3),
                );
                // Three concentric rings
                for ring in 1..=3 {
                    self.ring(origin, 24, 3.0 * ring as f32, rng);
                }
            }
            ScheduledKind::FinaleBurst => {
                self.fireworks_active = true;
                let origin = Vec2::new(
                    rng.random::<f32>() * field.width,
                    rng.random::<f32>() * field.height * 0.6,
                );
                self.burst(origin, 60, 10.0, rng);
                self.ring(origin, 36, 7.0, rng);
            }
            ScheduledKind::CenturyEnd | ScheduledKind::FinaleEnd => {
                self.fireworks_active = false;
            }
            ScheduledKind::FinaleReveal => {}
        }
    }

    /// Random scatter of sparks
    pub fn burst<R: Rng>(&mut self, origin: Vec2, count: usize, speed: f32, rng: &mut R) {
        for _ in 0..count {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let magnitude = speed * (0.3 + rng.random::<f32>() * 0.7);
            let max_life = 40.0 + rng.random::<f32>() * 40.0;
            self.push(Firework {
                pos: origin,
                vel: Vec2::from_angle(angle) * magnitude,
                life: max_life,
                max_life,
                size: 2.0 + rng.random::<f32>() * 2.0,
                color: FIREWORK_COLORS[rng.random_range(0..FIREWORK_COLORS.len())],
            });
        }
    }

    /// Evenly spaced sparks on a circle
    pub fn ring<R: Rng>(&mut self, origin: Vec2, count: usize, speed: f32, rng: &mut R) {
        let color = FIREWORK_COLORS[rng.random_range(0..FIREWORK_COLORS.len())];
        for i in 0..count {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            self.push(Firework {
                pos: origin,
                vel: Vec2::from_angle(angle) * speed,
                life: 60.0,
                max_life: 60.0,
                size: 3.0,
                color,
            });
        }
    }

    /// Shield absorbed a hit: a ring of 8 and 15 sparks
    pub fn shield_break<R: Rng>(&mut self, center: Vec2, rng: &mut R) {
        self.shield_breaks.push(ShieldBreak {
            center,
            radius: 20.0,
            life: 30.0,
        });
        for i in 0..8 {
            let angle = i as f32 / 8.0 * std::f32::consts::TAU;
            self.push(Firework {
                pos: center,
                vel: Vec2::from_angle(angle) * 4.0,
                life: 25.0,
                max_life: 25.0,
                size: 3.0,
                color: crate::sim::actor::SHIELD_PARTICLE_COLOR,
            });
        }
        for _ in 0..15 {
            let vel = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5) * 8.0;
            let max_life = 15.0 + rng.random::<f32>() * 15.0;
            self.push(Firework {
                pos: center,
                vel,
                life: max_life,
                max_life,
                size: 1.5,
                color: 0xFF_FFFF,
            });
        }
    }

    fn push(&mut self, particle: Firework) {
        if self.particles.len() < MAX_FIREWORK_PARTICLES {
            self.particles.push(particle);
        }
    }

    pub fn update(&mut self, dt_ms: f32) {
        let frames = dt_ms / FRAME_MS;
        for p in self.particles.iter_mut() {
            p.vel.y += FIREWORK_GRAVITY * frames;
            p.pos += p.vel * frames;
            p.life -= frames;
        }
        self.particles.retain(|p| p.life > 0.0);

        for ring in self.shield_breaks.iter_mut() {
            ring.radius += 2.0 * frames;
            ring.life -= frames;
        }
        self.shield_breaks.retain(|r| r.life > 0.0);
    }
}
