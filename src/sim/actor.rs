//! The bat: kinematics, tilt, timed effects and cosmetic trail

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::effects::{ActiveEffects, EffectKind};
use crate::consts::*;

/// Maximum trail particles kept alive at once
pub const MAX_TRAIL_PARTICLES: usize = 160;

/// Shield blue, used for sparkle and shield break particles
pub const SHIELD_PARTICLE_COLOR: u32 = 0x00BF_FF;
const FLAP_PARTICLE_COLOR: u32 = 0xFF_FFFF;

/// A short-lived cosmetic particle (lifetimes in 16 ms frames)
#[derive(Debug, Clone)]
pub struct TrailParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    /// 0xRRGGBB
    pub color: u32,
}

impl TrailParticle {
    /// Remaining life as 0..=1 (used as alpha)
    pub fn fade(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// The player-controlled bat
#[derive(Debug, Clone)]
pub struct Bat {
    /// Top-left corner of the visual box
    pub pos: Vec2,
    /// Vertical velocity in px per 16 ms frame (positive = falling)
    pub velocity: f32,
    /// Tilt in radians, within [-MAX_TILT, MAX_TILT]
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
    pub effects: ActiveEffects,
    /// Wing cycle phase in [0, 2π)
    pub flap_phase: f32,
    pub trail: Vec<TrailParticle>,
    start: Vec2,
}

impl Bat {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            velocity: 0.0,
            rotation: 0.0,
            width: BAT_WIDTH,
            height: BAT_HEIGHT,
            effects: ActiveEffects::new(),
            flap_phase: 0.0,
            trail: Vec::new(),
            start: Vec2::new(x, y),
        }
    }

    /// Starting position for a playfield (horizontal and vertical middle)
    pub fn spawn_point(width: f32, height: f32) -> Vec2 {
        Vec2::new(width * 0.5, height * 0.5)
    }

    /// Advance physics and effect timers by `dt_ms`.
    ///
    /// Returns the effects that ran out during this update.
    pub fn update<R: Rng>(&mut self, dt_ms: f32, rng: &mut R) -> Vec<EffectKind> {
        let frames = dt_ms / FRAME_MS;

        let expired = self.effects.advance(dt_ms);
        if expired.contains(&EffectKind::Shrink) {
            self.restore_size();
        }

        self.velocity = (self.velocity + GRAVITY * frames).min(TERMINAL_VELOCITY);
        self.pos.y += self.velocity * frames;

        self.update_rotation(frames);

        self.flap_phase += WING_FLAP_RATE * frames;
        if self.flap_phase > std::f32::consts::TAU {
            self.flap_phase = 0.0;
        }

        self.update_trail(frames, rng);
        expired
    }

    /// Tilt toward nose-up while rising, nose-down while falling
    fn update_rotation(&mut self, frames: f32) {
        let step = TILT_RATE * frames;
        self.rotation = if self.velocity < 0.0 {
            (self.rotation - step).max(-MAX_TILT)
        } else {
            (self.rotation + step).min(MAX_TILT)
        };
    }

    fn update_trail<R: Rng>(&mut self, frames: f32, rng: &mut R) {
        if self.effects.is_active(EffectKind::Shield) && rng.random::<f32>() < 0.3 {
            let center = self.bounds().center();
            let max_life = 30.0 + rng.random::<f32>() * 20.0;
            self.push_particle(TrailParticle {
                pos: center,
                vel: Vec2::new(-2.0 - rng.random::<f32>() * 2.0, (rng.random::<f32>() - 0.5) * 2.0),
                life: max_life,
                max_life,
                color: SHIELD_PARTICLE_COLOR,
            });
        }

        for particle in self.trail.iter_mut() {
            particle.pos += particle.vel * frames;
            particle.life -= frames;
        }
        self.trail.retain(|p| p.life > 0.0);
    }

    fn push_particle(&mut self, particle: TrailParticle) {
        if self.trail.len() < MAX_TRAIL_PARTICLES {
            self.trail.push(particle);
        }
    }

    /// Radial puff of particles around `origin`
    pub fn burst<R: Rng>(
        &mut self,
        origin: Vec2,
        count: usize,
        speed: f32,
        life: f32,
        color: u32,
        rng: &mut R,
    ) {
        for _ in 0..count {
            let vel = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5) * speed;
            self.push_particle(TrailParticle {
                pos: origin,
                vel,
                life,
                max_life: life,
                color,
            });
        }
    }

    /// Jump: velocity is set, not added
    pub fn flap<R: Rng>(&mut self, rng: &mut R) {
        self.velocity = JUMP_IMPULSE;

        let origin = Vec2::new(self.pos.x + self.width / 2.0, self.pos.y + self.height);
        for _ in 0..3 {
            let life = 20.0 + rng.random::<f32>() * 10.0;
            self.push_particle(TrailParticle {
                pos: origin,
                vel: Vec2::new(-1.0 - rng.random::<f32>() * 2.0, 2.0 + rng.random::<f32>() * 2.0),
                life,
                max_life: life,
                color: FLAP_PARTICLE_COLOR,
            });
        }
    }

    /// Start (or restart) a timed effect
    pub fn activate<R: Rng>(&mut self, kind: EffectKind, duration_ms: f32, rng: &mut R) {
        self.effects.activate(kind, duration_ms);
        match kind {
            EffectKind::Shrink => {
                self.width = BAT_SMALL_WIDTH;
                self.height = BAT_SMALL_HEIGHT;
            }
            EffectKind::Shield => {
                let center = self.bounds().center();
                self.burst(center, 10, 4.0, 30.0, SHIELD_PARTICLE_COLOR, rng);
            }
            EffectKind::Invulnerable | EffectKind::ScoreMultiplier | EffectKind::Magnet => {}
        }
    }

    /// Consume the shield if present. Returns true if a hit was absorbed.
    pub fn consume_shield(&mut self) -> bool {
        self.effects.deactivate(EffectKind::Shield)
    }

    pub fn has_shield(&self) -> bool {
        self.effects.is_active(EffectKind::Shield)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.effects.is_active(EffectKind::Invulnerable)
    }

    /// Visual bounding box
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    /// Hit box: the visual box inset by the same margin at every size
    pub fn collision_box(&self) -> Rect {
        self.bounds().inset(COLLISION_INSET)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// The effect that decides the colour scheme, if any
    pub fn dominant_effect(&self) -> Option<EffectKind> {
        self.effects.iter_active().next().map(|(kind, _)| kind)
    }

    fn restore_size(&mut self) {
        self.width = BAT_WIDTH;
        self.height = BAT_HEIGHT;
    }

    /// Move the start position (playfield resize)
    pub fn set_start(&mut self, start: Vec2) {
        self.start = start;
    }

    /// Prepare for a new run. Active effects carry over.
    pub fn reset(&mut self) {
        self.pos = self.start;
        self.velocity = 0.0;
        self.rotation = 0.0;
        self.flap_phase = 0.0;
        self.trail.clear();
        if !self.effects.is_active(EffectKind::Shrink) {
            self.restore_size();
        }
    }

    /// Drop every effect (on death)
    pub fn clear_effects(&mut self) {
        self.effects.clear();
        self.restore_size();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_one_frame_of_gravity() {
        let mut bat = Bat::new(240.0, 300.0);
        bat.velocity = 5.0;
        bat.update(16.0, &mut rng());
        assert!((bat.velocity - 5.35).abs() < 1e-4);
        assert!((bat.pos.y - 305.35).abs() < 1e-3);
    }

    #[test]
    fn test_flap_sets_impulse() {
        let mut bat = Bat::new(240.0, 300.0);
        bat.velocity = 11.0;
        bat.flap(&mut rng());
        assert_eq!(bat.velocity, JUMP_IMPULSE);
        bat.flap(&mut rng());
        assert_eq!(bat.velocity, JUMP_IMPULSE);
    }

    #[test]
    fn test_rotation_never_overshoots() {
        let mut rng = rng();
        let mut bat = Bat::new(240.0, 300.0);
        for _ in 0..50 {
            bat.update(16.0, &mut rng);
        }
        assert!((bat.rotation - MAX_TILT).abs() < 1e-6);

        bat.flap(&mut rng);
        bat.update(16.0, &mut rng);
        assert!(bat.rotation < MAX_TILT);
        for _ in 0..3 {
            bat.flap(&mut rng);
            for _ in 0..4 {
                bat.update(16.0, &mut rng);
            }
        }
        assert!(bat.rotation >= -MAX_TILT);
    }

    #[test]
    fn test_collision_box_inset_for_every_size() {
        let mut rng = rng();
        let mut bat = Bat::new(100.0, 100.0);
        let normal = bat.collision_box();
        assert!(bat.bounds().strictly_contains(&normal));
        assert_eq!(normal.width, BAT_WIDTH - 2.0 * COLLISION_INSET);

        bat.activate(EffectKind::Shrink, 8000.0, &mut rng);
        let small = bat.collision_box();
        assert!(bat.bounds().strictly_contains(&small));
        assert_eq!(small.x - bat.pos.x, normal.x - 100.0);
        assert_eq!(small.height, BAT_SMALL_HEIGHT - 2.0 * COLLISION_INSET);
    }

    #[test]
    fn test_shrink_expiry_restores_size() {
        let mut rng = rng();
        let mut bat = Bat::new(100.0, 100.0);
        bat.activate(EffectKind::Shrink, 32.0, &mut rng);
        assert_eq!(bat.width, BAT_SMALL_WIDTH);
        bat.update(16.0, &mut rng);
        assert_eq!(bat.width, BAT_SMALL_WIDTH);
        assert_eq!(bat.update(16.0, &mut rng), vec![EffectKind::Shrink]);
        assert_eq!(bat.width, BAT_WIDTH);
        assert_eq!(bat.height, BAT_HEIGHT);
    }

    #[test]
    fn test_shield_consumed_once() {
        let mut bat = Bat::new(100.0, 100.0);
        bat.activate(EffectKind::Shield, 8000.0, &mut rng());
        assert!(bat.consume_shield());
        assert!(!bat.consume_shield());
    }

    #[test]
    fn test_reset_keeps_effects_death_clears_them() {
        let mut rng = rng();
        let mut bat = Bat::new(100.0, 100.0);
        bat.activate(EffectKind::Shrink, 8000.0, &mut rng);
        bat.activate(EffectKind::Magnet, 8000.0, &mut rng);
        bat.pos.y = 420.0;
        bat.velocity = 9.0;

        bat.reset();
        assert_eq!(bat.pos, Vec2::new(100.0, 100.0));
        assert_eq!(bat.velocity, 0.0);
        assert!(bat.effects.is_active(EffectKind::Magnet));
        assert_eq!(bat.width, BAT_SMALL_WIDTH);

        bat.clear_effects();
        assert!(!bat.effects.any_active());
        assert_eq!(bat.width, BAT_WIDTH);
    }

    #[test]
    fn test_dominant_effect_priority() {
        let mut rng = rng();
        let mut bat = Bat::new(0.0, 0.0);
        assert_eq!(bat.dominant_effect(), None);
        bat.activate(EffectKind::Magnet, 1000.0, &mut rng);
        bat.activate(EffectKind::ScoreMultiplier, 1000.0, &mut rng);
        assert_eq!(bat.dominant_effect(), Some(EffectKind::ScoreMultiplier));
        bat.activate(EffectKind::Shield, 1000.0, &mut rng);
        assert_eq!(bat.dominant_effect(), Some(EffectKind::Shield));
    }

    proptest! {
        #[test]
        fn prop_fall_speed_never_exceeds_terminal(
            start in -20.0f32..30.0,
            steps in proptest::collection::vec(0.0f32..250.0, 1..60),
        ) {
            let mut rng = rng();
            let mut bat = Bat::new(0.0, 0.0);
            bat.velocity = start.min(TERMINAL_VELOCITY);
            for dt in steps {
                bat.update(dt, &mut rng);
                prop_assert!(bat.velocity <= TERMINAL_VELOCITY);
                prop_assert!(bat.rotation.abs() <= MAX_TILT + 1e-6);
            }
        }
    }
}
