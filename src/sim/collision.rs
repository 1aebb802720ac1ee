//! Collision primitives and hazard resolution
//!
//! Everything that can be hit is an axis-aligned box. A hazard (obstacle or
//! cave wall) is resolved by a strict priority order:
//! god mode > invulnerability > shield > death.

use glam::Vec2;

use super::actor::Bat;
use super::effects::EffectKind;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink by `margin` on every side
    pub fn inset(&self, margin: f32) -> Rect {
        Rect::new(
            self.x + margin,
            self.y + margin,
            self.width - margin * 2.0,
            self.height - margin * 2.0,
        )
    }

    /// Strict overlap; touching edges do not collide
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// True if `inner` lies strictly inside this rect
    pub fn strictly_contains(&self, inner: &Rect) -> bool {
        inner.x > self.x
            && inner.y > self.y
            && inner.right() < self.right()
            && inner.bottom() < self.bottom()
    }
}

/// Outcome of resolving a hazard against the bat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardResponse {
    /// Developer mode: the hit is ignored
    GodMode,
    /// Invulnerability effect: the hit is ignored
    Invulnerable,
    /// The shield absorbed the hit and is now gone
    ShieldAbsorbed,
    /// The run is over
    Fatal,
}

impl HazardResponse {
    pub fn ends_run(&self) -> bool {
        matches!(self, HazardResponse::Fatal)
    }
}

/// Resolve a hazard in priority order.
///
/// This is the only place the shield is consumed, so a single call can
/// absorb at most one hit.
pub fn resolve_hazard(bat: &mut Bat, god_mode: bool) -> HazardResponse {
    if god_mode {
        HazardResponse::GodMode
    } else if bat.effects.is_active(EffectKind::Invulnerable) {
        HazardResponse::Invulnerable
    } else if bat.consume_shield() {
        HazardResponse::ShieldAbsorbed
    } else {
        HazardResponse::Fatal
    }
}

/// Boundary test: at or above the ceiling, or at or below the cave floor
pub fn touches_boundary(y: f32, playfield_height: f32, ground_height: f32) -> bool {
    y <= 0.0 || y >= playfield_height - ground_height
}

/// Pull the bat back inside the cave after a survived boundary hit
pub fn clamp_to_playfield(bat: &mut Bat, playfield_height: f32, ground_height: f32) {
    if bat.pos.y <= 0.0 {
        bat.pos.y = 1.0;
    } else {
        bat.pos.y = playfield_height - ground_height - 1.0;
    }
    bat.velocity = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        // Touching edges do not count
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
        // Zero-height span never collides
        assert!(!a.overlaps(&Rect::new(0.0, 5.0, 10.0, 0.0)));
    }

    #[test]
    fn test_inset_is_strictly_inside() {
        let outer = Rect::new(10.0, 20.0, 30.0, 25.0);
        let inner = outer.inset(2.0);
        assert!(outer.strictly_contains(&inner));
        assert_eq!(inner, Rect::new(12.0, 22.0, 26.0, 21.0));
    }

    #[test]
    fn test_priority_order() {
        let mut bat = Bat::new(100.0, 300.0);
        bat.effects.activate(EffectKind::Shield, 8000.0);
        bat.effects.activate(EffectKind::Invulnerable, 5000.0);

        // God mode wins and does not touch the shield
        assert_eq!(resolve_hazard(&mut bat, true), HazardResponse::GodMode);
        assert!(bat.effects.is_active(EffectKind::Shield));

        // Invulnerability beats the shield
        assert_eq!(resolve_hazard(&mut bat, false), HazardResponse::Invulnerable);
        assert!(bat.effects.is_active(EffectKind::Shield));

        bat.effects.deactivate(EffectKind::Invulnerable);
        assert_eq!(resolve_hazard(&mut bat, false), HazardResponse::ShieldAbsorbed);
        assert_eq!(resolve_hazard(&mut bat, false), HazardResponse::Fatal);
    }

    #[test]
    fn test_boundary() {
        assert!(touches_boundary(0.0, 600.0, 20.0));
        assert!(touches_boundary(-5.0, 600.0, 20.0));
        assert!(touches_boundary(580.0, 600.0, 20.0));
        assert!(!touches_boundary(579.0, 600.0, 20.0));
        assert!(!touches_boundary(1.0, 600.0, 20.0));
    }

    #[test]
    fn test_clamp() {
        let mut bat = Bat::new(100.0, -3.0);
        bat.velocity = -6.0;
        clamp_to_playfield(&mut bat, 600.0, 20.0);
        assert_eq!(bat.pos.y, 1.0);
        assert_eq!(bat.velocity, 0.0);

        bat.pos.y = 700.0;
        bat.velocity = 12.0;
        clamp_to_playfield(&mut bat, 600.0, 20.0);
        assert_eq!(bat.pos.y, 579.0);
        assert_eq!(bat.velocity, 0.0);
    }
}
