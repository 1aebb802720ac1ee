//! Timed effects carried by the bat
//!
//! The effect set is closed, so the state is a fixed table indexed by
//! [`EffectKind`] rather than an open map.

use serde::{Deserialize, Serialize};

/// Timed modifiers that can be applied to the bat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Absorbs exactly one hit
    Shield,
    /// Obstacles and cave walls are ignored
    Invulnerable,
    /// Obstacle points are doubled
    ScoreMultiplier,
    /// Smaller body and collision box
    Shrink,
    /// Nearby power-ups drift toward the bat
    Magnet,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::Shield,
        EffectKind::Invulnerable,
        EffectKind::ScoreMultiplier,
        EffectKind::Shrink,
        EffectKind::Magnet,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            EffectKind::Shield => 0,
            EffectKind::Invulnerable => 1,
            EffectKind::ScoreMultiplier => 2,
            EffectKind::Shrink => 3,
            EffectKind::Magnet => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::Shield => "shield",
            EffectKind::Invulnerable => "invulnerable",
            EffectKind::ScoreMultiplier => "score_multiplier",
            EffectKind::Shrink => "shrink",
            EffectKind::Magnet => "magnet",
        }
    }
}

/// State of a single effect
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectSlot {
    pub active: bool,
    /// Milliseconds left; zero whenever inactive
    pub remaining_ms: f32,
}

/// All effects of the bat
#[derive(Debug, Clone, Default)]
pub struct ActiveEffects {
    slots: [EffectSlot; 5],
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate an effect. Re-activation resets the timer, it never stacks.
    pub fn activate(&mut self, kind: EffectKind, duration_ms: f32) {
        self.slots[kind.index()] = EffectSlot {
            active: true,
            remaining_ms: duration_ms.max(0.0),
        };
    }

    /// Deactivate an effect, returning whether it was active
    pub fn deactivate(&mut self, kind: EffectKind) -> bool {
        let slot = &mut self.slots[kind.index()];
        let was_active = slot.active;
        *slot = EffectSlot::default();
        was_active
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.slots[kind.index()].active
    }

    pub fn remaining_ms(&self, kind: EffectKind) -> f32 {
        self.slots[kind.index()].remaining_ms
    }

    /// Count down every active effect by `dt_ms`.
    ///
    /// Returns the effects that expired during this call.
    pub fn advance(&mut self, dt_ms: f32) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for kind in EffectKind::ALL {
            let slot = &mut self.slots[kind.index()];
            if !slot.active {
                continue;
            }
            slot.remaining_ms -= dt_ms;
            if slot.remaining_ms <= 0.0 {
                *slot = EffectSlot::default();
                expired.push(kind);
            }
        }
        expired
    }

    /// Active effects in declaration order with their remaining time
    pub fn iter_active(&self) -> impl Iterator<Item = (EffectKind, f32)> + '_ {
        EffectKind::ALL
            .into_iter()
            .filter(|k| self.is_active(*k))
            .map(|k| (k, self.remaining_ms(k)))
    }

    pub fn any_active(&self) -> bool {
        self.slots.iter().any(|s| s.active)
    }

    /// Drop every effect (on death)
    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reactivation_resets_instead_of_stacking() {
        let mut effects = ActiveEffects::new();
        effects.activate(EffectKind::Magnet, 1000.0);
        effects.advance(400.0);
        assert!((effects.remaining_ms(EffectKind::Magnet) - 600.0).abs() < 1e-3);

        effects.activate(EffectKind::Magnet, 1000.0);
        assert!((effects.remaining_ms(EffectKind::Magnet) - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_advance_expires_effects() {
        let mut effects = ActiveEffects::new();
        effects.activate(EffectKind::Shrink, 100.0);
        effects.activate(EffectKind::Shield, 1000.0);

        assert!(effects.advance(60.0).is_empty());
        let expired = effects.advance(60.0);
        assert_eq!(expired, vec![EffectKind::Shrink]);
        assert!(!effects.is_active(EffectKind::Shrink));
        assert_eq!(effects.remaining_ms(EffectKind::Shrink), 0.0);
        assert!(effects.is_active(EffectKind::Shield));
    }

    #[test]
    fn test_deactivate_reports_presence_once() {
        let mut effects = ActiveEffects::new();
        effects.activate(EffectKind::Shield, 8000.0);
        assert!(effects.deactivate(EffectKind::Shield));
        assert!(!effects.deactivate(EffectKind::Shield));
    }

    #[test]
    fn test_clear() {
        let mut effects = ActiveEffects::new();
        for kind in EffectKind::ALL {
            effects.activate(kind, 500.0);
        }
        assert_eq!(effects.iter_active().count(), 5);
        effects.clear();
        assert!(!effects.any_active());
    }
}
