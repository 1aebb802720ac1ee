//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!
//! Each effect is a short table of oscillator notes; only playback needs a
//! browser.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Wing beat
    Flap,
    /// Obstacle passed
    Score,
    /// Power-up collected
    PowerUp,
    /// Shield absorbed a hit
    ShieldBreak,
    /// Cave theme changed
    ThemeChange,
    /// Century or finale fireworks
    Celebration,
    GameOver,
    /// Achievement toast shown
    Achievement,
}

/// Oscillator wave shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator burst with an exponential decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub freq: f32,
    /// Exponential glide target over the note's duration
    pub glide_to: Option<f32>,
    pub wave: Wave,
    /// Seconds after the effect starts
    pub delay: f64,
    pub duration: f64,
    /// Peak gain before master volume
    pub gain: f32,
}

const fn note(freq: f32, wave: Wave, delay: f64, duration: f64, gain: f32) -> Note {
    Note {
        freq,
        glide_to: None,
        wave,
        delay,
        duration,
        gain,
    }
}

const fn glide(from: f32, to: f32, wave: Wave, duration: f64, gain: f32) -> Note {
    Note {
        freq: from,
        glide_to: Some(to),
        wave,
        delay: 0.0,
        duration,
        gain,
    }
}

const FLAP: [Note; 1] = [glide(200.0, 100.0, Wave::Square, 0.1, 0.2)];
const SCORE: [Note; 3] = [
    note(523.0, Wave::Sine, 0.0, 0.15, 0.3),
    note(659.0, Wave::Sine, 0.1, 0.15, 0.3),
    note(784.0, Wave::Sine, 0.2, 0.15, 0.3),
];
const POWER_UP: [Note; 1] = [glide(440.0, 880.0, Wave::Sawtooth, 0.3, 0.3)];
const SHIELD_BREAK: [Note; 2] = [
    glide(900.0, 300.0, Wave::Triangle, 0.25, 0.35),
    note(1400.0, Wave::Sine, 0.02, 0.12, 0.15),
];
const THEME_CHANGE: [Note; 4] = [
    note(261.0, Wave::Sine, 0.0, 0.2, 0.2),
    note(329.0, Wave::Sine, 0.05, 0.2, 0.2),
    note(392.0, Wave::Sine, 0.1, 0.2, 0.2),
    note(523.0, Wave::Sine, 0.15, 0.2, 0.2),
];
const CELEBRATION: [Note; 5] = [
    note(500.0, Wave::Triangle, 0.0, 0.3, 0.25),
    note(600.0, Wave::Triangle, 0.08, 0.3, 0.25),
    note(700.0, Wave::Triangle, 0.16, 0.3, 0.25),
    note(800.0, Wave::Triangle, 0.24, 0.3, 0.25),
    note(1000.0, Wave::Triangle, 0.32, 0.3, 0.25),
];
const GAME_OVER: [Note; 4] = [
    note(440.0, Wave::Triangle, 0.0, 0.4, 0.3),
    note(349.0, Wave::Triangle, 0.2, 0.4, 0.3),
    note(294.0, Wave::Triangle, 0.4, 0.4, 0.3),
    note(220.0, Wave::Triangle, 0.6, 0.4, 0.3),
];
const ACHIEVEMENT: [Note; 3] = [
    note(784.0, Wave::Sine, 0.0, 0.2, 0.25),
    note(988.0, Wave::Sine, 0.08, 0.2, 0.25),
    note(1175.0, Wave::Sine, 0.16, 0.3, 0.25),
];

impl SoundEffect {
    /// The cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<SoundEffect> {
        match event {
            GameEvent::Flapped => Some(SoundEffect::Flap),
            GameEvent::Scored { .. } => Some(SoundEffect::Score),
            GameEvent::PowerUpCollected(_) => Some(SoundEffect::PowerUp),
            GameEvent::ShieldAbsorbed => Some(SoundEffect::ShieldBreak),
            GameEvent::ThemeChanged(_) => Some(SoundEffect::ThemeChange),
            GameEvent::Century(_) | GameEvent::FinaleStarted { .. } => {
                Some(SoundEffect::Celebration)
            }
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::RunStarted
            | GameEvent::EffectExpired(_)
            | GameEvent::Paused
            | GameEvent::Resumed
            | GameEvent::FinaleReveal => None,
        }
    }

    pub fn notes(&self) -> &'static [Note] {
        match self {
            SoundEffect::Flap => &FLAP,
            SoundEffect::Score => &SCORE,
            SoundEffect::PowerUp => &POWER_UP,
            SoundEffect::ShieldBreak => &SHIELD_BREAK,
            SoundEffect::ThemeChange => &THEME_CHANGE,
            SoundEffect::Celebration => &CELEBRATION,
            SoundEffect::GameOver => &GAME_OVER,
            SoundEffect::Achievement => &ACHIEVEMENT,
        }
    }

    /// Seconds until the last note stops
    pub fn length(&self) -> f64 {
        self.notes()
            .iter()
            .map(|n| n.delay + n.duration)
            .fold(0.0, f64::max)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{Note, SoundEffect, Wave};

    impl From<Wave> for OscillatorType {
        fn from(wave: Wave) -> Self {
            match wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Sawtooth => OscillatorType::Sawtooth,
                Wave::Triangle => OscillatorType::Triangle,
            }
        }
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.5,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Follows the persisted sound setting
        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.master_volume }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for note in effect.notes() {
                self.play_note(ctx, note, vol);
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_note(&self, ctx: &AudioContext, note: &Note, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, note.freq, note.wave.into()) else {
                return;
            };
            let t = ctx.current_time() + note.delay;
            let end = t + note.duration;

            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(vol * note.gain, t + 0.01)
                .ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();

            if let Some(target) = note.glide_to {
                osc.frequency().set_value_at_time(note.freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(target, end)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(end + 0.05).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CaveTheme, PowerUpKind};

    #[test]
    fn test_event_cues() {
        assert_eq!(SoundEffect::for_event(&GameEvent::Flapped), Some(SoundEffect::Flap));
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Scored { points: 2, total: 10 }),
            Some(SoundEffect::Score)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PowerUpCollected(PowerUpKind::Magnet)),
            Some(SoundEffect::PowerUp)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::ThemeChanged(CaveTheme::Ice)),
            Some(SoundEffect::ThemeChange)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::FinaleStarted { score: 1000 }),
            Some(SoundEffect::Celebration)
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::Paused), None);
        assert_eq!(SoundEffect::for_event(&GameEvent::FinaleReveal), None);
    }

    #[test]
    fn test_every_effect_is_audible() {
        for effect in [
            SoundEffect::Flap,
            SoundEffect::Score,
            SoundEffect::PowerUp,
            SoundEffect::ShieldBreak,
            SoundEffect::ThemeChange,
            SoundEffect::Celebration,
            SoundEffect::GameOver,
            SoundEffect::Achievement,
        ] {
            let notes = effect.notes();
            assert!(!notes.is_empty());
            for n in notes {
                assert!(n.freq > 0.0 && n.glide_to.is_none_or(|f| f > 0.0));
                assert!(n.gain > 0.0 && n.gain <= 1.0);
            }
        }
    }

    #[test]
    fn test_flap_is_short() {
        assert!(SoundEffect::Flap.length() <= 0.1 + f64::EPSILON);
        assert!((SoundEffect::GameOver.length() - 1.0).abs() < 1e-9);
    }
}
