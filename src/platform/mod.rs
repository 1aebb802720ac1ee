//! Platform abstraction layer
//!
//! Maps raw keyboard/pointer input to discrete game actions and provides the
//! wall clock. Browser event wiring lives in the wasm entry point.

use crate::settings::Settings;
use crate::sim::GamePhase;

/// Discrete, edge-triggered player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Flap,
    PauseToggle,
    /// Begin a new run from the menu or a results screen
    Start,
}

/// Map a `KeyboardEvent.code` / `key` value to an action
pub fn action_for_key(key: &str) -> Option<InputAction> {
    match key {
        "Space" | " " | "ArrowUp" | "KeyW" | "w" | "W" => Some(InputAction::Flap),
        "Escape" | "KeyP" | "p" | "P" => Some(InputAction::PauseToggle),
        "Enter" => Some(InputAction::Start),
        _ => None,
    }
}

/// A tap or click flaps during a run and starts one otherwise
pub fn pointer_action(phase: GamePhase) -> Option<InputAction> {
    match phase {
        GamePhase::Playing => Some(InputAction::Flap),
        GamePhase::Menu | GamePhase::GameOver | GamePhase::Finale => Some(InputAction::Start),
        GamePhase::Paused => Some(InputAction::PauseToggle),
    }
}

/// Menu shortcuts that edit settings. Returns the changed settings.
pub fn settings_for_key(key: &str, settings: &Settings) -> Option<Settings> {
    let mut next = settings.clone();
    match key {
        "KeyD" | "d" | "D" => next.difficulty = settings.difficulty.next(),
        "KeyO" | "o" | "O" => next.powerups_enabled = !settings.powerups_enabled,
        "KeyM" | "m" | "M" => next.sound_enabled = !settings.sound_enabled,
        "KeyG" | "g" | "G" => next.god_mode = !settings.god_mode,
        _ => return None,
    }
    Some(next)
}

/// Actions collected between two animation frames
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pending: Vec<InputAction>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: InputAction) {
        self.pending.push(action);
    }

    pub fn drain(&mut self) -> Vec<InputAction> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

const MS_PER_DAY: f64 = 86_400_000.0;

/// Whole days since the Unix epoch
pub fn day_index(timestamp_ms: f64) -> i64 {
    (timestamp_ms / MS_PER_DAY).floor() as i64
}

/// Wall-clock time in ms since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(action_for_key("Space"), Some(InputAction::Flap));
        assert_eq!(action_for_key("ArrowUp"), Some(InputAction::Flap));
        assert_eq!(action_for_key("KeyW"), Some(InputAction::Flap));
        assert_eq!(action_for_key("Escape"), Some(InputAction::PauseToggle));
        assert_eq!(action_for_key("KeyP"), Some(InputAction::PauseToggle));
        assert_eq!(action_for_key("Enter"), Some(InputAction::Start));
        assert_eq!(action_for_key("KeyQ"), None);
    }

    #[test]
    fn test_pointer_action() {
        assert_eq!(pointer_action(GamePhase::Playing), Some(InputAction::Flap));
        assert_eq!(pointer_action(GamePhase::Menu), Some(InputAction::Start));
        assert_eq!(pointer_action(GamePhase::GameOver), Some(InputAction::Start));
        assert_eq!(pointer_action(GamePhase::Paused), Some(InputAction::PauseToggle));
    }

    #[test]
    fn test_settings_shortcuts() {
        let settings = Settings::default();
        let harder = settings_for_key("KeyD", &settings).unwrap();
        assert_eq!(harder.difficulty, settings.difficulty.next());
        let muted = settings_for_key("KeyM", &settings).unwrap();
        assert_eq!(muted.sound_enabled, !settings.sound_enabled);
        let god = settings_for_key("g", &settings).unwrap();
        assert!(god.god_mode != settings.god_mode);
        assert_eq!(settings_for_key("Space", &settings), None);
    }

    #[test]
    fn test_input_queue() {
        let mut queue = InputQueue::new();
        queue.push(InputAction::Flap);
        queue.push(InputAction::PauseToggle);
        assert_eq!(queue.drain(), vec![InputAction::Flap, InputAction::PauseToggle]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_day_index() {
        assert_eq!(day_index(0.0), 0);
        assert_eq!(day_index(MS_PER_DAY - 1.0), 0);
        assert_eq!(day_index(MS_PER_DAY * 3.5), 3);
    }
}
