//! Keyboard mapping and held-key tracking

use crate::sim::{Helm, TickInput};

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Forward,
    Reverse,
    Left,
    Right,
    Pause,
    ToggleCamera,
    ToggleDaylight,
    /// Start, or restart after a win
    Start,
    /// Audio mute (a preference, not a tick input)
    ToggleMute,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Forward,
        Action::Reverse,
        Action::Left,
        Action::Right,
        Action::Pause,
        Action::ToggleCamera,
        Action::ToggleDaylight,
        Action::Start,
        Action::ToggleMute,
    ];

    /// `KeyboardEvent.key` values bound to this action
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Action::Forward => &["w", "W", "ArrowUp"],
            Action::Reverse => &["s", "S", "ArrowDown"],
            Action::Left => &["a", "A", "ArrowLeft"],
            Action::Right => &["d", "D", "ArrowRight"],
            Action::Pause => &["p", "P", "Escape"],
            Action::ToggleCamera => &["c", "C"],
            Action::ToggleDaylight => &["n", "N"],
            Action::Start => &["Enter", " "],
            Action::ToggleMute => &["m", "M"],
        }
    }

    /// Held (true) or one-shot (false)
    pub fn is_held(&self) -> bool {
        matches!(
            self,
            Action::Forward | Action::Reverse | Action::Left | Action::Right
        )
    }
}

/// Map a `KeyboardEvent.key` value
pub fn map_key(key: &str) -> Option<Action> {
    Action::ALL.into_iter().find(|a| a.keys().contains(&key))
}

/// Keys currently held plus one-shot commands not yet consumed by a tick
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    helm: Helm,
    start: bool,
    pause: bool,
    toggle_camera: bool,
    toggle_daylight: bool,
    toggle_mute: bool,
}

impl KeyState {
    /// Returns true if the key is bound (the caller should swallow the event).
    /// Auto-repeat never re-fires a one-shot.
    pub fn key_down(&mut self, key: &str, repeat: bool) -> bool {
        let Some(action) = map_key(key) else {
            return false;
        };
        if repeat && !action.is_held() {
            return true;
        }
        match action {
            Action::Forward => self.helm.forward = true,
            Action::Reverse => self.helm.reverse = true,
            Action::Left => self.helm.left = true,
            Action::Right => self.helm.right = true,
            Action::Pause => self.pause = true,
            Action::ToggleCamera => self.toggle_camera = true,
            Action::ToggleDaylight => self.toggle_daylight = true,
            Action::Start => self.start = true,
            Action::ToggleMute => self.toggle_mute = true,
        }
        true
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match map_key(key) {
            Some(Action::Forward) => self.helm.forward = false,
            Some(Action::Reverse) => self.helm.reverse = false,
            Some(Action::Left) => self.helm.left = false,
            Some(Action::Right) => self.helm.right = false,
            Some(_) => {}
            None => return false,
        }
        true
    }

    /// Consume a pending mute toggle
    pub fn take_mute_toggle(&mut self) -> bool {
        std::mem::take(&mut self.toggle_mute)
    }

    /// Request a start from a button rather than a key
    pub fn press_start(&mut self) {
        self.start = true;
    }

    /// Drop held keys (focus lost, key-ups will never arrive)
    pub fn release_all(&mut self) {
        self.helm = Helm::default();
    }

    pub fn helm(&self) -> Helm {
        self.helm
    }

    pub fn tick_input(&self) -> TickInput {
        TickInput {
            helm: self.helm,
            start: self.start,
            pause: self.pause,
            toggle_camera: self.toggle_camera,
            toggle_daylight: self.toggle_daylight,
        }
    }

    /// Forget one-shots once a tick has consumed them
    pub fn clear_one_shots(&mut self) {
        self.start = false;
        self.pause = false;
        self.toggle_camera = false;
        self.toggle_daylight = false;
    }
}
