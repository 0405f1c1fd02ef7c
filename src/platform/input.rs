//! Logical action state
//!
//! The host feeds raw key events in through [`InputState::press`] and
//! [`InputState::release`]; the simulation only ever asks whether an action is
//! held or was pressed this frame. [`InputState::end_frame`] clears the
//! one-frame edges after the tick has consumed them.

use serde::{Deserialize, Serialize};

/// Logical game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Jump,
    Throw,
    Dash,
    Pause,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Left,
        Action::Right,
        Action::Jump,
        Action::Throw,
        Action::Dash,
        Action::Pause,
    ];

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }

    /// Default keyboard binding (`KeyboardEvent.key` values)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Action::Left),
            "ArrowRight" | "d" | "D" => Some(Action::Right),
            "ArrowUp" | "w" | "W" | " " => Some(Action::Jump),
            "j" | "J" | "x" | "X" => Some(Action::Throw),
            "Shift" | "k" | "K" | "z" | "Z" => Some(Action::Dash),
            "Escape" | "p" | "P" => Some(Action::Pause),
            _ => None,
        }
    }
}

const ACTION_COUNT: usize = Action::ALL.len();

/// Per-action held state plus this frame's press edges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    held: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key went down; key repeat while held does not re-trigger the edge
    pub fn press(&mut self, action: Action) {
        let i = action.slot();
        if !self.held[i] {
            self.pressed[i] = true;
        }
        self.held[i] = true;
    }

    pub fn release(&mut self, action: Action) {
        self.held[action.slot()] = false;
    }

    #[inline]
    pub fn is_held(&self, action: Action) -> bool {
        self.held[action.slot()]
    }

    /// True only on the frame the action went from up to down
    #[inline]
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed[action.slot()]
    }

    /// -1, 0 or +1 from the held direction keys
    pub fn horizontal(&self) -> f32 {
        let mut dir = 0.0;
        if self.is_held(Action::Left) {
            dir -= 1.0;
        }
        if self.is_held(Action::Right) {
            dir += 1.0;
        }
        dir
    }

    /// Clear press edges; call once after each frame's tick
    pub fn end_frame(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }

    /// Drop everything (focus loss)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_edge_lasts_one_frame() {
        let mut input = InputState::new();
        input.press(Action::Jump);
        assert!(input.is_pressed(Action::Jump));
        assert!(input.is_held(Action::Jump));
        input.end_frame();
        assert!(!input.is_pressed(Action::Jump));
        assert!(input.is_held(Action::Jump));
    }

    #[test]
    fn test_key_repeat_does_not_repress() {
        let mut input = InputState::new();
        input.press(Action::Throw);
        input.end_frame();
        input.press(Action::Throw);
        assert!(!input.is_pressed(Action::Throw));
        input.release(Action::Throw);
        input.press(Action::Throw);
        assert!(input.is_pressed(Action::Throw));
    }

    #[test]
    fn test_horizontal_cancels() {
        let mut input = InputState::new();
        input.press(Action::Left);
        assert_eq!(input.horizontal(), -1.0);
        input.press(Action::Right);
        assert_eq!(input.horizontal(), 0.0);
        input.release(Action::Left);
        assert_eq!(input.horizontal(), 1.0);
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Action::from_key("ArrowLeft"), Some(Action::Left));
        assert_eq!(Action::from_key(" "), Some(Action::Jump));
        assert_eq!(Action::from_key("Escape"), Some(Action::Pause));
        assert_eq!(Action::from_key("q"), None);
    }
}
