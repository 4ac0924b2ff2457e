//! Abstracted input intent
//!
//! Hosts translate device events into this state; the core only ever reads
//! the pressed-direction set and the pointer position.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::util::vec2::Vec2;

/// Movement directions on the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Away from the camera (-z)
    Forward,
    /// Toward the camera (+z)
    Back,
    /// -x
    Left,
    /// +x
    Right,
}

impl Direction {
    /// Map a DOM-style key code (`KeyW`, `KeyA`, `KeyS`, `KeyD`) to a direction
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" => Some(Self::Forward),
            "KeyS" => Some(Self::Back),
            "KeyA" => Some(Self::Left),
            "KeyD" => Some(Self::Right),
            _ => None,
        }
    }

    /// Contribution to the (x, z) intent vector
    fn axis(self) -> Vec2 {
        match self {
            Self::Forward => Vec2::new(0.0, -1.0),
            Self::Back => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// Pointer buttons; only `Primary` fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
    Other(u16),
}

impl MouseButton {
    /// DOM `MouseEvent.button` numbering
    pub fn from_index(index: u16) -> Self {
        match index {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            n => Self::Other(n),
        }
    }
}

/// Current input as seen by the simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputState {
    pressed: SmallVec<[Direction; 4]>,
    pointer_ndc: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, direction: Direction) {
        if !self.pressed.contains(&direction) {
            self.pressed.push(direction);
        }
    }

    pub fn release(&mut self, direction: Direction) {
        self.pressed.retain(|d| *d != direction);
    }

    /// Drop every held direction (e.g. the host window lost focus)
    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    pub fn is_pressed(&self, direction: Direction) -> bool {
        self.pressed.contains(&direction)
    }

    /// Update the pointer; values are clamped into [-1, 1] and non-finite input is ignored
    pub fn set_pointer_ndc(&mut self, ndc: Vec2) {
        if ndc.is_finite() {
            self.pointer_ndc = ndc.clamp(-1.0, 1.0);
        }
    }

    /// Convert a pixel position into normalized device coordinates
    pub fn set_pointer_pixels(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.set_pointer_ndc(Vec2::new(x / width * 2.0 - 1.0, -(y / height) * 2.0 + 1.0));
    }

    #[inline]
    pub fn pointer_ndc(&self) -> Vec2 {
        self.pointer_ndc
    }

    /// Unit-or-zero movement intent; opposite directions cancel
    pub fn intent(&self) -> Vec2 {
        let mut sum = Vec2::ZERO;
        for d in &self.pressed {
            sum += d.axis();
        }
        sum.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(Direction::from_key_code("KeyW"), Some(Direction::Forward));
        assert_eq!(Direction::from_key_code("KeyD"), Some(Direction::Right));
        assert_eq!(Direction::from_key_code("Space"), None);
    }

    #[test]
    fn test_mouse_buttons() {
        assert_eq!(MouseButton::from_index(0), MouseButton::Primary);
        assert_eq!(MouseButton::from_index(2), MouseButton::Secondary);
        assert_eq!(MouseButton::from_index(4), MouseButton::Other(4));
    }

    #[test]
    fn test_intent_empty_is_zero() {
        assert_eq!(InputState::new().intent(), Vec2::ZERO);
    }

    #[test]
    fn test_intent_forward_is_negative_z() {
        let mut input = InputState::new();
        input.press(Direction::Forward);
        assert_eq!(input.intent(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_intent_diagonal_is_unit() {
        let mut input = InputState::new();
        input.press(Direction::Right);
        input.press(Direction::Back);
        let intent = input.intent();
        assert!((intent.length() - 1.0).abs() < 1e-12);
        assert!(intent.x > 0.0 && intent.y > 0.0);
    }

    #[test]
    fn test_opposites_cancel() {
        let mut input = InputState::new();
        input.press(Direction::Left);
        input.press(Direction::Right);
        assert_eq!(input.intent(), Vec2::ZERO);
    }

    #[test]
    fn test_press_is_idempotent() {
        let mut input = InputState::new();
        input.press(Direction::Left);
        input.press(Direction::Left);
        input.release(Direction::Left);
        assert!(!input.is_pressed(Direction::Left));
        assert_eq!(input.intent(), Vec2::ZERO);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut input = InputState::new();
        input.press(Direction::Forward);
        input.press(Direction::Left);
        input.clear();
        assert_eq!(input.intent(), Vec2::ZERO);
    }

    #[test]
    fn test_pointer_pixels() {
        let mut input = InputState::new();
        input.set_pointer_pixels(800.0, 0.0, 800.0, 600.0);
        assert!(input.pointer_ndc().approx_eq(Vec2::new(1.0, 1.0), 1e-12));

        input.set_pointer_pixels(400.0, 300.0, 800.0, 600.0);
        assert!(input.pointer_ndc().approx_eq(Vec2::ZERO, 1e-12));
    }

    #[test]
    fn test_pointer_rejects_bad_values() {
        let mut input = InputState::new();
        input.set_pointer_ndc(Vec2::new(0.5, 0.5));
        input.set_pointer_ndc(Vec2::new(f64::NAN, 0.0));
        assert_eq!(input.pointer_ndc(), Vec2::new(0.5, 0.5));

        input.set_pointer_ndc(Vec2::new(3.0, -3.0));
        assert_eq!(input.pointer_ndc(), Vec2::new(1.0, -1.0));
    }
}
