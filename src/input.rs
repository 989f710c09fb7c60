//! Keyboard state tracking.
//!
//! Keys are identified by the character their logical key produces, so the
//! map is case-sensitive: holding shift turns "w" into "W", which the driver
//! does not react to. Named keys (arrows, escape, ...) are not tracked.

use std::collections::HashMap;

use winit::{
    event::{ElementState, WindowEvent},
    keyboard::Key,
};

/// Last known pressed/released state per key. Last write wins.
#[derive(Debug, Default, Clone)]
pub struct KeyStates {
    keys: HashMap<String, bool>,
}

impl KeyStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str) {
        self.keys.insert(key.to_string(), true);
    }

    pub fn release(&mut self, key: &str) {
        self.keys.insert(key.to_string(), false);
    }

    /// Keys that were never seen count as released.
    pub fn is_pressed(&self, key: &str) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    /// Record a winit keyboard event. Returns `true` if the map was touched.
    ///
    /// OS key repeat arrives as further presses and simply re-asserts `true`.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return false;
        };
        let Key::Character(text) = &event.logical_key else {
            return false;
        };
        match event.state {
            ElementState::Pressed => self.press(text.as_str()),
            ElementState::Released => self.release(text.as_str()),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_are_not_pressed() {
        let keys = KeyStates::new();
        assert!(!keys.is_pressed("w"));
    }

    #[test]
    fn press_then_release() {
        let mut keys = KeyStates::new();
        keys.press("w");
        assert!(keys.is_pressed("w"));
        keys.release("w");
        assert!(!keys.is_pressed("w"));
    }

    #[test]
    fn repeated_presses_stay_pressed() {
        let mut keys = KeyStates::new();
        keys.press("d");
        keys.press("d");
        keys.press("d");
        assert!(keys.is_pressed("d"));
        keys.release("d");
        assert!(!keys.is_pressed("d"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let mut keys = KeyStates::new();
        keys.press("W");
        assert!(!keys.is_pressed("w"));
        assert!(keys.is_pressed("W"));
    }
}
