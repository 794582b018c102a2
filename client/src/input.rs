//! Keyboard capture and the keep-alive policy

use macroquad::prelude::*;
use shared::{Input, Key};
use std::collections::HashSet;

/// Maps a window key to the key vocabulary the server understands
pub fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::W | KeyCode::Up => Key::Up,
        KeyCode::A | KeyCode::Left => Key::Left,
        KeyCode::S | KeyCode::Down => Key::Down,
        KeyCode::D | KeyCode::Right => Key::Right,
        other => Key::Other(other as u32),
    }
}

/// Turns key edges into network inputs
pub struct InputManager {
    held: HashSet<Key>,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
        }
    }

    /// Samples the window's key edges for this frame
    pub fn capture(&mut self) -> Vec<Input> {
        let pressed: Vec<Key> = get_keys_pressed().into_iter().map(map_key).collect();
        let released: Vec<Key> = get_keys_released().into_iter().map(map_key).collect();
        self.frame(&pressed, &released)
    }

    /// Key-down and key-up events for one frame, followed by exactly one ping
    /// so the server never sees us go idle while the window is open
    pub fn frame(&mut self, pressed: &[Key], released: &[Key]) -> Vec<Input> {
        let mut inputs = Vec::with_capacity(pressed.len() + released.len() + 1);

        for key in pressed {
            if self.held.insert(*key) {
                inputs.push(Input::KeyDown(*key));
            }
        }
        for key in released {
            if self.held.remove(key) {
                inputs.push(Input::KeyUp(*key));
            }
        }

        inputs.push(Input::Ping);
        inputs
    }

    pub fn held(&self) -> &HashSet<Key> {
        &self.held
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
