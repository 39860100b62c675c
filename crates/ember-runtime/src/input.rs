//! Input state management
//!
//! Holds the current key/button snapshot. Consumers poll it once per update;
//! press/release edges are theirs to detect.

use ember_core::Vec2;
use std::collections::{HashMap, HashSet};
use winit::keyboard::KeyCode;

/// A raw input event as delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseDown(u32),
    MouseUp(u32),
    /// Cursor moved to a position in surface pixels
    MouseMove(Vec2),
}

/// Tracks keyboard and mouse input state
pub struct InputState {
    /// Keys currently held down
    keys_down: HashSet<KeyCode>,
    /// Mouse button state (button index -> pressed)
    mouse_buttons_down: HashSet<u32>,
    /// Current mouse position in surface pixels
    pub mouse_position: Vec2,
    /// Action map: action name -> list of key bindings
    action_map: HashMap<String, Vec<KeyCode>>,
    /// Mouse button action map: action name -> list of mouse button indices
    mouse_button_map: HashMap<String, Vec<u32>>,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            mouse_buttons_down: HashSet::new(),
            mouse_position: Vec2::ZERO,
            action_map: Self::default_action_map(),
            mouse_button_map: Self::default_mouse_button_map(),
        }
    }

    fn default_action_map() -> HashMap<String, Vec<KeyCode>> {
        let mut map = HashMap::new();
        map.insert("up".into(), vec![KeyCode::KeyW, KeyCode::ArrowUp]);
        map.insert("down".into(), vec![KeyCode::KeyS, KeyCode::ArrowDown]);
        map.insert("left".into(), vec![KeyCode::KeyA, KeyCode::ArrowLeft]);
        map.insert("right".into(), vec![KeyCode::KeyD, KeyCode::ArrowRight]);
        map.insert("fire".into(), vec![KeyCode::Space]);
        map.insert("pause".into(), vec![KeyCode::Escape, KeyCode::KeyP]);
        map.insert("confirm".into(), vec![KeyCode::Enter, KeyCode::Space]);
        map
    }

    fn default_mouse_button_map() -> HashMap<String, Vec<u32>> {
        let mut map = HashMap::new();
        map.insert("fire".into(), vec![0]); // Left mouse button
        map
    }

    /// Bind an action to one or more keys, replacing its previous bindings
    pub fn bind_action(&mut self, action: impl Into<String>, keys: Vec<KeyCode>) {
        self.action_map.insert(action.into(), keys);
    }

    /// Bind an action to one or more mouse buttons
    pub fn bind_mouse_action(&mut self, action: impl Into<String>, buttons: Vec<u32>) {
        self.mouse_button_map.insert(action.into(), buttons);
    }

    /// Apply a set of bindings on top of the defaults
    pub fn bind_actions<'a>(
        &mut self,
        bindings: impl IntoIterator<Item = (&'a String, &'a Vec<KeyCode>)>,
    ) {
        for (action, keys) in bindings {
            self.bind_action(action.clone(), keys.clone());
        }
    }

    /// Process a key press event
    pub fn process_key_down(&mut self, key: KeyCode) {
        self.keys_down.insert(key);
    }

    /// Process a key release event
    pub fn process_key_up(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Process mouse button press
    pub fn process_mouse_button_down(&mut self, button: u32) {
        self.mouse_buttons_down.insert(button);
    }

    /// Process mouse button release
    pub fn process_mouse_button_up(&mut self, button: u32) {
        self.mouse_buttons_down.remove(&button);
    }

    /// Process mouse movement in surface pixels
    pub fn process_mouse_move(&mut self, x: f32, y: f32) {
        self.mouse_position = Vec2::new(x, y);
    }

    /// Fold one host event into the snapshot
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown(key) => self.process_key_down(key),
            InputEvent::KeyUp(key) => self.process_key_up(key),
            InputEvent::MouseDown(button) => self.process_mouse_button_down(button),
            InputEvent::MouseUp(button) => self.process_mouse_button_up(button),
            InputEvent::MouseMove(pos) => self.process_mouse_move(pos.x, pos.y),
        }
    }

    /// Release every key and button (listeners detached, focus lost)
    pub fn release_all(&mut self) {
        self.keys_down.clear();
        self.mouse_buttons_down.clear();
    }

    // --- Query methods ---

    /// Is a key currently held down?
    pub fn is_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Is an action currently held? (any bound key or mouse button is down)
    pub fn is_action_down(&self, action: &str) -> bool {
        let key_match = self
            .action_map
            .get(action)
            .is_some_and(|keys| keys.iter().any(|k| self.keys_down.contains(k)));
        let mouse_match = self
            .mouse_button_map
            .get(action)
            .is_some_and(|btns| btns.iter().any(|b| self.mouse_buttons_down.contains(b)));
        key_match || mouse_match
    }

    /// -1, 0 or 1 depending on which of the two actions is held
    pub fn axis(&self, negative: &str, positive: &str) -> f32 {
        let mut value = 0.0;
        if self.is_action_down(negative) {
            value -= 1.0;
        }
        if self.is_action_down(positive) {
            value += 1.0;
        }
        value
    }

    /// Get all registered action names (keyboard + mouse button maps), sorted
    pub fn action_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.action_map.keys().cloned().collect();
        for name in self.mouse_button_map.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names.sort();
        names
    }

    /// Is a mouse button currently held?
    pub fn is_mouse_button_down(&self, button: u32) -> bool {
        self.mouse_buttons_down.contains(&button)
    }
}
