//! Input handling

use glam::Vec2;
use rustc_hash::FxHashSet;
use winit::event::{ElementState, MouseButton, TouchPhase};
use winit::keyboard::KeyCode;

/// Identifies the pointer that produced a press or release
///
/// Each touch keeps its id from begin to end, so several players can swipe
/// at once while the mouse acts as one extra pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Pressed,
    Released,
}

/// A press or release in window pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub phase: PointerPhase,
    pub position: Vec2,
}

/// Input state manager
#[derive(Debug)]
pub struct Input {
    /// Currently pressed keys
    pressed_keys: FxHashSet<KeyCode>,
    /// Keys that were just pressed this frame
    just_pressed_keys: FxHashSet<KeyCode>,
    /// Keys that were just released this frame
    just_released_keys: FxHashSet<KeyCode>,
    /// Currently pressed mouse buttons
    pressed_mouse_buttons: FxHashSet<MouseButton>,
    /// Current mouse position
    mouse_position: Vec2,
    /// Presses and releases in arrival order, cleared every frame
    pointer_events: Vec<PointerEvent>,
}

impl Input {
    /// Create a new input manager
    pub fn new() -> Self {
        Self {
            pressed_keys: FxHashSet::default(),
            just_pressed_keys: FxHashSet::default(),
            just_released_keys: FxHashSet::default(),
            pressed_mouse_buttons: FxHashSet::default(),
            mouse_position: Vec2::ZERO,
            pointer_events: Vec::new(),
        }
    }

    /// Clear per-frame state. Called by the engine after the game update.
    pub fn update(&mut self) {
        self.just_pressed_keys.clear();
        self.just_released_keys.clear();
        self.pointer_events.clear();
    }

    /// Process a keyboard event
    pub fn process_keyboard(&mut self, key_code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.pressed_keys.insert(key_code) {
                    self.just_pressed_keys.insert(key_code);
                }
            }
            ElementState::Released => {
                self.pressed_keys.remove(&key_code);
                self.just_released_keys.insert(key_code);
            }
        }
    }

    /// Process a mouse button event. The left button doubles as a pointer.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let phase = match state {
            ElementState::Pressed => {
                if !self.pressed_mouse_buttons.insert(button) {
                    return;
                }
                PointerPhase::Pressed
            }
            ElementState::Released => {
                if !self.pressed_mouse_buttons.remove(&button) {
                    return;
                }
                PointerPhase::Released
            }
        };

        if button == MouseButton::Left {
            self.pointer_events.push(PointerEvent {
                id: PointerId::Mouse,
                phase,
                position: self.mouse_position,
            });
        }
    }

    /// Process mouse movement
    pub fn process_mouse_motion(&mut self, position: Vec2) {
        self.mouse_position = position;
    }

    /// Process a touch. Moves are ignored; swipes only need both ends.
    pub fn process_touch(&mut self, id: u64, phase: TouchPhase, position: Vec2) {
        let phase = match phase {
            TouchPhase::Started => PointerPhase::Pressed,
            TouchPhase::Ended | TouchPhase::Cancelled => PointerPhase::Released,
            TouchPhase::Moved => return,
        };
        self.pointer_events.push(PointerEvent {
            id: PointerId::Touch(id),
            phase,
            position,
        });
    }

    /// Check if a key is currently pressed
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Check if a key was just pressed this frame
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    /// Check if a key was just released this frame
    pub fn is_key_just_released(&self, key: KeyCode) -> bool {
        self.just_released_keys.contains(&key)
    }

    /// Check if a mouse button is currently pressed
    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_mouse_buttons.contains(&button)
    }

    /// Get current mouse position
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Pointer presses and releases received this frame
    pub fn pointer_events(&self) -> &[PointerEvent] {
        &self.pointer_events
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_just_pressed_once() {
        let mut input = Input::new();
        input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
        input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
        assert!(input.is_key_just_pressed(KeyCode::Escape));

        input.update();
        input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
        assert!(!input.is_key_just_pressed(KeyCode::Escape));
        assert!(input.is_key_pressed(KeyCode::Escape));
    }

    #[test]
    fn test_left_click_becomes_pointer_events() {
        let mut input = Input::new();
        input.process_mouse_motion(Vec2::new(10.0, 20.0));
        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        input.process_mouse_motion(Vec2::new(30.0, 5.0));
        input.process_mouse_button(MouseButton::Left, ElementState::Released);
        input.process_mouse_button(MouseButton::Right, ElementState::Pressed);

        let events = input.pointer_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].phase, PointerPhase::Pressed);
        assert_eq!(events[0].position, Vec2::new(10.0, 20.0));
        assert_eq!(events[1].phase, PointerPhase::Released);
        assert_eq!(events[1].position, Vec2::new(30.0, 5.0));

        input.update();
        assert!(input.pointer_events().is_empty());
    }

    #[test]
    fn test_touch_ids_are_kept() {
        let mut input = Input::new();
        input.process_touch(7, TouchPhase::Started, Vec2::ONE);
        input.process_touch(7, TouchPhase::Moved, Vec2::ZERO);
        input.process_touch(7, TouchPhase::Cancelled, Vec2::ZERO);

        let events = input.pointer_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.id == PointerId::Touch(7)));
        assert_eq!(events[1].phase, PointerPhase::Released);
    }
}
