use std::collections::HashSet;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};

/// Adapter that bridges Winit events to the Controller trait
#[derive(Debug, Clone, Default)]
pub struct WinitController {
    /// Currently pressed buttons
    pressed_keys: HashSet<Button>,
    /// Buttons that went down since the last `end_frame`
    fresh: HashSet<Button>,
}

impl WinitController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if let PhysicalKey::Code(keycode) = event.physical_key {
                if let Some(button) = Self::keycode_to_button(keycode) {
                    self.set_button(button, event.state);
                }
            }
        }
    }

    fn set_button(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.pressed_keys.insert(button) {
                    self.fresh.insert(button);
                }
            }
            ElementState::Released => {
                self.pressed_keys.remove(&button);
            }
        }
    }

    /// Escape went down since the last `end_frame`
    pub fn quit_requested(&self) -> bool {
        self.just_pressed(Button::Escape)
    }

    /// Forget fresh presses; call once per frame after input is consumed
    pub fn end_frame(&mut self) {
        self.fresh.clear();
    }

    /// Map Winit KeyCode to Button
    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::KeyW => Some(Button::KeyW),
            KeyCode::KeyA => Some(Button::KeyA),
            KeyCode::KeyS => Some(Button::KeyS),
            KeyCode::KeyD => Some(Button::KeyD),
            KeyCode::KeyQ => Some(Button::KeyQ),
            KeyCode::KeyE => Some(Button::KeyE),
            KeyCode::Space => Some(Button::Space),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Shift),
            KeyCode::KeyR => Some(Button::KeyR),
            KeyCode::Equal | KeyCode::NumpadAdd => Some(Button::Plus),
            KeyCode::Minus | KeyCode::NumpadSubtract => Some(Button::Minus),
            KeyCode::Escape => Some(Button::Escape),
            _ => None,
        }
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn just_pressed(&self, button: Button) -> bool {
        self.fresh.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Winit key events carry platform fields that cannot be built in tests,
    // so state changes go through set_button directly.

    #[test]
    fn test_new_controller_empty() {
        let controller = WinitController::new();
        assert!(!controller.is_down(Button::KeyW));
        assert!(!controller.just_pressed(Button::Escape));
    }

    #[test]
    fn test_press_is_fresh_until_end_frame() {
        let mut controller = WinitController::new();
        controller.set_button(Button::KeyR, ElementState::Pressed);
        assert!(controller.just_pressed(Button::KeyR));

        controller.end_frame();
        assert!(controller.is_down(Button::KeyR));
        assert!(!controller.just_pressed(Button::KeyR));
    }

    #[test]
    fn test_repeat_press_not_fresh_again() {
        let mut controller = WinitController::new();
        controller.set_button(Button::Plus, ElementState::Pressed);
        controller.end_frame();
        controller.set_button(Button::Plus, ElementState::Pressed);
        assert!(!controller.just_pressed(Button::Plus));
        assert!(controller.is_down(Button::Plus));
    }

    #[test]
    fn test_release_removes_button() {
        let mut controller = WinitController::new();
        controller.set_button(Button::KeyW, ElementState::Pressed);
        controller.set_button(Button::KeyW, ElementState::Released);
        assert!(!controller.is_down(Button::KeyW));
        assert!(!controller.just_pressed(Button::KeyA));
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(WinitController::keycode_to_button(KeyCode::Equal), Some(Button::Plus));
        assert_eq!(WinitController::keycode_to_button(KeyCode::ShiftRight), Some(Button::Shift));
        assert_eq!(WinitController::keycode_to_button(KeyCode::KeyZ), None);
    }

    #[test]
    fn test_escape_press_requests_quit() {
        let mut controller = WinitController::new();
        assert_eq!(WinitController::keycode_to_button(KeyCode::Escape), Some(Button::Escape));

        controller.set_button(Button::Escape, ElementState::Pressed);
        assert!(controller.just_pressed(Button::Escape));
        assert!(controller.quit_requested());

        controller.end_frame();
        assert!(!controller.quit_requested());
    }
}
