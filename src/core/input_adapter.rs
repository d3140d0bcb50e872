use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};
use super::display_context::DisplayContext;

/// Pointer/keyboard state collected from winit, handed to the orchestrator each frame
#[derive(Debug, Clone, Default)]
pub struct WinitController {
    pressed_keys: HashSet<Button>,
    /// Press order, for get_down_keys
    pressed_vec: Vec<Button>,
    /// Cursor position in physical pixels
    mouse_position: Option<(f32, f32)>,
    /// Set when the cursor moved since the last take_pointer_moved
    pointer_moved: bool,
    /// Left button released since the last take_click
    click_pending: bool,
    text_focus: bool,
}

impl WinitController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if let Some(button) = Self::keycode_to_button(keycode) {
                        self.set_button(button, event.state);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(btn) = Self::mouse_button_to_button(*button) {
                    if *state == ElementState::Released && self.is_down(btn) {
                        self.click_pending = true;
                    }
                    self.set_button(btn, *state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = Some((position.x as f32, position.y as f32));
                self.pointer_moved = true;
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
                self.pointer_moved = true;
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    fn set_button(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.pressed_keys.insert(button) {
                    self.pressed_vec.push(button);
                }
            }
            ElementState::Released => {
                if self.pressed_keys.remove(&button) {
                    self.pressed_vec.retain(|&b| b != button);
                }
            }
        }
    }

    /// Drop every held key, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
        self.pressed_vec.clear();
    }

    /// Mirrors whether the overlay's text field owns the keyboard
    pub fn set_text_focus(&mut self, focused: bool) {
        if focused && !self.text_focus {
            self.release_all();
        }
        self.text_focus = focused;
    }

    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        self.mouse_position
    }

    /// Cursor position in NDC for the given surface
    pub fn pointer_ndc(&self, display: &DisplayContext) -> Option<(f32, f32)> {
        self.mouse_position.map(|(x, y)| display.to_ndc(x, y))
    }

    pub fn take_pointer_moved(&mut self) -> bool {
        std::mem::take(&mut self.pointer_moved)
    }

    pub fn take_click(&mut self) -> bool {
        std::mem::take(&mut self.click_pending)
    }

    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::KeyW => Some(Button::KeyW),
            KeyCode::KeyA => Some(Button::KeyA),
            KeyCode::KeyS => Some(Button::KeyS),
            KeyCode::KeyD => Some(Button::KeyD),
            KeyCode::ArrowUp => Some(Button::ArrowUp),
            KeyCode::ArrowDown => Some(Button::ArrowDown),
            KeyCode::ArrowLeft => Some(Button::ArrowLeft),
            KeyCode::ArrowRight => Some(Button::ArrowRight),
            KeyCode::Escape => Some(Button::Escape),
            _ => None,
        }
    }

    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::MouseLeft),
            _ => None,
        }
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn get_down_keys(&self) -> &[Button] {
        &self.pressed_vec
    }

    fn keyboard_captured(&self) -> bool {
        self.text_focus
    }
}
