/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    MouseLeft,
}

/// Controller - handles button input states
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Get all currently pressed buttons
    fn get_down_keys(&self) -> &[Button];

    /// A text field owns the keyboard; movement keys must be ignored
    fn keyboard_captured(&self) -> bool {
        false
    }

    fn any_down(&self, buttons: &[Button]) -> bool {
        buttons.iter().any(|&b| self.is_down(b))
    }
}

/// Controller with nothing pressed
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleController;

impl Controller for IdleController {
    fn is_down(&self, _button: Button) -> bool {
        false
    }

    fn get_down_keys(&self) -> &[Button] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct MockController {
        pressed: Vec<Button>,
        captured: bool,
    }

    impl Controller for MockController {
        fn is_down(&self, button: Button) -> bool {
            self.pressed.contains(&button)
        }

        fn get_down_keys(&self) -> &[Button] {
            &self.pressed
        }

        fn keyboard_captured(&self) -> bool {
            self.captured
        }
    }

    #[test]
    fn test_button_hash_duplicates() {
        let mut set = HashSet::new();
        set.insert(Button::KeyW);
        set.insert(Button::KeyW);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_controller_is_down() {
        let controller = MockController {
            pressed: vec![Button::KeyW, Button::ArrowLeft],
            captured: false,
        };

        assert!(controller.is_down(Button::KeyW));
        assert!(controller.is_down(Button::ArrowLeft));
        assert!(!controller.is_down(Button::KeyA));
        assert!(controller.any_down(&[Button::KeyA, Button::ArrowLeft]));
    }

    #[test]
    fn test_keyboard_capture_flag() {
        let controller = MockController { pressed: vec![], captured: true };
        assert!(controller.keyboard_captured());
        assert!(!IdleController.keyboard_captured());
    }

    #[test]
    fn test_idle_controller_no_keys() {
        assert!(!IdleController.is_down(Button::KeyW));
        assert_eq!(IdleController.get_down_keys().len(), 0);
    }
}
