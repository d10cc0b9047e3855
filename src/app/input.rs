use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    /// Close the focused device and return to the overview.
    CloseDevices,
}

pub fn action_for_key(key: PhysicalKey, pressed: bool, repeat: bool) -> InputAction {
    if !pressed || repeat {
        return InputAction::None;
    }
    match key {
        PhysicalKey::Code(KeyCode::Escape) => InputAction::CloseDevices,
        _ => InputAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_press_closes_devices() {
        let escape = PhysicalKey::Code(KeyCode::Escape);
        assert_eq!(action_for_key(escape, true, false), InputAction::CloseDevices);
        assert_eq!(action_for_key(escape, false, false), InputAction::None);
        assert_eq!(action_for_key(escape, true, true), InputAction::None);
    }

    #[test]
    fn other_keys_are_ignored() {
        let key = PhysicalKey::Code(KeyCode::KeyQ);
        assert_eq!(action_for_key(key, true, false), InputAction::None);
    }
}
