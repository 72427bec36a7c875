use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{Key, KeyState};

pub(crate) fn map_key_state(state: ElementState) -> KeyState {
    if state.is_pressed() {
        KeyState::Pressed
    } else {
        KeyState::Released
    }
}

/// Physical (layout-independent) key to viewer key.
pub(crate) fn map_key(key: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = key else {
        return Key::Other(0);
    };
    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyP => Key::P,
        KeyCode::F12 => Key::F12,
        other => Key::Other(other as u32),
    }
}
