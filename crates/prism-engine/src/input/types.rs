/// Keys the viewer binds. Everything else arrives as `Other` with the
/// platform scan code so it can still be logged.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Q,
    P,
    F12,
    Other(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

impl KeyState {
    #[inline]
    pub fn is_pressed(self) -> bool {
        self == KeyState::Pressed
    }
}

/// Viewer action bound to a key.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ViewerCommand {
    Quit,
    ExportCanvas,
    ReportFrame,
}

impl ViewerCommand {
    /// Command for a key transition. Only fresh presses trigger; auto-repeat
    /// would otherwise export a file per repeat tick.
    pub fn for_key(key: Key, state: KeyState, repeat: bool) -> Option<Self> {
        if !state.is_pressed() || repeat {
            return None;
        }
        match key {
            Key::Escape | Key::Q => Some(Self::Quit),
            Key::F12 => Some(Self::ExportCanvas),
            Key::P => Some(Self::ReportFrame),
            Key::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presses_map_to_commands() {
        let press = |key| ViewerCommand::for_key(key, KeyState::Pressed, false);
        assert_eq!(press(Key::Escape), Some(ViewerCommand::Quit));
        assert_eq!(press(Key::Q), Some(ViewerCommand::Quit));
        assert_eq!(press(Key::F12), Some(ViewerCommand::ExportCanvas));
        assert_eq!(press(Key::P), Some(ViewerCommand::ReportFrame));
        assert_eq!(press(Key::Other(42)), None);
    }

    #[test]
    fn releases_and_repeats_are_ignored() {
        assert_eq!(ViewerCommand::for_key(Key::Escape, KeyState::Released, false), None);
        assert_eq!(ViewerCommand::for_key(Key::F12, KeyState::Pressed, true), None);
    }
}
