use crate::input::{Key, KeyState};

/// Control directive returned by window callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Callbacks a window host delivers to the application.
///
/// The host holds no reference to the receiver between calls; it is handed a
/// `&mut dyn WindowEvents` for the duration of one `poll_events`.
pub trait WindowEvents {
    /// Called when the drawable size changes (physical pixels).
    fn on_resize(&mut self, width: u32, height: u32) -> AppControl {
        let _ = (width, height);
        AppControl::Continue
    }

    /// Called when the platform asks the window to close.
    fn on_close_request(&mut self) -> AppControl {
        AppControl::Exit
    }

    /// Called for keyboard transitions.
    fn on_key(&mut self, key: Key, state: KeyState, repeat: bool) -> AppControl {
        let _ = (key, state, repeat);
        AppControl::Continue
    }
}
