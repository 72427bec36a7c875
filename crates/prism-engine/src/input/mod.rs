//! Keyboard input, independent of the windowing backend.
//!
//! The window host translates platform events into [`Key`] and [`KeyState`];
//! [`ViewerCommand`] holds the viewer's key bindings.

pub(crate) mod platform;
mod types;

pub use types::{Key, KeyState, ViewerCommand};
