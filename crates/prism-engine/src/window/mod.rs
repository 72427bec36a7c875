//! Window hosts.
//!
//! A host owns the platform window and its event loop. The renderer drives it
//! through [`WindowHost`] from its own blocking loop and receives callbacks
//! through [`WindowEvents`](crate::core::WindowEvents).

mod headless;
mod host;
mod winit_host;

pub use headless::HeadlessHost;
pub use host::WindowHost;
pub use winit_host::{WindowConfig, WinitHost};
