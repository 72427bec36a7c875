//! Off-screen render targets.
//!
//! A [`Canvas`] is a framebuffer plus the textures attached to it. The compute
//! pass writes the color attachment as an image; the screen pass samples it.

mod error;
mod target;

pub use error::CanvasError;
pub use target::Canvas;
