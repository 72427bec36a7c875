//! Frame orchestration.
//!
//! Each frame runs two phases against one canvas: a compute dispatch that
//! traces the scene into the canvas color texture, then a screen pass that
//! samples that texture onto a frame-sized quad. The phases are separated by
//! an image-access barrier.

mod config;
mod dispatch;
mod error;
mod export;
mod frame;
mod quad;

pub use config::RendererConfig;
pub use dispatch::{dispatch_group_count, THREAD_GROUP_SIZE};
pub use error::{ExportError, RendererError};
pub use export::{export_file_name, write_texture};
pub use frame::Renderer;
pub use quad::{ScreenQuad, SQUARE_VERTICES};
