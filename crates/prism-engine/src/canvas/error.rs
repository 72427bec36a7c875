use thiserror::Error;

use crate::gfx::{FramebufferStatus, GfxError};

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error(transparent)]
    Gfx(#[from] GfxError),

    /// The context rejected the attachment set. The canvas keeps what it allocated.
    #[error("framebuffer is incomplete: {0}")]
    Incomplete(FramebufferStatus),
}
