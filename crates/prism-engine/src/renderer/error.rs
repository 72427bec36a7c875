use std::path::PathBuf;

use thiserror::Error;

use crate::canvas::CanvasError;
use crate::gfx::GfxError;
use crate::shader::ShaderError;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("renderer used before initialize()")]
    NotInitialized,

    #[error("canvas has no color attachment")]
    NoCanvas,

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error(transparent)]
    Gfx(#[from] GfxError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("readback failed: {0}")]
    Gfx(#[from] GfxError),

    #[error("readback returned {len} bytes for a {width}x{height} image")]
    BufferSize { width: u32, height: u32, len: usize },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
