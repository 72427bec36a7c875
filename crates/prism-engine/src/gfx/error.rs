use thiserror::Error;

use super::{ColorFormat, FramebufferId, ProgramId, TextureFormat, TextureId, VertexArrayId};

/// Errors reported by a graphics context.
///
/// None of these are raised for shader compile or link failures; those come back
/// as the compiler's log text so callers can decide how lenient to be.
#[derive(Debug, Error)]
pub enum GfxError {
    #[error("unknown texture {0}")]
    UnknownTexture(TextureId),

    #[error("unknown framebuffer {0}")]
    UnknownFramebuffer(FramebufferId),

    #[error("unknown program {0}")]
    UnknownProgram(ProgramId),

    #[error("unknown vertex array {0}")]
    UnknownVertexArray(VertexArrayId),

    #[error("program {0} is not linked")]
    ProgramNotLinked(ProgramId),

    #[error("program {0} has no {1} pipeline")]
    WrongPipelineKind(ProgramId, &'static str),

    #[error("uniform write of {len} bytes at offset {offset} exceeds block of {size} bytes")]
    UniformOutOfRange { offset: u32, len: usize, size: u32 },

    #[error("no program bound")]
    NoProgramBound,

    #[error("no vertex array bound")]
    NoVertexArrayBound,

    #[error("no texture bound to {kind} unit {unit}")]
    UnboundUnit { kind: &'static str, unit: u32 },

    #[error("texture {texture} has format {found:?}, binding expects {expected:?}")]
    FormatMismatch {
        texture: TextureId,
        expected: ColorFormat,
        found: TextureFormat,
    },

    #[error("texture {0} is sampled before a memory barrier made prior image writes visible")]
    MissingBarrier(TextureId),

    #[error("texture {0} cannot be sampled with filtering")]
    NotFilterable(TextureId),

    #[error("{samples}x multisampling is not supported for {format:?}")]
    UnsupportedSampleCount { format: TextureFormat, samples: u32 },

    #[error("texture size {width}x{height} is invalid")]
    InvalidSize { width: u32, height: u32 },

    #[error("draw issued outside of a frame")]
    NoActiveFrame,

    #[error("surface is lost and cannot be recovered")]
    SurfaceLost,

    #[error("texture readback failed: {0}")]
    Readback(String),
}
