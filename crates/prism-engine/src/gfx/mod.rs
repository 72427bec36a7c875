//! Graphics-context seam.
//!
//! Components above this module (canvas, shader, renderer) talk to the GPU only
//! through [`GraphicsContext`]. Two implementations exist:
//! - [`native::NativeContext`] drives wgpu against a window surface
//! - [`recording::RecordingContext`] records calls and counts resources, for tests
//!
//! Resource ids returned by a context are plain values; ownership lives in the
//! scoped wrappers of [`handle`], which release their id exactly once on drop.

mod context;
mod error;
pub mod handle;
mod layout;
pub mod native;
pub mod recording;
mod types;
mod validate;

pub use context::{ContextInfo, FrameStatus, GraphicsContext, SharedContext};
pub use error::GfxError;
pub use handle::{OwnedFramebuffer, OwnedProgram, OwnedStage, OwnedTexture, OwnedVertexArray};
pub use layout::{
    ResourceBinding, ResourceKind, UniformLayout, UniformLayoutBuilder, UniformLocation,
    UniformType, UNIFORM_BLOCK_BINDING,
};
pub use types::{
    Attachment, ClearTarget, ColorFormat, FramebufferId, FramebufferStatus, ImageAccess,
    MagFilter, MemoryBarrier, MinFilter, ProgramId, QuadVertex, SamplingParams, ShaderStage,
    StageId, TextureDesc, TextureFormat, TextureId, VertexArrayId, Wrap,
};
