use std::rc::Rc;

use super::{
    Attachment, ClearTarget, FramebufferId, FramebufferStatus, GfxError, ImageAccess,
    MemoryBarrier, ProgramId, QuadVertex, ShaderStage, StageId, TextureDesc, TextureId,
    UniformLayout, VertexArrayId,
};

/// Shared handle to the one graphics context of a run.
///
/// Everything runs on the thread that owns the context, so `Rc` is enough.
pub type SharedContext = Rc<dyn GraphicsContext>;

/// Outcome of [`GraphicsContext::begin_frame`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// A drawable was acquired; draw and present.
    Ready,
    /// No drawable this time (surface reconfigured, minimized, timeout).
    Skipped,
}

/// Static description of a context, logged once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextInfo {
    pub adapter: String,
    pub backend: String,
    pub driver: String,
    pub surface_format: String,
}

/// The underlying graphics context.
///
/// All methods take `&self`; implementations keep their mutable state behind
/// interior mutability. Deleting an id that does not exist is a no-op, so the
/// scoped handles can release unconditionally.
///
/// Image writes and texture reads are ordered by explicit barriers: a texture
/// written through an image unit by `dispatch_compute` must not be sampled by
/// `draw_arrays` until `memory_barrier` has been issued. Implementations
/// report a violation as [`GfxError::MissingBarrier`].
pub trait GraphicsContext {
    // ── textures ────────────────────────────────────────────────────────────

    fn create_texture(&self, desc: &TextureDesc) -> Result<TextureId, GfxError>;
    fn delete_texture(&self, texture: TextureId);

    // ── framebuffers ────────────────────────────────────────────────────────

    fn create_framebuffer(&self) -> FramebufferId;
    fn attach_texture(
        &self,
        framebuffer: FramebufferId,
        attachment: Attachment,
        texture: TextureId,
    ) -> Result<(), GfxError>;
    fn check_framebuffer_status(&self, framebuffer: FramebufferId) -> FramebufferStatus;
    fn delete_framebuffer(&self, framebuffer: FramebufferId);

    /// Clears one target of `framebuffer`, or of the window when `None`.
    fn clear_framebuffer(
        &self,
        framebuffer: Option<FramebufferId>,
        target: ClearTarget,
    ) -> Result<(), GfxError>;

    // ── programs ────────────────────────────────────────────────────────────

    /// Compiles one stage. On failure returns the compiler log.
    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<StageId, String>;
    fn delete_stage(&self, stage: StageId);

    fn create_program(&self) -> ProgramId;
    fn attach_stage(&self, program: ProgramId, stage: StageId) -> Result<(), GfxError>;

    /// Links the attached stages against `layout`. On failure returns the linker log.
    fn link_program(&self, program: ProgramId, layout: &UniformLayout) -> Result<(), String>;
    fn delete_program(&self, program: ProgramId);

    /// Writes raw bytes into the program's uniform block at `offset`.
    fn write_uniform(&self, program: ProgramId, offset: u32, bytes: &[u8])
        -> Result<(), GfxError>;

    /// Points the sampler at `binding` to texture unit `unit`.
    fn set_sampler_unit(&self, program: ProgramId, binding: u32, unit: u32)
        -> Result<(), GfxError>;

    // ── state ───────────────────────────────────────────────────────────────

    fn use_program(&self, program: Option<ProgramId>) -> Result<(), GfxError>;
    fn bind_image_texture(
        &self,
        unit: u32,
        texture: TextureId,
        access: ImageAccess,
    ) -> Result<(), GfxError>;
    fn bind_texture_unit(&self, unit: u32, texture: TextureId) -> Result<(), GfxError>;
    fn set_viewport(&self, width: u32, height: u32);

    fn create_vertex_array(&self, vertices: &[QuadVertex]) -> VertexArrayId;
    fn delete_vertex_array(&self, vertex_array: VertexArrayId);
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) -> Result<(), GfxError>;

    // ── commands ────────────────────────────────────────────────────────────

    fn dispatch_compute(&self, groups: [u32; 3]) -> Result<(), GfxError>;
    fn memory_barrier(&self, barrier: MemoryBarrier);

    /// Draws `count` vertices of the bound vertex array as a triangle list.
    fn draw_arrays(&self, first: u32, count: u32) -> Result<(), GfxError>;

    // ── frame ───────────────────────────────────────────────────────────────

    fn begin_frame(&self) -> Result<FrameStatus, GfxError>;
    fn present(&self) -> Result<(), GfxError>;
    fn resize_surface(&self, width: u32, height: u32);

    /// Size of the window surface, if the context has one.
    fn surface_size(&self) -> Option<(u32, u32)>;
    fn info(&self) -> ContextInfo;

    // ── diagnostics ─────────────────────────────────────────────────────────

    /// Reads a color texture back as tightly packed RGBA8 rows.
    fn read_texture_rgba8(&self, texture: TextureId) -> Result<(u32, u32, Vec<u8>), GfxError>;
}
