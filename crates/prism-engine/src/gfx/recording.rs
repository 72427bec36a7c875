//! In-memory graphics context.
//!
//! `RecordingContext` performs the same validation as the wgpu context but
//! executes nothing: it allocates ids, counts creations and deletions per
//! resource kind, keeps each program's uniform block bytes, and appends every
//! state change and command to a log. Tests use it to assert on resource
//! balance and on command order without a GPU.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::validate::{framebuffer_status, UnitBindings};
use super::{
    Attachment, ClearTarget, ColorFormat, ContextInfo, FrameStatus, FramebufferId,
    FramebufferStatus, GfxError, GraphicsContext, ImageAccess, MemoryBarrier, ProgramId,
    QuadVertex, ShaderStage, StageId, TextureDesc, TextureFormat, TextureId, UniformLayout,
    VertexArrayId,
};

/// Resource kinds tracked by the create/delete counters.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceKindCount {
    Texture,
    Framebuffer,
    Stage,
    Program,
    VertexArray,
}

/// One logged call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTexture(TextureId),
    DeleteTexture(TextureId),
    CreateFramebuffer(FramebufferId),
    DeleteFramebuffer(FramebufferId),
    Attach {
        framebuffer: FramebufferId,
        attachment: Attachment,
        texture: TextureId,
    },
    Clear {
        framebuffer: Option<FramebufferId>,
        target: ClearTarget,
    },
    CompileStage {
        stage: ShaderStage,
        ok: bool,
    },
    DeleteStage(StageId),
    LinkProgram {
        program: ProgramId,
        ok: bool,
    },
    DeleteProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    WriteUniform {
        program: ProgramId,
        offset: u32,
        len: usize,
    },
    SetSamplerUnit {
        program: ProgramId,
        binding: u32,
        unit: u32,
    },
    BindImage {
        unit: u32,
        texture: TextureId,
        access: ImageAccess,
    },
    BindTextureUnit {
        unit: u32,
        texture: TextureId,
    },
    SetViewport {
        width: u32,
        height: u32,
    },
    BindVertexArray(Option<VertexArrayId>),
    Dispatch([u32; 3]),
    Barrier(MemoryBarrier),
    Draw {
        first: u32,
        count: u32,
    },
    BeginFrame,
    Present,
    ResizeSurface {
        width: u32,
        height: u32,
    },
}

#[derive(Debug)]
struct RecordedProgram {
    stages: Vec<ShaderStage>,
    linked: Option<Linked>,
    sampler_units: HashMap<u32, u32>,
}

#[derive(Debug)]
struct Linked {
    compute: bool,
    layout: UniformLayout,
    block: Vec<u8>,
}

#[derive(Debug, Default)]
struct Counter {
    next: u32,
    created: u32,
    deleted: u32,
}

impl Counter {
    fn alloc(&mut self) -> u32 {
        self.next += 1;
        self.created += 1;
        self.next
    }
}

#[derive(Debug, Default)]
struct State {
    counters: HashMap<ResourceKindCount, Counter>,
    textures: HashMap<TextureId, TextureDesc>,
    framebuffers: HashMap<FramebufferId, BTreeMap<Attachment, TextureId>>,
    stages: HashMap<StageId, ShaderStage>,
    programs: HashMap<ProgramId, RecordedProgram>,
    vertex_arrays: HashMap<VertexArrayId, u32>,

    bound_program: Option<ProgramId>,
    bound_vertex_array: Option<VertexArrayId>,
    units: UnitBindings,

    in_frame: bool,
    frames_presented: u32,
    surface: Option<(u32, u32)>,

    failing_stages: HashSet<ShaderStage>,
    status_override: Option<FramebufferStatus>,

    log: Vec<Command>,
}

impl State {
    fn alloc(&mut self, kind: ResourceKindCount) -> u32 {
        self.counters.entry(kind).or_default().alloc()
    }

    fn freed(&mut self, kind: ResourceKindCount) {
        self.counters.entry(kind).or_default().deleted += 1;
    }

    fn counter(&self, kind: ResourceKindCount) -> (u32, u32) {
        self.counters
            .get(&kind)
            .map_or((0, 0), |c| (c.created, c.deleted))
    }

    fn linked(&self, program: ProgramId) -> Result<&Linked, GfxError> {
        let p = self
            .programs
            .get(&program)
            .ok_or(GfxError::UnknownProgram(program))?;
        p.linked.as_ref().ok_or(GfxError::ProgramNotLinked(program))
    }
}

/// Graphics context that records instead of rendering.
#[derive(Debug, Default)]
pub struct RecordingContext {
    state: RefCell<State>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that reports a window surface of the given size.
    pub fn with_surface(width: u32, height: u32) -> Self {
        let ctx = Self::new();
        ctx.state.borrow_mut().surface = Some((width, height));
        ctx
    }

    /// Makes every later compile of `stage` fail.
    pub fn fail_stage(&self, stage: ShaderStage) {
        self.state.borrow_mut().failing_stages.insert(stage);
    }

    /// Forces `check_framebuffer_status` to return `status` (or computes it again for `None`).
    pub fn set_framebuffer_status(&self, status: Option<FramebufferStatus>) {
        self.state.borrow_mut().status_override = status;
    }

    pub fn created(&self, kind: ResourceKindCount) -> u32 {
        self.state.borrow().counter(kind).0
    }

    pub fn deleted(&self, kind: ResourceKindCount) -> u32 {
        self.state.borrow().counter(kind).1
    }

    pub fn live(&self, kind: ResourceKindCount) -> u32 {
        let (created, deleted) = self.state.borrow().counter(kind);
        created - deleted
    }

    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().log.clone()
    }

    pub fn clear_commands(&self) {
        self.state.borrow_mut().log.clear();
    }

    pub fn frames_presented(&self) -> u32 {
        self.state.borrow().frames_presented
    }

    pub fn texture_desc(&self, texture: TextureId) -> Option<TextureDesc> {
        self.state.borrow().textures.get(&texture).copied()
    }

    pub fn attachments(&self, framebuffer: FramebufferId) -> Vec<(Attachment, TextureId)> {
        self.state
            .borrow()
            .framebuffers
            .get(&framebuffer)
            .map(|t| t.iter().map(|(&a, &t)| (a, t)).collect())
            .unwrap_or_default()
    }

    /// Attached stages of a program, in attach order.
    pub fn program_stages(&self, program: ProgramId) -> Vec<ShaderStage> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.stages.clone())
            .unwrap_or_default()
    }

    /// Current uniform block contents of a linked program.
    pub fn uniform_bytes(&self, program: ProgramId) -> Option<Vec<u8>> {
        self.state.borrow().linked(program).ok().map(|l| l.block.clone())
    }

    pub fn sampler_unit(&self, program: ProgramId, binding: u32) -> Option<u32> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.sampler_units.get(&binding).copied())
    }

    fn push(&self, command: Command) {
        self.state.borrow_mut().log.push(command);
    }
}

impl GraphicsContext for RecordingContext {
    fn create_texture(&self, desc: &TextureDesc) -> Result<TextureId, GfxError> {
        if desc.width == 0 || desc.height == 0 {
            return Err(GfxError::InvalidSize {
                width: desc.width,
                height: desc.height,
            });
        }
        if !matches!(desc.samples, 1 | 2 | 4 | 8) {
            return Err(GfxError::UnsupportedSampleCount {
                format: desc.format,
                samples: desc.samples,
            });
        }

        let mut s = self.state.borrow_mut();
        let id = TextureId::from_raw(s.alloc(ResourceKindCount::Texture));
        s.textures.insert(id, *desc);
        s.log.push(Command::CreateTexture(id));
        Ok(id)
    }

    fn delete_texture(&self, texture: TextureId) {
        let mut s = self.state.borrow_mut();
        if s.textures.remove(&texture).is_some() {
            s.units.forget(texture);
            s.freed(ResourceKindCount::Texture);
            s.log.push(Command::DeleteTexture(texture));
        }
    }

    fn create_framebuffer(&self) -> FramebufferId {
        let mut s = self.state.borrow_mut();
        let id = FramebufferId::from_raw(s.alloc(ResourceKindCount::Framebuffer));
        s.framebuffers.insert(id, BTreeMap::new());
        s.log.push(Command::CreateFramebuffer(id));
        id
    }

    fn attach_texture(
        &self,
        framebuffer: FramebufferId,
        attachment: Attachment,
        texture: TextureId,
    ) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        if !s.textures.contains_key(&texture) {
            return Err(GfxError::UnknownTexture(texture));
        }
        s.framebuffers
            .get_mut(&framebuffer)
            .ok_or(GfxError::UnknownFramebuffer(framebuffer))?
            .insert(attachment, texture);
        s.log.push(Command::Attach {
            framebuffer,
            attachment,
            texture,
        });
        Ok(())
    }

    fn check_framebuffer_status(&self, framebuffer: FramebufferId) -> FramebufferStatus {
        let s = self.state.borrow();
        if let Some(status) = s.status_override {
            return status;
        }
        match s.framebuffers.get(&framebuffer) {
            Some(table) => framebuffer_status(table, |t| s.textures.get(&t).copied()),
            None => FramebufferStatus::InvalidAttachment,
        }
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        let mut s = self.state.borrow_mut();
        if s.framebuffers.remove(&framebuffer).is_some() {
            s.freed(ResourceKindCount::Framebuffer);
            s.log.push(Command::DeleteFramebuffer(framebuffer));
        }
    }

    fn clear_framebuffer(
        &self,
        framebuffer: Option<FramebufferId>,
        target: ClearTarget,
    ) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        if let Some(fb) = framebuffer {
            if !s.framebuffers.contains_key(&fb) {
                return Err(GfxError::UnknownFramebuffer(fb));
            }
        }
        s.log.push(Command::Clear {
            framebuffer,
            target,
        });
        Ok(())
    }

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<StageId, String> {
        let mut s = self.state.borrow_mut();
        let failure = if source.trim().is_empty() {
            Some("0:0: error: empty shader source".to_string())
        } else if s.failing_stages.contains(&stage) {
            Some(format!("0:1: error: {stage} rejected by test configuration"))
        } else {
            None
        };

        s.log.push(Command::CompileStage {
            stage,
            ok: failure.is_none(),
        });
        if let Some(log) = failure {
            return Err(log);
        }

        let id = StageId::from_raw(s.alloc(ResourceKindCount::Stage));
        s.stages.insert(id, stage);
        Ok(id)
    }

    fn delete_stage(&self, stage: StageId) {
        let mut s = self.state.borrow_mut();
        if s.stages.remove(&stage).is_some() {
            s.freed(ResourceKindCount::Stage);
            s.log.push(Command::DeleteStage(stage));
        }
    }

    fn create_program(&self) -> ProgramId {
        let mut s = self.state.borrow_mut();
        let id = ProgramId::from_raw(s.alloc(ResourceKindCount::Program));
        s.programs.insert(
            id,
            RecordedProgram {
                stages: Vec::new(),
                linked: None,
                sampler_units: HashMap::new(),
            },
        );
        id
    }

    fn attach_stage(&self, program: ProgramId, stage: StageId) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        let Some(&kind) = s.stages.get(&stage) else {
            // Stage ids are not a GfxError subject; an unknown one attaches nothing.
            return Ok(());
        };
        s.programs
            .get_mut(&program)
            .ok_or(GfxError::UnknownProgram(program))?
            .stages
            .push(kind);
        Ok(())
    }

    fn link_program(&self, program: ProgramId, layout: &UniformLayout) -> Result<(), String> {
        let mut s = self.state.borrow_mut();
        let Some(p) = s.programs.get_mut(&program) else {
            return Err(format!("unknown program {program}"));
        };

        let has = |stage: ShaderStage| p.stages.contains(&stage);
        let compute = has(ShaderStage::Compute);
        let result = if p.stages.is_empty() {
            Err("error: no shader stages attached".to_string())
        } else if compute && p.stages.len() > 1 {
            Err("error: compute stage linked together with graphics stages".to_string())
        } else if !compute && !has(ShaderStage::Vertex) {
            Err("error: program has no vertex stage".to_string())
        } else {
            Ok(())
        };

        p.linked = result.is_ok().then(|| Linked {
            compute,
            layout: layout.clone(),
            block: vec![0; layout.block_size() as usize],
        });
        s.log.push(Command::LinkProgram {
            program,
            ok: result.is_ok(),
        });
        result
    }

    fn delete_program(&self, program: ProgramId) {
        let mut s = self.state.borrow_mut();
        if s.programs.remove(&program).is_some() {
            if s.bound_program == Some(program) {
                s.bound_program = None;
            }
            s.freed(ResourceKindCount::Program);
            s.log.push(Command::DeleteProgram(program));
        }
    }

    fn write_uniform(
        &self,
        program: ProgramId,
        offset: u32,
        bytes: &[u8],
    ) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        let p = s
            .programs
            .get_mut(&program)
            .ok_or(GfxError::UnknownProgram(program))?;
        let linked = p
            .linked
            .as_mut()
            .ok_or(GfxError::ProgramNotLinked(program))?;

        let start = offset as usize;
        let end = start + bytes.len();
        if end > linked.block.len() {
            return Err(GfxError::UniformOutOfRange {
                offset,
                len: bytes.len(),
                size: linked.layout.block_size(),
            });
        }
        linked.block[start..end].copy_from_slice(bytes);

        s.log.push(Command::WriteUniform {
            program,
            offset,
            len: bytes.len(),
        });
        Ok(())
    }

    fn set_sampler_unit(
        &self,
        program: ProgramId,
        binding: u32,
        unit: u32,
    ) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        s.programs
            .get_mut(&program)
            .ok_or(GfxError::UnknownProgram(program))?
            .sampler_units
            .insert(binding, unit);
        s.log.push(Command::SetSamplerUnit {
            program,
            binding,
            unit,
        });
        Ok(())
    }

    fn use_program(&self, program: Option<ProgramId>) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        if let Some(p) = program {
            s.linked(p)?;
        }
        s.bound_program = program;
        s.log.push(Command::UseProgram(program));
        Ok(())
    }

    fn bind_image_texture(
        &self,
        unit: u32,
        texture: TextureId,
        access: ImageAccess,
    ) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        if !s.textures.contains_key(&texture) {
            return Err(GfxError::UnknownTexture(texture));
        }
        s.units.bind_image(unit, texture);
        s.log.push(Command::BindImage {
            unit,
            texture,
            access,
        });
        Ok(())
    }

    fn bind_texture_unit(&self, unit: u32, texture: TextureId) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        if !s.textures.contains_key(&texture) {
            return Err(GfxError::UnknownTexture(texture));
        }
        s.units.bind_texture(unit, texture);
        s.log.push(Command::BindTextureUnit { unit, texture });
        Ok(())
    }

    fn set_viewport(&self, width: u32, height: u32) {
        self.push(Command::SetViewport { width, height });
    }

    fn create_vertex_array(&self, vertices: &[QuadVertex]) -> VertexArrayId {
        let mut s = self.state.borrow_mut();
        let id = VertexArrayId::from_raw(s.alloc(ResourceKindCount::VertexArray));
        s.vertex_arrays.insert(id, vertices.len() as u32);
        id
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        let mut s = self.state.borrow_mut();
        if s.vertex_arrays.remove(&vertex_array).is_some() {
            if s.bound_vertex_array == Some(vertex_array) {
                s.bound_vertex_array = None;
            }
            s.freed(ResourceKindCount::VertexArray);
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        if let Some(v) = vertex_array {
            if !s.vertex_arrays.contains_key(&v) {
                return Err(GfxError::UnknownVertexArray(v));
            }
        }
        s.bound_vertex_array = vertex_array;
        s.log.push(Command::BindVertexArray(vertex_array));
        Ok(())
    }

    fn dispatch_compute(&self, groups: [u32; 3]) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        let program = s.bound_program.ok_or(GfxError::NoProgramBound)?;
        let linked = s.linked(program)?;
        if !linked.compute {
            return Err(GfxError::WrongPipelineKind(program, "compute"));
        }
        let images = s
            .units
            .storage_images(&linked.layout, |t| s.textures.get(&t).copied())?;

        s.units.mark_written(images.into_iter().map(|(_, t)| t));
        s.log.push(Command::Dispatch(groups));
        Ok(())
    }

    fn memory_barrier(&self, barrier: MemoryBarrier) {
        let mut s = self.state.borrow_mut();
        s.units.barrier();
        s.log.push(Command::Barrier(barrier));
    }

    fn draw_arrays(&self, first: u32, count: u32) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        if !s.in_frame {
            return Err(GfxError::NoActiveFrame);
        }
        let program = s.bound_program.ok_or(GfxError::NoProgramBound)?;
        let vertex_array = s.bound_vertex_array.ok_or(GfxError::NoVertexArrayBound)?;
        let p = s
            .programs
            .get(&program)
            .ok_or(GfxError::UnknownProgram(program))?;
        let linked = p.linked.as_ref().ok_or(GfxError::ProgramNotLinked(program))?;
        if linked.compute {
            return Err(GfxError::WrongPipelineKind(program, "render"));
        }
        s.units.sampled_textures(&linked.layout, &p.sampler_units)?;

        debug_assert!(
            first + count <= s.vertex_arrays.get(&vertex_array).copied().unwrap_or(0),
            "draw range exceeds vertex array"
        );
        s.log.push(Command::Draw { first, count });
        Ok(())
    }

    fn begin_frame(&self) -> Result<FrameStatus, GfxError> {
        let mut s = self.state.borrow_mut();
        s.in_frame = true;
        s.log.push(Command::BeginFrame);
        Ok(FrameStatus::Ready)
    }

    fn present(&self) -> Result<(), GfxError> {
        let mut s = self.state.borrow_mut();
        if s.in_frame {
            s.in_frame = false;
            s.frames_presented += 1;
            s.log.push(Command::Present);
        }
        Ok(())
    }

    fn resize_surface(&self, width: u32, height: u32) {
        let mut s = self.state.borrow_mut();
        s.surface = Some((width, height));
        s.log.push(Command::ResizeSurface { width, height });
    }

    fn surface_size(&self) -> Option<(u32, u32)> {
        self.state.borrow().surface
    }

    fn info(&self) -> ContextInfo {
        ContextInfo {
            adapter: "recording".to_string(),
            backend: "none".to_string(),
            driver: env!("CARGO_PKG_VERSION").to_string(),
            surface_format: "none".to_string(),
        }
    }

    fn read_texture_rgba8(&self, texture: TextureId) -> Result<(u32, u32, Vec<u8>), GfxError> {
        let s = self.state.borrow();
        let desc = s
            .textures
            .get(&texture)
            .ok_or(GfxError::UnknownTexture(texture))?;
        if desc.format != TextureFormat::Color(ColorFormat::Rgba8) || desc.samples > 1 {
            return Err(GfxError::Readback(format!(
                "texture {texture} is not single-sampled rgba8"
            )));
        }
        Ok((
            desc.width,
            desc.height,
            vec![0; (desc.width * desc.height * 4) as usize],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::SamplingParams;

    fn rgba8(width: u32, height: u32) -> TextureDesc {
        TextureDesc {
            width,
            height,
            format: TextureFormat::Color(ColorFormat::Rgba8),
            samples: 1,
            sampling: Some(SamplingParams::CANVAS),
        }
    }

    fn linked_program(ctx: &RecordingContext, stages: &[ShaderStage], layout: &UniformLayout) -> ProgramId {
        let program = ctx.create_program();
        for &stage in stages {
            let id = ctx.compile_stage(stage, "source").unwrap();
            ctx.attach_stage(program, id).unwrap();
            ctx.delete_stage(id);
        }
        ctx.link_program(program, layout).unwrap();
        program
    }

    // ── ids and counters ──────────────────────────────────────────────────

    #[test]
    fn ids_start_at_one_and_never_repeat() {
        let ctx = RecordingContext::new();
        let a = ctx.create_texture(&rgba8(2, 2)).unwrap();
        ctx.delete_texture(a);
        let b = ctx.create_texture(&rgba8(2, 2)).unwrap();
        assert_eq!(a.raw(), 1);
        assert_ne!(a, b);
        assert_eq!(ctx.created(ResourceKindCount::Texture), 2);
        assert_eq!(ctx.deleted(ResourceKindCount::Texture), 1);
    }

    #[test]
    fn deleting_unknown_ids_is_a_no_op() {
        let ctx = RecordingContext::new();
        ctx.delete_texture(TextureId::from_raw(9));
        ctx.delete_framebuffer(FramebufferId::from_raw(9));
        ctx.delete_program(ProgramId::from_raw(9));
        assert_eq!(ctx.deleted(ResourceKindCount::Texture), 0);
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn zero_sized_texture_is_rejected() {
        let ctx = RecordingContext::new();
        assert!(matches!(
            ctx.create_texture(&rgba8(0, 4)),
            Err(GfxError::InvalidSize { width: 0, height: 4 })
        ));
    }

    // ── linking ───────────────────────────────────────────────────────────

    #[test]
    fn link_rejects_empty_and_mixed_programs() {
        let ctx = RecordingContext::new();
        let layout = UniformLayout::default();

        let empty = ctx.create_program();
        assert!(ctx.link_program(empty, &layout).is_err());

        let mixed = ctx.create_program();
        for stage in [ShaderStage::Compute, ShaderStage::Vertex] {
            let id = ctx.compile_stage(stage, "x").unwrap();
            ctx.attach_stage(mixed, id).unwrap();
        }
        assert!(ctx.link_program(mixed, &layout).is_err());
        assert!(matches!(
            ctx.use_program(Some(mixed)),
            Err(GfxError::ProgramNotLinked(_))
        ));
    }

    #[test]
    fn failing_stage_returns_log() {
        let ctx = RecordingContext::new();
        ctx.fail_stage(ShaderStage::Fragment);
        let log = ctx.compile_stage(ShaderStage::Fragment, "x").unwrap_err();
        assert!(log.contains("Fragment Shader"));
        assert!(ctx.compile_stage(ShaderStage::Vertex, "x").is_ok());
        assert!(ctx.compile_stage(ShaderStage::Vertex, "  \n").is_err());
    }

    #[test]
    fn uniform_writes_land_in_the_block() {
        let ctx = RecordingContext::new();
        let layout = UniformLayout::builder()
            .field("a", crate::gfx::UniformType::UInt)
            .build();
        let program = linked_program(&ctx, &[ShaderStage::Compute], &layout);

        ctx.write_uniform(program, 0, &7u32.to_ne_bytes()).unwrap();
        let bytes = ctx.uniform_bytes(program).unwrap();
        assert_eq!(&bytes[..4], &7u32.to_ne_bytes());
        assert!(matches!(
            ctx.write_uniform(program, 16, &[0; 4]),
            Err(GfxError::UniformOutOfRange { .. })
        ));
    }

    // ── commands ──────────────────────────────────────────────────────────

    #[test]
    fn sampling_after_dispatch_requires_barrier() {
        let ctx = RecordingContext::new();
        let tex = ctx.create_texture(&rgba8(4, 4)).unwrap();

        let compute_layout = UniformLayout::builder()
            .storage_image("Output", ColorFormat::Rgba8, ImageAccess::WriteOnly)
            .build();
        let screen_layout = UniformLayout::builder().sampler("BaseTexture").build();
        let compute = linked_program(&ctx, &[ShaderStage::Compute], &compute_layout);
        let screen = linked_program(
            &ctx,
            &[ShaderStage::Vertex, ShaderStage::Fragment],
            &screen_layout,
        );
        let quad = ctx.create_vertex_array(&[QuadVertex {
            position: [0.0; 3],
            tex_coord: [0.0; 2],
        }; 6]);

        ctx.begin_frame().unwrap();
        ctx.use_program(Some(compute)).unwrap();
        ctx.bind_image_texture(0, tex, ImageAccess::WriteOnly).unwrap();
        ctx.dispatch_compute([1, 1, 1]).unwrap();

        ctx.use_program(Some(screen)).unwrap();
        ctx.bind_texture_unit(0, tex).unwrap();
        ctx.bind_vertex_array(Some(quad)).unwrap();
        assert!(matches!(ctx.draw_arrays(0, 6), Err(GfxError::MissingBarrier(t)) if t == tex));

        ctx.memory_barrier(MemoryBarrier::ShaderImageAccess);
        ctx.draw_arrays(0, 6).unwrap();
        ctx.present().unwrap();
        assert_eq!(ctx.frames_presented(), 1);
    }

    #[test]
    fn dispatch_needs_a_compute_program() {
        let ctx = RecordingContext::new();
        assert!(matches!(
            ctx.dispatch_compute([1, 1, 1]),
            Err(GfxError::NoProgramBound)
        ));

        let screen = linked_program(
            &ctx,
            &[ShaderStage::Vertex],
            &UniformLayout::default(),
        );
        ctx.use_program(Some(screen)).unwrap();
        assert!(matches!(
            ctx.dispatch_compute([1, 1, 1]),
            Err(GfxError::WrongPipelineKind(_, "compute"))
        ));
    }

    #[test]
    fn draw_outside_frame_is_rejected() {
        let ctx = RecordingContext::new();
        assert!(matches!(ctx.draw_arrays(0, 6), Err(GfxError::NoActiveFrame)));
        // present without a frame is ignored
        ctx.present().unwrap();
        assert_eq!(ctx.frames_presented(), 0);
    }
}
