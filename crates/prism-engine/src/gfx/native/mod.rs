//! wgpu-backed graphics context.
//!
//! Resources are ordinary wgpu objects kept in id-keyed tables. Commands are
//! recorded into one pending `CommandEncoder`, each dispatch or draw as its
//! own pass, and submitted at `present` (or before a readback). wgpu orders
//! passes that touch the same texture; the explicit barrier is still tracked
//! so both contexts accept and reject the same call sequences.

mod convert;
mod program;
mod readback;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::validate::{framebuffer_status, UnitBindings};
use super::{
    Attachment, ClearTarget, ColorFormat, ContextInfo, FrameStatus, FramebufferId,
    FramebufferStatus, GfxError, GraphicsContext, ImageAccess, MemoryBarrier, ProgramId,
    QuadVertex, ShaderStage, StageId, TextureDesc, TextureFormat, TextureId, UniformLayout,
    VertexArrayId, UNIFORM_BLOCK_BINDING,
};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use program::{CompiledStage, LinkedPipeline, Pipeline};

struct NativeTexture {
    desc: TextureDesc,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: Option<wgpu::Sampler>,
}

struct NativeProgram {
    stages: Vec<Rc<CompiledStage>>,
    linked: Option<LinkedProgram>,
    sampler_units: HashMap<u32, u32>,
}

struct LinkedProgram {
    pipeline: LinkedPipeline,
    layout: UniformLayout,
    uniform: Option<wgpu::Buffer>,
    /// CPU copy of the uniform block; uploaded when dirty before a dispatch/draw.
    shadow: Vec<u8>,
    dirty: bool,
    /// Whether the pending encoder already reads `uniform`.
    in_pending: bool,
}

struct VertexArray {
    buffer: wgpu::Buffer,
    count: u32,
}

struct Frame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

#[derive(Default)]
struct State {
    next_id: u32,

    textures: HashMap<TextureId, NativeTexture>,
    framebuffers: HashMap<FramebufferId, BTreeMap<Attachment, TextureId>>,
    stages: HashMap<StageId, Rc<CompiledStage>>,
    programs: HashMap<ProgramId, NativeProgram>,
    vertex_arrays: HashMap<VertexArrayId, VertexArray>,

    bound_program: Option<ProgramId>,
    bound_vertex_array: Option<VertexArrayId>,
    units: UnitBindings,
    viewport: Option<(u32, u32)>,

    encoder: Option<wgpu::CommandEncoder>,
    frame: Option<Frame>,
    /// Window clear color, applied as the load op of the next surface pass.
    pending_clear: Option<wgpu::Color>,
}

impl State {
    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn linked(&self, program: ProgramId) -> Result<&LinkedProgram, GfxError> {
        self.programs
            .get(&program)
            .ok_or(GfxError::UnknownProgram(program))?
            .linked
            .as_ref()
            .ok_or(GfxError::ProgramNotLinked(program))
    }

    fn desc(&self, texture: TextureId) -> Option<TextureDesc> {
        self.textures.get(&texture).map(|t| t.desc)
    }

    /// Submits the pending encoder, if any.
    fn flush(&mut self, gpu: &Gpu) {
        if let Some(encoder) = self.encoder.take() {
            gpu.queue().submit(Some(encoder.finish()));
            for linked in self.programs.values_mut().filter_map(|p| p.linked.as_mut()) {
                linked.in_pending = false;
            }
        }
    }

    /// Uploads a program's dirty uniform block.
    ///
    /// `write_buffer` lands before the next submission, so a block already read
    /// by pending commands forces that submission first.
    fn upload_uniforms(&mut self, gpu: &Gpu, program: ProgramId) -> Result<(), GfxError> {
        let linked = self.linked(program)?;
        if linked.dirty && linked.in_pending {
            self.flush(gpu);
        }

        let linked = self
            .programs
            .get_mut(&program)
            .and_then(|p| p.linked.as_mut())
            .ok_or(GfxError::ProgramNotLinked(program))?;
        if linked.dirty {
            if let Some(buffer) = &linked.uniform {
                gpu.queue().write_buffer(buffer, 0, &linked.shadow);
            }
            linked.dirty = false;
        }
        linked.in_pending = true;
        Ok(())
    }

    /// Runs `f` with the pending encoder (created on demand) and a shared view of the state.
    fn record<R>(
        &mut self,
        gpu: &Gpu,
        f: impl FnOnce(&mut wgpu::CommandEncoder, &State) -> R,
    ) -> R {
        let mut encoder = self.encoder.take().unwrap_or_else(|| {
            gpu.device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("prism frame encoder"),
                })
        });
        let out = f(&mut encoder, self);
        self.encoder = Some(encoder);
        out
    }
}

/// Graphics context backed by wgpu and a window surface.
pub struct NativeContext {
    gpu: RefCell<Gpu>,
    state: RefCell<State>,
    border_clamp: bool,
}

impl NativeContext {
    /// Creates the device and surface for `window`.
    ///
    /// Blocks on adapter/device acquisition.
    pub fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let gpu = pollster::block_on(Gpu::new(window, init))?;
        let border_clamp = gpu
            .device()
            .features()
            .contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER);
        if !border_clamp {
            log::warn!("adapter lacks clamp-to-border sampling; canvas textures clamp to edge");
        }

        Ok(Self {
            gpu: RefCell::new(gpu),
            state: RefCell::new(State::default()),
            border_clamp,
        })
    }

    fn clear_pass(
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        color: wgpu::Color,
    ) {
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }
}

fn wgpu_color(rgba: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(rgba[0]),
        g: f64::from(rgba[1]),
        b: f64::from(rgba[2]),
        a: f64::from(rgba[3]),
    }
}

impl GraphicsContext for NativeContext {
    fn create_texture(&self, desc: &TextureDesc) -> Result<TextureId, GfxError> {
        let gpu = self.gpu.borrow();
        let max = gpu.device().limits().max_texture_dimension_2d;
        if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
            return Err(GfxError::InvalidSize {
                width: desc.width,
                height: desc.height,
            });
        }

        let format = convert::texture_format(desc.format);
        let sample_ok = desc.samples == 1
            || (matches!(desc.samples, 2 | 4 | 8)
                && gpu
                    .adapter()
                    .get_texture_format_features(format)
                    .flags
                    .sample_count_supported(desc.samples));
        if !sample_ok {
            return Err(GfxError::UnsupportedSampleCount {
                format: desc.format,
                samples: desc.samples,
            });
        }

        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("prism texture"),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: desc.samples,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: convert::texture_usages(desc.format, desc.samples),
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Only single-sampled color textures are ever sampled.
        let sampler = match (desc.format, desc.sampling) {
            (TextureFormat::Color(_), Some(params)) if desc.samples == 1 => Some(
                gpu.device()
                    .create_sampler(&convert::sampler_descriptor(params, self.border_clamp)),
            ),
            _ => None,
        };

        let mut state = self.state.borrow_mut();
        let id = TextureId::from_raw(state.alloc());
        state.textures.insert(
            id,
            NativeTexture {
                desc: *desc,
                texture,
                view,
                sampler,
            },
        );
        log::debug!(
            "texture {id}: {}x{} {:?} x{}",
            desc.width,
            desc.height,
            desc.format,
            desc.samples
        );
        Ok(id)
    }

    fn delete_texture(&self, texture: TextureId) {
        let mut state = self.state.borrow_mut();
        if state.textures.remove(&texture).is_some() {
            state.units.forget(texture);
        }
    }

    fn create_framebuffer(&self) -> FramebufferId {
        let mut state = self.state.borrow_mut();
        let id = FramebufferId::from_raw(state.alloc());
        state.framebuffers.insert(id, BTreeMap::new());
        id
    }

    fn attach_texture(
        &self,
        framebuffer: FramebufferId,
        attachment: Attachment,
        texture: TextureId,
    ) -> Result<(), GfxError> {
        let mut state = self.state.borrow_mut();
        if !state.textures.contains_key(&texture) {
            return Err(GfxError::UnknownTexture(texture));
        }
        state
            .framebuffers
            .get_mut(&framebuffer)
            .ok_or(GfxError::UnknownFramebuffer(framebuffer))?
            .insert(attachment, texture);
        Ok(())
    }

    fn check_framebuffer_status(&self, framebuffer: FramebufferId) -> FramebufferStatus {
        let state = self.state.borrow();
        match state.framebuffers.get(&framebuffer) {
            Some(table) => framebuffer_status(table, |t| state.desc(t)),
            None => FramebufferStatus::InvalidAttachment,
        }
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        self.state.borrow_mut().framebuffers.remove(&framebuffer);
    }

    fn clear_framebuffer(
        &self,
        framebuffer: Option<FramebufferId>,
        target: ClearTarget,
    ) -> Result<(), GfxError> {
        let gpu = self.gpu.borrow();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let Some(fb) = framebuffer else {
            // The surface has a single color target and no depth/stencil buffer.
            if let ClearTarget::Color { rgba, .. } = target {
                state.pending_clear = Some(wgpu_color(rgba));
            }
            return Ok(());
        };

        let table = state
            .framebuffers
            .get(&fb)
            .ok_or(GfxError::UnknownFramebuffer(fb))?;
        let attachment = match target {
            ClearTarget::Color { index, .. } => Attachment::Color(index),
            ClearTarget::Stencil(_) => Attachment::Stencil,
            ClearTarget::Depth(_) => return Ok(()),
        };
        let Some(&texture) = table.get(&attachment) else {
            log::trace!("framebuffer {fb}: nothing attached at {attachment:?}, clear skipped");
            return Ok(());
        };
        if !state.textures.contains_key(&texture) {
            return Err(GfxError::UnknownTexture(texture));
        }

        state.record(&gpu, |encoder, state| {
            let Some(tex) = state.textures.get(&texture) else {
                return;
            };
            match target {
                ClearTarget::Color { rgba, .. } => {
                    Self::clear_pass(encoder, &tex.view, wgpu_color(rgba));
                }
                ClearTarget::Stencil(value) => {
                    let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("prism stencil clear pass"),
                        color_attachments: &[],
                        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                            view: &tex.view,
                            depth_ops: None,
                            stencil_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(value as u32),
                                store: wgpu::StoreOp::Store,
                            }),
                        }),
                        timestamp_writes: None,
                        occlusion_query_set: None,
                        multiview_mask: None,
                    });
                }
                ClearTarget::Depth(_) => {}
            }
        });
        Ok(())
    }

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<StageId, String> {
        let ir = program::validate_stage(stage, source)?;

        let gpu = self.gpu.borrow();
        let module = gpu
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(stage.label()),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        let mut state = self.state.borrow_mut();
        let id = StageId::from_raw(state.alloc());
        state.stages.insert(
            id,
            Rc::new(CompiledStage {
                kind: stage,
                module,
                ir,
            }),
        );
        Ok(id)
    }

    fn delete_stage(&self, stage: StageId) {
        self.state.borrow_mut().stages.remove(&stage);
    }

    fn create_program(&self) -> ProgramId {
        let mut state = self.state.borrow_mut();
        let id = ProgramId::from_raw(state.alloc());
        state.programs.insert(
            id,
            NativeProgram {
                stages: Vec::new(),
                linked: None,
                sampler_units: HashMap::new(),
            },
        );
        id
    }

    fn attach_stage(&self, program: ProgramId, stage: StageId) -> Result<(), GfxError> {
        let mut state = self.state.borrow_mut();
        let Some(compiled) = state.stages.get(&stage).cloned() else {
            return Ok(());
        };
        state
            .programs
            .get_mut(&program)
            .ok_or(GfxError::UnknownProgram(program))?
            .stages
            .push(compiled);
        Ok(())
    }

    fn link_program(&self, program: ProgramId, layout: &UniformLayout) -> Result<(), String> {
        let gpu = self.gpu.borrow();
        let mut state = self.state.borrow_mut();
        let Some(p) = state.programs.get_mut(&program) else {
            return Err(format!("error: unknown program {program}"));
        };

        p.linked = None;
        let pipeline = program::link(gpu.device(), &p.stages, layout, gpu.surface_format())?;

        let size = layout.block_size();
        let uniform = (size > 0).then(|| {
            gpu.device().create_buffer(&wgpu::BufferDescriptor {
                label: Some("prism uniform block"),
                size: u64::from(size),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        p.linked = Some(LinkedProgram {
            pipeline,
            layout: layout.clone(),
            uniform,
            shadow: vec![0; size as usize],
            dirty: true,
            in_pending: false,
        });
        Ok(())
    }

    fn delete_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program).is_some() && state.bound_program == Some(program) {
            state.bound_program = None;
        }
    }

    fn write_uniform(
        &self,
        program: ProgramId,
        offset: u32,
        bytes: &[u8],
    ) -> Result<(), GfxError> {
        let mut state = self.state.borrow_mut();
        let linked = state
            .programs
            .get_mut(&program)
            .ok_or(GfxError::UnknownProgram(program))?
            .linked
            .as_mut()
            .ok_or(GfxError::ProgramNotLinked(program))?;

        let start = offset as usize;
        let end = start + bytes.len();
        if end > linked.shadow.len() {
            return Err(GfxError::UniformOutOfRange {
                offset,
                len: bytes.len(),
                size: linked.layout.block_size(),
            });
        }
        linked.shadow[start..end].copy_from_slice(bytes);
        linked.dirty = true;
        Ok(())
    }

    fn set_sampler_unit(
        &self,
        program: ProgramId,
        binding: u32,
        unit: u32,
    ) -> Result<(), GfxError> {
        self.state
            .borrow_mut()
            .programs
            .get_mut(&program)
            .ok_or(GfxError::UnknownProgram(program))?
            .sampler_units
            .insert(binding, unit);
        Ok(())
    }

    fn use_program(&self, program: Option<ProgramId>) -> Result<(), GfxError> {
        let mut state = self.state.borrow_mut();
        if let Some(p) = program {
            state.linked(p)?;
        }
        state.bound_program = program;
        Ok(())
    }

    fn bind_image_texture(
        &self,
        unit: u32,
        texture: TextureId,
        access: ImageAccess,
    ) -> Result<(), GfxError> {
        let mut state = self.state.borrow_mut();
        if !state.textures.contains_key(&texture) {
            return Err(GfxError::UnknownTexture(texture));
        }
        // Access is declared by the program layout; the bind only names the texture.
        log::trace!("image unit {unit} <- texture {texture} ({access:?})");
        state.units.bind_image(unit, texture);
        Ok(())
    }

    fn bind_texture_unit(&self, unit: u32, texture: TextureId) -> Result<(), GfxError> {
        let mut state = self.state.borrow_mut();
        if !state.textures.contains_key(&texture) {
            return Err(GfxError::UnknownTexture(texture));
        }
        state.units.bind_texture(unit, texture);
        Ok(())
    }

    fn set_viewport(&self, width: u32, height: u32) {
        self.state.borrow_mut().viewport = Some((width, height));
    }

    fn create_vertex_array(&self, vertices: &[QuadVertex]) -> VertexArrayId {
        let buffer = self
            .gpu
            .borrow()
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("prism vertex array"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let mut state = self.state.borrow_mut();
        let id = VertexArrayId::from_raw(state.alloc());
        state.vertex_arrays.insert(
            id,
            VertexArray {
                buffer,
                count: vertices.len() as u32,
            },
        );
        id
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        let mut state = self.state.borrow_mut();
        if state.vertex_arrays.remove(&vertex_array).is_some()
            && state.bound_vertex_array == Some(vertex_array)
        {
            state.bound_vertex_array = None;
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) -> Result<(), GfxError> {
        let mut state = self.state.borrow_mut();
        if let Some(v) = vertex_array {
            if !state.vertex_arrays.contains_key(&v) {
                return Err(GfxError::UnknownVertexArray(v));
            }
        }
        state.bound_vertex_array = vertex_array;
        Ok(())
    }

    fn dispatch_compute(&self, groups: [u32; 3]) -> Result<(), GfxError> {
        let gpu = self.gpu.borrow();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let program = state.bound_program.ok_or(GfxError::NoProgramBound)?;
        let linked = state.linked(program)?;
        if !matches!(linked.pipeline.pipeline, Pipeline::Compute(_)) {
            return Err(GfxError::WrongPipelineKind(program, "compute"));
        }
        let images = state
            .units
            .storage_images(&linked.layout, |t| state.desc(t))?;

        state.upload_uniforms(&gpu, program)?;
        state.record(&gpu, |encoder, state| {
            let Ok(linked) = state.linked(program) else {
                return;
            };
            let Pipeline::Compute(pipeline) = &linked.pipeline.pipeline else {
                return;
            };

            let mut entries = Vec::with_capacity(images.len() + 1);
            if let Some(buffer) = &linked.uniform {
                entries.push(wgpu::BindGroupEntry {
                    binding: UNIFORM_BLOCK_BINDING,
                    resource: buffer.as_entire_binding(),
                });
            }
            for (binding, texture) in &images {
                if let Some(tex) = state.textures.get(texture) {
                    entries.push(wgpu::BindGroupEntry {
                        binding: *binding,
                        resource: wgpu::BindingResource::TextureView(&tex.view),
                    });
                }
            }
            let bind_group = gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("prism compute bind group"),
                layout: &linked.pipeline.bind_group_layout,
                entries: &entries,
            });

            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("prism compute pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups[0], groups[1], groups[2]);
        });

        state.units.mark_written(images.into_iter().map(|(_, t)| t));
        Ok(())
    }

    fn memory_barrier(&self, barrier: MemoryBarrier) {
        // Pass boundaries already order the writes for wgpu.
        log::trace!("memory barrier {barrier:?}");
        self.state.borrow_mut().units.barrier();
    }

    fn draw_arrays(&self, first: u32, count: u32) -> Result<(), GfxError> {
        let gpu = self.gpu.borrow();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        if state.frame.is_none() {
            return Err(GfxError::NoActiveFrame);
        }
        let program = state.bound_program.ok_or(GfxError::NoProgramBound)?;
        let vertex_array = state
            .bound_vertex_array
            .ok_or(GfxError::NoVertexArrayBound)?;
        let p = state
            .programs
            .get(&program)
            .ok_or(GfxError::UnknownProgram(program))?;
        let linked = p.linked.as_ref().ok_or(GfxError::ProgramNotLinked(program))?;
        if !matches!(linked.pipeline.pipeline, Pipeline::Render(_)) {
            return Err(GfxError::WrongPipelineKind(program, "render"));
        }

        let sampled = state
            .units
            .sampled_textures(&linked.layout, &p.sampler_units)?;
        for &(_, texture) in &sampled {
            let tex = state
                .textures
                .get(&texture)
                .ok_or(GfxError::UnknownTexture(texture))?;
            let filterable = tex.sampler.is_some()
                && tex.desc.format != TextureFormat::Color(ColorFormat::Rgba32F);
            if !filterable {
                return Err(GfxError::NotFilterable(texture));
            }
        }

        state.upload_uniforms(&gpu, program)?;
        let load = match state.pending_clear.take() {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };

        state.record(&gpu, |encoder, state| {
            let (Some(frame), Ok(linked), Some(vao)) = (
                state.frame.as_ref(),
                state.linked(program),
                state.vertex_arrays.get(&vertex_array),
            ) else {
                return;
            };
            let Pipeline::Render(pipeline) = &linked.pipeline.pipeline else {
                return;
            };

            let mut entries = Vec::with_capacity(sampled.len() * 2 + 1);
            if let Some(buffer) = &linked.uniform {
                entries.push(wgpu::BindGroupEntry {
                    binding: UNIFORM_BLOCK_BINDING,
                    resource: buffer.as_entire_binding(),
                });
            }
            for (binding, texture) in &sampled {
                let Some(tex) = state.textures.get(texture) else {
                    continue;
                };
                let Some(sampler) = &tex.sampler else {
                    continue;
                };
                entries.push(wgpu::BindGroupEntry {
                    binding: *binding,
                    resource: wgpu::BindingResource::TextureView(&tex.view),
                });
                entries.push(wgpu::BindGroupEntry {
                    binding: *binding + 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                });
            }
            let bind_group = gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("prism render bind group"),
                layout: &linked.pipeline.bind_group_layout,
                entries: &entries,
            });

            let target = &frame.surface_texture.texture;
            let (vw, vh) = state
                .viewport
                .unwrap_or((target.width(), target.height()));
            let vw = vw.clamp(1, target.width());
            let vh = vh.clamp(1, target.height());

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("prism screen pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_viewport(0.0, 0.0, vw as f32, vh as f32, 0.0, 1.0);
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.set_vertex_buffer(0, vao.buffer.slice(..));
            let end = (first + count).min(vao.count);
            pass.draw(first.min(end)..end, 0..1);
        });
        Ok(())
    }

    fn begin_frame(&self) -> Result<FrameStatus, GfxError> {
        let mut state = self.state.borrow_mut();
        if state.frame.is_some() {
            return Ok(FrameStatus::Ready);
        }

        let mut gpu = self.gpu.borrow_mut();
        match gpu.acquire() {
            Ok(surface_texture) => {
                let view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                state.frame = Some(Frame {
                    surface_texture,
                    view,
                });
                Ok(FrameStatus::Ready)
            }
            Err(err) => match gpu.handle_surface_error(err) {
                SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                    Ok(FrameStatus::Skipped)
                }
                SurfaceErrorAction::Fatal => Err(GfxError::SurfaceLost),
            },
        }
    }

    fn present(&self) -> Result<(), GfxError> {
        let gpu = self.gpu.borrow();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let Some(Frame {
            surface_texture,
            view,
        }) = state.frame.take()
        else {
            return Ok(());
        };
        if let Some(color) = state.pending_clear.take() {
            state.record(&gpu, |encoder, _| Self::clear_pass(encoder, &view, color));
        }
        state.flush(&gpu);
        drop(view);
        surface_texture.present();
        Ok(())
    }

    fn resize_surface(&self, width: u32, height: u32) {
        self.gpu
            .borrow_mut()
            .resize(PhysicalSize::new(width, height));
    }

    fn surface_size(&self) -> Option<(u32, u32)> {
        let size = self.gpu.borrow().size();
        Some((size.width, size.height))
    }

    fn info(&self) -> ContextInfo {
        let gpu = self.gpu.borrow();
        let info = gpu.adapter().get_info();
        ContextInfo {
            adapter: format!("{} ({:?})", info.name, info.device_type),
            backend: format!("{:?}", info.backend),
            driver: format!("{} {}", info.driver, info.driver_info),
            surface_format: format!("{:?}", gpu.surface_format()),
        }
    }

    fn read_texture_rgba8(&self, texture: TextureId) -> Result<(u32, u32, Vec<u8>), GfxError> {
        let gpu = self.gpu.borrow();
        let mut state = self.state.borrow_mut();
        let desc = state.desc(texture).ok_or(GfxError::UnknownTexture(texture))?;
        if desc.format != TextureFormat::Color(ColorFormat::Rgba8) || desc.samples > 1 {
            return Err(GfxError::Readback(format!(
                "texture {texture} is not single-sampled rgba8"
            )));
        }

        // Pending dispatches may still be writing the texture.
        state.flush(&gpu);
        let tex = state
            .textures
            .get(&texture)
            .ok_or(GfxError::UnknownTexture(texture))?;
        let bytes = readback::read_rgba8(gpu.device(), gpu.queue(), &tex.texture)?;
        Ok((desc.width, desc.height, bytes))
    }
}
