//! WGSL stages and pipeline linking.
//!
//! Stages are parsed and validated with naga before wgpu sees them, so a bad
//! shader comes back as a compiler log instead of a device error. Linking
//! checks every `@group(0)` binding the stages declare against the program's
//! [`UniformLayout`], then builds the pipeline.

use std::rc::Rc;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::convert;
use crate::gfx::{QuadVertex, ResourceKind, ShaderStage, UniformLayout, UNIFORM_BLOCK_BINDING};

pub(super) struct CompiledStage {
    pub kind: ShaderStage,
    pub module: wgpu::ShaderModule,
    pub ir: naga::Module,
}

pub(super) enum Pipeline {
    Compute(wgpu::ComputePipeline),
    Render(wgpu::RenderPipeline),
}

pub(super) struct LinkedPipeline {
    pub pipeline: Pipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// Parses and validates one stage.
pub(super) fn validate_stage(stage: ShaderStage, source: &str) -> Result<naga::Module, String> {
    let naga_stage = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
        ShaderStage::Compute => naga::ShaderStage::Compute,
        ShaderStage::Geometry | ShaderStage::TessControl | ShaderStage::TessEval => {
            return Err(format!("error: {stage} stages are not available on wgpu"));
        }
    };

    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let entry = stage.entry_point();
    let found = module
        .entry_points
        .iter()
        .any(|ep| ep.name == entry && ep.stage == naga_stage);
    if !found {
        return Err(format!("error: no {stage} entry point named `{entry}`"));
    }

    Ok(module)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Slot {
    Uniform,
    StorageImage,
    Texture,
    Sampler,
}

fn slot_at(layout: &UniformLayout, binding: u32) -> Option<Slot> {
    if binding == UNIFORM_BLOCK_BINDING && layout.block_size() > 0 {
        return Some(Slot::Uniform);
    }
    layout.resources().iter().find_map(|r| match r.kind {
        ResourceKind::StorageImage { .. } if r.binding == binding => Some(Slot::StorageImage),
        ResourceKind::SampledTexture if r.binding == binding => Some(Slot::Texture),
        ResourceKind::SampledTexture if r.binding + 1 == binding => Some(Slot::Sampler),
        _ => None,
    })
}

/// Checks that every resource a stage declares has a matching slot in `layout`.
fn check_interface(
    kind: ShaderStage,
    ir: &naga::Module,
    layout: &UniformLayout,
) -> Result<(), String> {
    for (_, var) in ir.global_variables.iter() {
        let Some(rb) = &var.binding else { continue };
        let name = var.name.as_deref().unwrap_or("<unnamed>");

        if rb.group != 0 {
            return Err(format!(
                "error: {}: `{name}` is in bind group {}, only group 0 is bound",
                kind, rb.group
            ));
        }

        let inner = &ir.types[var.ty].inner;
        let matches = match (slot_at(layout, rb.binding), var.space, inner) {
            (Some(Slot::Uniform), naga::AddressSpace::Uniform, _) => {
                let size = inner.size(ir.to_ctx());
                if size > layout.block_size() {
                    return Err(format!(
                        "error: {}: uniform block `{name}` is {size} bytes, layout provides {}",
                        kind,
                        layout.block_size()
                    ));
                }
                true
            }
            (
                Some(Slot::StorageImage),
                naga::AddressSpace::Handle,
                naga::TypeInner::Image {
                    class: naga::ImageClass::Storage { .. },
                    ..
                },
            ) => true,
            (
                Some(Slot::Texture),
                naga::AddressSpace::Handle,
                naga::TypeInner::Image {
                    class: naga::ImageClass::Sampled { multi: false, .. },
                    ..
                },
            ) => true,
            (Some(Slot::Sampler), naga::AddressSpace::Handle, naga::TypeInner::Sampler { .. }) => {
                true
            }
            _ => false,
        };

        if !matches {
            return Err(format!(
                "error: {}: binding {} (`{name}`) does not match the program layout",
                kind, rb.binding
            ));
        }
    }
    Ok(())
}

fn bind_group_layout(
    device: &wgpu::Device,
    layout: &UniformLayout,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    let mut entries = Vec::new();
    if layout.block_size() > 0 {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: UNIFORM_BLOCK_BINDING,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
    }

    for resource in layout.resources() {
        match resource.kind {
            ResourceKind::StorageImage { format, access } => {
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: resource.binding,
                    visibility,
                    ty: wgpu::BindingType::StorageTexture {
                        access: convert::storage_access(access),
                        format: convert::color_format(format),
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                });
            }
            ResourceKind::SampledTexture => {
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: resource.binding,
                    visibility,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                });
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: resource.binding + 1,
                    visibility,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                });
            }
        }
    }

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("prism program bgl"),
        entries: &entries,
    })
}

const QUAD_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32x2  // tex_coord
];

fn quad_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &QUAD_ATTRS,
    }
}

/// Links `stages` into a compute or render pipeline.
///
/// Render pipelines target `surface_format` and consume [`QuadVertex`] triangle lists.
pub(super) fn link(
    device: &wgpu::Device,
    stages: &[Rc<CompiledStage>],
    layout: &UniformLayout,
    surface_format: wgpu::TextureFormat,
) -> Result<LinkedPipeline, String> {
    if stages.is_empty() {
        return Err("error: no shader stages attached".to_string());
    }
    for stage in stages {
        check_interface(stage.kind, &stage.ir, layout)?;
    }

    let find = |kind: ShaderStage| stages.iter().find(|s| s.kind == kind);

    if let Some(compute) = find(ShaderStage::Compute) {
        if stages.len() > 1 {
            return Err("error: compute stage linked together with graphics stages".to_string());
        }

        let bind_group_layout = bind_group_layout(device, layout, wgpu::ShaderStages::COMPUTE);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism compute pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("prism compute pipeline"),
            layout: Some(&pipeline_layout),
            module: &compute.module,
            entry_point: Some(ShaderStage::Compute.entry_point()),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        return Ok(LinkedPipeline {
            pipeline: Pipeline::Compute(pipeline),
            bind_group_layout,
        });
    }

    let Some(vertex) = find(ShaderStage::Vertex) else {
        return Err("error: program has no vertex stage".to_string());
    };
    let fragment = find(ShaderStage::Fragment);

    let bind_group_layout = bind_group_layout(
        device,
        layout,
        wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
    );
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("prism render pipeline layout"),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let targets = [Some(wgpu::ColorTargetState {
        format: surface_format,
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    })];

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("prism render pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex.module,
            entry_point: Some(ShaderStage::Vertex.entry_point()),
            compilation_options: Default::default(),
            buffers: &[quad_vertex_layout()],
        },
        fragment: fragment.map(|f| wgpu::FragmentState {
            module: &f.module,
            entry_point: Some(ShaderStage::Fragment.entry_point()),
            compilation_options: Default::default(),
            targets: &targets,
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    Ok(LinkedPipeline {
        pipeline: Pipeline::Render(pipeline),
        bind_group_layout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{ColorFormat, ImageAccess, UniformType};

    const COMPUTE: &str = r#"
@group(0) @binding(0) var<uniform> frame: vec4<u32>;
@group(0) @binding(1) var output: texture_storage_2d<rgba8unorm, write>;

@compute @workgroup_size(8, 8, 1)
fn cs_main(@builtin(global_invocation_id) id: vec3<u32>) {
    textureStore(output, vec2<i32>(id.xy), vec4<f32>(f32(frame.x), 0.0, 0.0, 1.0));
}
"#;

    #[test]
    fn valid_compute_stage_passes() {
        assert!(validate_stage(ShaderStage::Compute, COMPUTE).is_ok());
    }

    #[test]
    fn syntax_error_returns_a_log() {
        let log = validate_stage(ShaderStage::Compute, "fn cs_main( {").unwrap_err();
        assert!(!log.is_empty());
    }

    #[test]
    fn wrong_entry_point_is_rejected() {
        let log = validate_stage(ShaderStage::Vertex, COMPUTE).unwrap_err();
        assert!(log.contains("vs_main"), "{log}");
    }

    #[test]
    fn geometry_stage_is_unavailable() {
        assert!(validate_stage(ShaderStage::Geometry, COMPUTE).is_err());
    }

    #[test]
    fn interface_must_match_layout() {
        let ir = validate_stage(ShaderStage::Compute, COMPUTE).unwrap();
        let good = UniformLayout::builder()
            .field("frame", UniformType::Vec4)
            .storage_image("Output", ColorFormat::Rgba8, ImageAccess::WriteOnly)
            .build();
        assert!(check_interface(ShaderStage::Compute, &ir, &good).is_ok());

        // sampler where the shader expects a storage image
        let wrong = UniformLayout::builder()
            .field("frame", UniformType::Vec4)
            .sampler("Output")
            .build();
        assert!(check_interface(ShaderStage::Compute, &ir, &wrong).is_err());

        // a single u32 field still rounds up to the 16 bytes of a vec4
        let small = UniformLayout::builder()
            .field("frame", UniformType::UInt)
            .storage_image("Output", ColorFormat::Rgba8, ImageAccess::WriteOnly)
            .build();
        assert!(check_interface(ShaderStage::Compute, &ir, &small).is_ok());
    }

    #[test]
    fn layout_slots() {
        let layout = UniformLayout::builder()
            .field("x", UniformType::UInt)
            .storage_image("Output", ColorFormat::Rgba8, ImageAccess::WriteOnly)
            .sampler("BaseTexture")
            .build();
        assert_eq!(slot_at(&layout, 0), Some(Slot::Uniform));
        assert_eq!(slot_at(&layout, 1), Some(Slot::StorageImage));
        assert_eq!(slot_at(&layout, 2), Some(Slot::Texture));
        assert_eq!(slot_at(&layout, 3), Some(Slot::Sampler));
        assert_eq!(slot_at(&layout, 4), None);
    }

    // ── shipped shaders ───────────────────────────────────────────────────

    fn shipped(name: &str) -> String {
        let path = format!("{}/shaders/{name}", env!("CARGO_MANIFEST_DIR"));
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{path}: {e}"))
    }

    #[test]
    fn ray_tracer_matches_its_layout() {
        let ir = validate_stage(ShaderStage::Compute, &shipped("raytracer.wgsl")).unwrap();
        let layout = crate::shader::ray_uniform_layout();
        check_interface(ShaderStage::Compute, &ir, &layout).unwrap();

        let (_, uniforms) = ir
            .global_variables
            .iter()
            .find(|(_, v)| v.space == naga::AddressSpace::Uniform)
            .unwrap();
        assert_eq!(ir.types[uniforms.ty].inner.size(ir.to_ctx()), layout.block_size());
    }

    #[test]
    fn screen_stages_match_their_layout() {
        let layout = crate::shader::screen_uniform_layout();
        for (stage, file) in [
            (ShaderStage::Vertex, "screen.vert.wgsl"),
            (ShaderStage::Fragment, "screen.frag.wgsl"),
        ] {
            let ir = validate_stage(stage, &shipped(file)).unwrap();
            check_interface(stage, &ir, &layout).unwrap();
        }
    }
}
