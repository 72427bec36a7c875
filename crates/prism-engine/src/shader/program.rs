use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use glam::Mat4;

use super::layouts::{names, SPHERE_MEMBERS};
use super::{ShaderError, ShaderSourceLoader, UniformValue};
use crate::camera::Camera;
use crate::gfx::{
    OwnedProgram, OwnedStage, ProgramId, ShaderStage, SharedContext, UniformLayout,
    UniformLocation, UniformType,
};
use crate::logging::log_block;
use crate::scene::{Sphere, MAX_SPHERES};

/// What happens when a supplied stage fails to load or compile.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum LinkPolicy {
    /// Log the failure, leave the stage out, and link whatever compiled.
    #[default]
    Permissive,
    /// Abort on the first failed stage.
    Strict,
}

/// Stage paths of a graphics program. `None` means the stage is absent.
#[derive(Debug, Copy, Clone)]
pub struct GraphicsStages<'a> {
    pub vertex: &'a Path,
    pub fragment: &'a Path,
    pub geometry: Option<&'a Path>,
    pub tess_control: Option<&'a Path>,
    pub tess_eval: Option<&'a Path>,
}

impl<'a> GraphicsStages<'a> {
    pub fn new(vertex: &'a Path, fragment: &'a Path) -> Self {
        Self {
            vertex,
            fragment,
            geometry: None,
            tess_control: None,
            tess_eval: None,
        }
    }

    fn iter(&self) -> [(ShaderStage, Option<&'a Path>); 5] {
        [
            (ShaderStage::Vertex, Some(self.vertex)),
            (ShaderStage::Fragment, Some(self.fragment)),
            (ShaderStage::Geometry, self.geometry),
            (ShaderStage::TessControl, self.tess_control),
            (ShaderStage::TessEval, self.tess_eval),
        ]
    }
}

#[derive(Debug, Default, Copy, Clone)]
struct SphereLocations {
    kind: Option<UniformLocation>,
    radius: Option<UniformLocation>,
    center: Option<UniformLocation>,
    albedo: Option<UniformLocation>,
}

#[derive(Debug)]
struct Locations {
    model_view_projection: Option<UniformLocation>,
    sphere_num: Option<UniformLocation>,
    /// Texture unit -> sampler location.
    textures: BTreeMap<u32, Option<UniformLocation>>,
    spheres: [SphereLocations; MAX_SPHERES],
    custom: HashMap<String, Option<UniformLocation>>,
}

impl Default for Locations {
    fn default() -> Self {
        Self {
            model_view_projection: None,
            sphere_num: None,
            textures: BTreeMap::new(),
            spheres: [SphereLocations::default(); MAX_SPHERES],
            custom: HashMap::new(),
        }
    }
}

/// A program and the uniform locations resolved against it.
///
/// Locations are resolved once after linking and stay valid until the shader
/// is dropped; there is no relinking. Under [`LinkPolicy::Permissive`] a
/// failed link still yields a `Shader`; [`is_linked`](Self::is_linked) is then
/// false and callers skip the pass that uses it.
pub struct Shader {
    ctx: SharedContext,
    program: OwnedProgram,
    layout: UniformLayout,
    locations: Locations,
    linked: bool,
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("program", &self.program)
            .field("linked", &self.linked)
            .field("locations", &self.locations)
            .finish()
    }
}

impl Shader {
    /// Compiles and links a vertex/fragment program with optional
    /// geometry and tessellation stages.
    pub fn link_graphics(
        ctx: SharedContext,
        loader: &dyn ShaderSourceLoader,
        stages: GraphicsStages<'_>,
        layout: UniformLayout,
        policy: LinkPolicy,
    ) -> Result<Self, ShaderError> {
        Self::link(ctx, loader, &stages.iter(), layout, policy)
    }

    pub fn link_compute(
        ctx: SharedContext,
        loader: &dyn ShaderSourceLoader,
        compute: Option<&Path>,
        layout: UniformLayout,
        policy: LinkPolicy,
    ) -> Result<Self, ShaderError> {
        Self::link(ctx, loader, &[(ShaderStage::Compute, compute)], layout, policy)
    }

    fn link(
        ctx: SharedContext,
        loader: &dyn ShaderSourceLoader,
        stages: &[(ShaderStage, Option<&Path>)],
        layout: UniformLayout,
        policy: LinkPolicy,
    ) -> Result<Self, ShaderError> {
        let program = OwnedProgram::new(ctx.clone(), ctx.create_program());

        // Released when this function returns, whatever the link outcome.
        let mut compiled = Vec::with_capacity(stages.len());
        for &(stage, path) in stages {
            let Some(path) = path else {
                continue;
            };

            let source = match loader.load(stage, path) {
                Ok(source) => source,
                Err(e) => {
                    log::error!("{e}");
                    if policy == LinkPolicy::Strict {
                        return Err(e);
                    }
                    continue;
                }
            };

            match ctx.compile_stage(stage, &source) {
                Ok(id) => compiled.push(OwnedStage::new(ctx.clone(), id)),
                Err(compile_log) => {
                    log_block(
                        module_path!(),
                        log::Level::Error,
                        &format!(" ======= {} log ======= ", stage.label()),
                        &compile_log,
                    );
                    if policy == LinkPolicy::Strict {
                        return Err(ShaderError::Compile {
                            stage,
                            log: compile_log,
                        });
                    }
                }
            }
        }

        for stage in &compiled {
            ctx.attach_stage(program.id(), stage.id())?;
        }

        let linked = ctx.link_program(program.id(), &layout);
        drop(compiled);
        let linked = match linked {
            Ok(()) => true,
            Err(link_log) => {
                log_block(
                    module_path!(),
                    log::Level::Error,
                    " ======= Program log ======= ",
                    &link_log,
                );
                if policy == LinkPolicy::Strict {
                    return Err(ShaderError::Link(link_log));
                }
                false
            }
        };

        Ok(Self {
            ctx,
            program,
            layout,
            locations: Locations::default(),
            linked,
        })
    }

    /// False when a permissive link failed; the program cannot be bound.
    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    #[inline]
    pub fn program_id(&self) -> ProgramId {
        self.program.id()
    }

    /// Makes this program current.
    pub fn bind(&self) -> Result<(), ShaderError> {
        self.ctx.use_program(Some(self.program.id()))?;
        Ok(())
    }

    /// Lookup in the linked interface; `None` for names the program lacks.
    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.layout.location(name)
    }

    /// Caches `FrameIndex`, `SphereNum` and every `Sphere[i]` member.
    pub fn resolve_ray_uniform_locations(&mut self) {
        self.add_custom_uniform_location(names::FRAME_INDEX);
        self.locations.sphere_num = self.layout.location(names::SPHERE_NUM);

        let [kind, radius, center, albedo] = SPHERE_MEMBERS.map(|(member, _)| member);
        for (i, slot) in self.locations.spheres.iter_mut().enumerate() {
            *slot = SphereLocations {
                kind: self.layout.location(&names::sphere_member(i, kind)),
                radius: self.layout.location(&names::sphere_member(i, radius)),
                center: self.layout.location(&names::sphere_member(i, center)),
                albedo: self.layout.location(&names::sphere_member(i, albedo)),
            };
        }
    }

    /// Caches the MVP matrix and binds `BaseTexture` to texture unit 0.
    pub fn resolve_screen_uniform_locations(&mut self) {
        self.locations.model_view_projection = self.layout.location(names::MODEL_VIEW_PROJECTION);
        self.locations
            .textures
            .insert(0, self.layout.location(names::BASE_TEXTURE));
    }

    /// Registers `name` for [`Shader::set_uniform`] and returns its location.
    pub fn add_custom_uniform_location(&mut self, name: &str) -> Option<UniformLocation> {
        let location = self.layout.location(name);
        if location.is_none() {
            log::debug!("uniform `{name}` is not part of program {}", self.program.id());
        }
        self.locations.custom.insert(name.to_string(), location);
        location
    }

    /// Uploads `value` to a registered uniform.
    ///
    /// Names registered but absent from the program are a no-op.
    pub fn set_uniform(&self, name: &str, value: UniformValue) -> Result<(), ShaderError> {
        let location = *self
            .locations
            .custom
            .get(name)
            .ok_or_else(|| ShaderError::UnknownUniform(name.to_string()))?;
        self.upload(name, location, value)
    }

    /// Uploads `projection * model` and points every cached sampler at its
    /// texture unit.
    ///
    /// `use_texture` is forwarded to a registered `UseTexture` uniform, if any.
    pub fn transfer_basic_transformation_uniforms(
        &self,
        model: &Mat4,
        camera: &Camera,
        use_texture: bool,
    ) -> Result<(), ShaderError> {
        let mvp = *camera.projection() * *model;
        self.upload(
            names::MODEL_VIEW_PROJECTION,
            self.locations.model_view_projection,
            UniformValue::Mat4(mvp),
        )?;

        for (&unit, &location) in &self.locations.textures {
            self.upload(names::BASE_TEXTURE, location, UniformValue::Int(unit as i32))?;
        }

        if self.locations.custom.contains_key(names::USE_TEXTURE) {
            self.set_uniform(names::USE_TEXTURE, UniformValue::Int(i32::from(use_texture)))?;
        }
        Ok(())
    }

    /// Uploads the sphere count followed by each sphere's members.
    pub fn transfer_sphere_uniforms(&self, spheres: &[Sphere]) -> Result<(), ShaderError> {
        if spheres.len() > MAX_SPHERES {
            return Err(ShaderError::CapacityExceeded {
                len: spheres.len(),
                capacity: MAX_SPHERES,
            });
        }

        self.upload(
            names::SPHERE_NUM,
            self.locations.sphere_num,
            UniformValue::Int(spheres.len() as i32),
        )?;

        for (sphere, slot) in spheres.iter().zip(&self.locations.spheres) {
            self.upload(names::SPHERE, slot.kind, UniformValue::Int(sphere.kind.as_i32()))?;
            self.upload(names::SPHERE, slot.radius, UniformValue::Float(sphere.radius))?;
            self.upload(names::SPHERE, slot.center, UniformValue::Vec3(sphere.center))?;
            self.upload(names::SPHERE, slot.albedo, UniformValue::Vec3(sphere.albedo))?;
        }
        Ok(())
    }

    fn upload(
        &self,
        name: &str,
        location: Option<UniformLocation>,
        value: UniformValue,
    ) -> Result<(), ShaderError> {
        match location {
            None => Ok(()),
            Some(UniformLocation::Block { offset, ty }) => {
                if ty != value.ty() {
                    return Err(ShaderError::TypeMismatch {
                        name: name.to_string(),
                        expected: ty,
                        found: value.ty(),
                    });
                }
                self.ctx
                    .write_uniform(self.program.id(), offset, &value.to_bytes())?;
                Ok(())
            }
            Some(UniformLocation::Sampler { binding }) => match value {
                UniformValue::Int(unit) if unit >= 0 => {
                    self.ctx
                        .set_sampler_unit(self.program.id(), binding, unit as u32)?;
                    Ok(())
                }
                other => Err(ShaderError::TypeMismatch {
                    name: name.to_string(),
                    expected: UniformType::Int,
                    found: other.ty(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glam::Vec3;

    use super::*;
    use crate::gfx::recording::{Command, RecordingContext, ResourceKindCount};
    use crate::scene::{demo_scene, MaterialKind};
    use crate::shader::{ray_uniform_layout, screen_uniform_layout, MemorySources};

    const VERT: &str = "screen.vert.wgsl";
    const FRAG: &str = "screen.frag.wgsl";
    const COMP: &str = "raytracer.wgsl";

    fn sources() -> MemorySources {
        MemorySources::new()
            .with(VERT, "@vertex fn vs_main() {}")
            .with(FRAG, "@fragment fn fs_main() {}")
            .with(COMP, "@compute fn cs_main() {}")
    }

    fn setup() -> (Rc<RecordingContext>, SharedContext) {
        let rec = Rc::new(RecordingContext::new());
        let ctx: SharedContext = rec.clone();
        (rec, ctx)
    }

    fn ray_shader(ctx: &SharedContext) -> Shader {
        let mut shader = Shader::link_compute(
            ctx.clone(),
            &sources(),
            Some(Path::new(COMP)),
            ray_uniform_layout(),
            LinkPolicy::Permissive,
        )
        .unwrap();
        shader.resolve_ray_uniform_locations();
        shader
    }

    fn uniform_writes(rec: &RecordingContext) -> usize {
        rec.commands()
            .iter()
            .filter(|c| matches!(c, Command::WriteUniform { .. }))
            .count()
    }

    // ── linking ───────────────────────────────────────────────────────────

    #[test]
    fn graphics_link_releases_stages_and_keeps_program() {
        let (rec, ctx) = setup();
        let shader = Shader::link_graphics(
            ctx.clone(),
            &sources(),
            GraphicsStages::new(Path::new(VERT), Path::new(FRAG)),
            screen_uniform_layout(),
            LinkPolicy::Permissive,
        )
        .unwrap();

        assert_eq!(rec.created(ResourceKindCount::Stage), 2);
        assert_eq!(rec.live(ResourceKindCount::Stage), 0);
        assert_eq!(
            rec.program_stages(shader.program_id()),
            vec![ShaderStage::Vertex, ShaderStage::Fragment]
        );

        drop(shader);
        assert_eq!(rec.live(ResourceKindCount::Program), 0);
    }

    #[test]
    fn permissive_link_skips_failed_fragment() {
        let (rec, ctx) = setup();
        rec.fail_stage(ShaderStage::Fragment);

        let shader = Shader::link_graphics(
            ctx.clone(),
            &sources(),
            GraphicsStages::new(Path::new(VERT), Path::new(FRAG)),
            screen_uniform_layout(),
            LinkPolicy::Permissive,
        )
        .unwrap();
        assert_eq!(
            rec.program_stages(shader.program_id()),
            vec![ShaderStage::Vertex]
        );
        assert_eq!(rec.live(ResourceKindCount::Stage), 0);
    }

    #[test]
    fn unreadable_stage_is_treated_as_absent() {
        let (rec, ctx) = setup();
        let only_vertex = MemorySources::new().with(VERT, "@vertex fn vs_main() {}");

        let shader = Shader::link_graphics(
            ctx.clone(),
            &only_vertex,
            GraphicsStages::new(Path::new(VERT), Path::new(FRAG)),
            screen_uniform_layout(),
            LinkPolicy::Permissive,
        )
        .unwrap();
        assert_eq!(
            rec.program_stages(shader.program_id()),
            vec![ShaderStage::Vertex]
        );
    }

    #[test]
    fn strict_link_fails_on_first_bad_stage_and_cleans_up() {
        let (rec, ctx) = setup();
        rec.fail_stage(ShaderStage::Fragment);

        let err = Shader::link_graphics(
            ctx.clone(),
            &sources(),
            GraphicsStages::new(Path::new(VERT), Path::new(FRAG)),
            screen_uniform_layout(),
            LinkPolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(rec.live(ResourceKindCount::Stage), 0);
        assert_eq!(rec.live(ResourceKindCount::Program), 0);
    }

    #[test]
    fn strict_link_failure_releases_everything() {
        let (rec, ctx) = setup();

        let err = Shader::link_compute(
            ctx.clone(),
            &sources(),
            None,
            ray_uniform_layout(),
            LinkPolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, ShaderError::Link(_)));
        assert_eq!(rec.live(ResourceKindCount::Program), 0);
        assert_eq!(rec.live(ResourceKindCount::Stage), 0);
    }

    #[test]
    fn permissive_link_failure_yields_unlinked_shader() {
        let (rec, ctx) = setup();
        rec.fail_stage(ShaderStage::Compute);

        let shader = Shader::link_compute(
            ctx.clone(),
            &sources(),
            Some(Path::new(COMP)),
            ray_uniform_layout(),
            LinkPolicy::Permissive,
        )
        .unwrap();
        assert!(!shader.is_linked());
        assert!(shader.bind().is_err());
        assert_eq!(rec.live(ResourceKindCount::Stage), 0);

        drop(shader);
        assert_eq!(rec.live(ResourceKindCount::Program), 0);
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn sphere_transfer_writes_count_then_members() {
        let (rec, ctx) = setup();
        let shader = ray_shader(&ctx);
        rec.clear_commands();

        let scene = demo_scene();
        shader.transfer_sphere_uniforms(scene.spheres()).unwrap();
        assert_eq!(uniform_writes(&rec), 1 + 4 * scene.len());

        let block = rec.uniform_bytes(shader.program_id()).unwrap();
        let read_i32 = |at: usize| i32::from_ne_bytes(block[at..at + 4].try_into().unwrap());
        let read_f32 = |at: usize| f32::from_ne_bytes(block[at..at + 4].try_into().unwrap());

        // SphereNum at 4, Sphere[i] at 16 + 48 i.
        assert_eq!(read_i32(4), scene.len() as i32);
        let ground = scene.spheres()[0];
        assert_eq!(read_i32(16), ground.kind.as_i32());
        assert_eq!(read_f32(20), ground.radius);
        assert_eq!(read_f32(32 + 4), ground.center.y);
        assert_eq!(read_f32(48), ground.albedo.x);
    }

    #[test]
    fn empty_scene_uploads_only_the_count() {
        let (rec, ctx) = setup();
        let shader = ray_shader(&ctx);
        rec.clear_commands();

        shader.transfer_sphere_uniforms(&[]).unwrap();
        assert_eq!(uniform_writes(&rec), 1);
    }

    #[test]
    fn full_and_overfull_scenes() {
        let (rec, ctx) = setup();
        let shader = ray_shader(&ctx);
        let sphere = Sphere::new(MaterialKind::Metal, 0.5, Vec3::ZERO, Vec3::ONE);

        rec.clear_commands();
        shader
            .transfer_sphere_uniforms(&[sphere; MAX_SPHERES])
            .unwrap();
        assert_eq!(uniform_writes(&rec), 1 + 4 * MAX_SPHERES);

        rec.clear_commands();
        let err = shader
            .transfer_sphere_uniforms(&[sphere; MAX_SPHERES + 1])
            .unwrap_err();
        assert!(matches!(
            err,
            ShaderError::CapacityExceeded { len: 33, capacity: 32 }
        ));
        assert_eq!(uniform_writes(&rec), 0);
    }

    #[test]
    fn custom_uniforms_are_type_checked() {
        let (rec, ctx) = setup();
        let shader = ray_shader(&ctx);

        shader
            .set_uniform(names::FRAME_INDEX, UniformValue::UInt(9))
            .unwrap();
        let block = rec.uniform_bytes(shader.program_id()).unwrap();
        assert_eq!(&block[0..4], &9u32.to_ne_bytes());

        let err = shader
            .set_uniform(names::FRAME_INDEX, UniformValue::Float(1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            ShaderError::TypeMismatch {
                expected: UniformType::UInt,
                found: UniformType::Float,
                ..
            }
        ));
    }

    #[test]
    fn unregistered_name_is_an_error_and_missing_name_is_a_noop() {
        let (rec, ctx) = setup();
        let mut shader = ray_shader(&ctx);

        assert!(matches!(
            shader.set_uniform("Nope", UniformValue::Int(1)),
            Err(ShaderError::UnknownUniform(_))
        ));

        assert_eq!(shader.add_custom_uniform_location("Nope"), None);
        rec.clear_commands();
        shader.set_uniform("Nope", UniformValue::Int(1)).unwrap();
        assert_eq!(uniform_writes(&rec), 0);
    }

    #[test]
    fn basic_transformation_uploads_mvp_and_sampler_unit() {
        let (rec, ctx) = setup();
        let mut shader = Shader::link_graphics(
            ctx.clone(),
            &sources(),
            GraphicsStages::new(Path::new(VERT), Path::new(FRAG)),
            screen_uniform_layout(),
            LinkPolicy::Permissive,
        )
        .unwrap();
        shader.resolve_screen_uniform_locations();

        let mut camera = Camera::new(-1.0, 1.0);
        camera.update_viewport(200, 100);
        let model = Mat4::from_scale(Vec3::new(200.0, 100.0, 1.0));
        shader
            .transfer_basic_transformation_uniforms(&model, &camera, true)
            .unwrap();

        let block = rec.uniform_bytes(shader.program_id()).unwrap();
        let expected = *camera.projection() * model;
        assert_eq!(&block[0..64], bytemuck::cast_slice::<f32, u8>(&expected.to_cols_array()));
        assert_eq!(rec.sampler_unit(shader.program_id(), 1), Some(0));
    }

    #[test]
    fn bind_makes_program_current() {
        let (rec, ctx) = setup();
        let shader = ray_shader(&ctx);
        shader.bind().unwrap();
        assert!(rec
            .commands()
            .contains(&Command::UseProgram(Some(shader.program_id()))));
        ctx.use_program(None).unwrap();
    }
}
