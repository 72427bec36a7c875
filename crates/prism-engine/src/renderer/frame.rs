use std::path::Path;

use glam::{Mat4, Vec3};

use super::{dispatch_group_count, write_texture, RendererConfig, RendererError, ScreenQuad};
use crate::camera::Camera;
use crate::canvas::{Canvas, CanvasError};
use crate::core::{AppControl, WindowEvents};
use crate::gfx::{
    ClearTarget, FrameStatus, GfxError, ImageAccess, MemoryBarrier, SharedContext, TextureId,
};
use crate::input::{Key, KeyState, ViewerCommand};
use crate::logging::log_block;
use crate::scene::SceneList;
use crate::shader::{
    names, ray_uniform_layout, screen_uniform_layout, FileSourceLoader, GraphicsStages, Shader,
    ShaderSourceLoader, UniformValue,
};
use crate::time::{FixedStep, FrameClock};
use crate::window::WindowHost;

const RAY_SHADER: &str = "raytracer.wgsl";
const SCREEN_VERTEX_SHADER: &str = "screen.vert.wgsl";
const SCREEN_FRAGMENT_SHADER: &str = "screen.frag.wgsl";

const EXPORT_LABEL: &str = "FinalCanvas";

/// GPU objects created by [`Renderer::initialize`].
struct FrameResources {
    ray: Shader,
    screen: Shader,
    canvas: Canvas,
    quad: ScreenQuad,
}

/// Owns the programs, the canvas and the camera, and runs the frame loop.
pub struct Renderer {
    ctx: SharedContext,
    config: RendererConfig,
    loader: Box<dyn ShaderSourceLoader>,
    scene: SceneList,
    camera: Camera,
    frame_size: (u32, u32),
    frame_index: u32,
    frame_rate: f64,
    resources: Option<FrameResources>,
    canvas_stale: bool,
    frame_error_reported: bool,
}

impl Renderer {
    /// Creates a renderer that reads shaders from `config.shader_dir`.
    pub fn new(ctx: SharedContext, config: RendererConfig, scene: SceneList) -> Self {
        Self::with_loader(ctx, config, scene, Box::new(FileSourceLoader))
    }

    pub fn with_loader(
        ctx: SharedContext,
        config: RendererConfig,
        scene: SceneList,
        loader: Box<dyn ShaderSourceLoader>,
    ) -> Self {
        let frame_size = match ctx.surface_size() {
            Some((w, h)) if w > 0 && h > 0 => (w, h),
            _ => (config.frame_width, config.frame_height),
        };
        let camera = Camera::new(config.near, config.far);

        let renderer = Self {
            ctx,
            config,
            loader,
            scene,
            camera,
            frame_size,
            frame_index: 0,
            frame_rate: 0.0,
            resources: None,
            canvas_stale: false,
            frame_error_reported: false,
        };
        renderer.log_information();
        renderer
    }

    fn log_information(&self) {
        let info = self.ctx.info();
        let lines = format!(
            "adapter: {}\nbackend: {}\ndriver: {}\nsurface format: {}\nframe: {}x{}",
            info.adapter,
            info.backend,
            info.driver,
            info.surface_format,
            self.frame_size.0,
            self.frame_size.1,
        );
        log_block(module_path!(), log::Level::Info, "[ Renderer Information ]", &lines);
    }

    /// (Re)creates both programs, the canvas and the screen quad at the
    /// current frame size. Calling it again replaces everything.
    pub fn initialize(&mut self) -> Result<(), RendererError> {
        let (width, height) = self.frame_size;
        self.camera.update_viewport(width, height);

        let dir = self.config.shader_dir.as_path();
        let ray_path = dir.join(RAY_SHADER);
        let mut ray = Shader::link_compute(
            self.ctx.clone(),
            self.loader.as_ref(),
            Some(ray_path.as_path()),
            ray_uniform_layout(),
            self.config.link_policy,
        )?;
        ray.resolve_ray_uniform_locations();

        let vertex_path = dir.join(SCREEN_VERTEX_SHADER);
        let fragment_path = dir.join(SCREEN_FRAGMENT_SHADER);
        let mut screen = Shader::link_graphics(
            self.ctx.clone(),
            self.loader.as_ref(),
            GraphicsStages::new(&vertex_path, &fragment_path),
            screen_uniform_layout(),
            self.config.link_policy,
        )?;
        screen.resolve_screen_uniform_locations();

        let mut canvas = Canvas::new(self.ctx.clone());
        self.configure_canvas(&mut canvas)?;

        // Old resources go only once the new set exists.
        self.resources = Some(FrameResources {
            ray,
            screen,
            canvas,
            quad: ScreenQuad::new(self.ctx.clone()),
        });
        self.canvas_stale = false;
        self.warn_degraded();
        log::debug!("renderer initialized at {width}x{height}");
        Ok(())
    }

    fn warn_degraded(&self) {
        let Some(resources) = self.resources.as_ref() else {
            return;
        };
        if !resources.ray.is_linked() {
            log::warn!("ray tracing program did not link; frames skip the compute pass");
        }
        if !resources.screen.is_linked() {
            log::warn!("screen program did not link; frames skip the blit");
        }
    }

    /// An incomplete canvas is already logged and stays usable in its
    /// partial state; anything else is an error.
    fn configure_canvas(&self, canvas: &mut Canvas) -> Result<(), RendererError> {
        let (width, height) = self.frame_size;
        match canvas.configure(width, height, self.config.canvas_format, false) {
            Ok(()) | Err(CanvasError::Incomplete(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Records one frame: clear, compute phase, screen phase, unbind.
    ///
    /// Returns [`FrameStatus::Skipped`] when the surface had no drawable.
    pub fn render(&mut self) -> Result<FrameStatus, RendererError> {
        if self.canvas_stale {
            self.recreate_canvas()?;
        }
        if self.resources.is_none() {
            return Err(RendererError::NotInitialized);
        }

        if self.ctx.begin_frame()? == FrameStatus::Skipped {
            return Ok(FrameStatus::Skipped);
        }

        self.ctx.clear_framebuffer(
            None,
            ClearTarget::Color {
                index: 0,
                rgba: self.config.clear_color,
            },
        )?;
        self.ctx.clear_framebuffer(None, ClearTarget::Depth(1.0))?;

        // A pass whose program failed a permissive link is left out.
        let (trace, blit) = self
            .resources
            .as_ref()
            .map_or((false, false), |r| (r.ray.is_linked(), r.screen.is_linked()));
        if trace {
            self.draw_scene()?;
        }
        if blit {
            self.draw_screen()?;
        }

        self.ctx.bind_vertex_array(None)?;
        self.ctx.use_program(None)?;
        Ok(FrameStatus::Ready)
    }

    fn recreate_canvas(&mut self) -> Result<(), RendererError> {
        self.canvas_stale = false;
        let Some(mut resources) = self.resources.take() else {
            return Ok(());
        };
        let result = self.configure_canvas(&mut resources.canvas);
        self.resources = Some(resources);
        result
    }

    fn canvas_texture(resources: &FrameResources) -> Result<TextureId, RendererError> {
        resources
            .canvas
            .color0_texture_id()
            .ok_or(RendererError::NoCanvas)
    }

    /// Compute phase: trace the scene into the canvas color texture.
    fn draw_scene(&self) -> Result<(), RendererError> {
        let resources = self.resources.as_ref().ok_or(RendererError::NotInitialized)?;
        let target = Self::canvas_texture(resources)?;
        let (width, height) = self.frame_size;

        resources.ray.bind()?;
        resources.ray.transfer_sphere_uniforms(self.scene.spheres())?;
        resources
            .ray
            .set_uniform(names::FRAME_INDEX, UniformValue::UInt(self.frame_index))?;

        self.ctx
            .bind_image_texture(0, target, ImageAccess::ReadWrite)?;
        self.ctx.dispatch_compute([
            dispatch_group_count(width),
            dispatch_group_count(height),
            1,
        ])?;
        self.ctx.memory_barrier(MemoryBarrier::ShaderImageAccess);
        Ok(())
    }

    /// Screen phase: draw the canvas onto a frame-sized quad.
    fn draw_screen(&mut self) -> Result<(), RendererError> {
        let (width, height) = self.frame_size;
        self.camera.update_viewport(width, height);
        self.ctx.set_viewport(width, height);

        let resources = self.resources.as_ref().ok_or(RendererError::NotInitialized)?;
        let source = Self::canvas_texture(resources)?;

        resources.screen.bind()?;
        let to_world = Mat4::from_scale(Vec3::new(width as f32, height as f32, 1.0));
        resources
            .screen
            .transfer_basic_transformation_uniforms(&to_world, &self.camera, false)?;

        self.ctx.bind_texture_unit(0, source)?;
        self.ctx.bind_vertex_array(Some(resources.quad.id()))?;
        self.ctx.draw_arrays(0, resources.quad.vertex_count())?;
        Ok(())
    }

    /// Fixed-step hook. The shipped scene is static.
    pub fn update(&mut self) {}

    /// Runs render, swap, frame-index increment and event polling until the
    /// host closes.
    pub fn play(&mut self, host: &mut dyn WindowHost) -> Result<(), RendererError> {
        if self.resources.is_none() {
            self.initialize()?;
        }

        let mut clock = FrameClock::new();
        let mut step = FixedStep::new(self.config.update_interval);

        while !host.should_close() {
            let time = clock.tick();
            self.frame_rate = time.fps;
            if step.advance(time.dt) {
                self.update();
            }

            let frame = self
                .render()
                .and_then(|status| match status {
                    FrameStatus::Ready => host.swap_buffers(&*self.ctx).map_err(Into::into),
                    FrameStatus::Skipped => Ok(()),
                });
            if let Err(e) = frame {
                self.report_frame_error(e)?;
            }

            self.frame_index = self.frame_index.wrapping_add(1);
            host.poll_events(self);
        }

        log::info!("frame loop finished after {} frames", self.frame_index);
        Ok(())
    }

    /// A lost surface ends the loop; other failures are logged once and the
    /// loop keeps going.
    fn report_frame_error(&mut self, error: RendererError) -> Result<(), RendererError> {
        if matches!(error, RendererError::Gfx(GfxError::SurfaceLost)) {
            return Err(error);
        }
        if !self.frame_error_reported {
            log::warn!("frame failed: {error}");
            self.frame_error_reported = true;
        }
        Ok(())
    }

    /// Writes the canvas color texture to the export directory.
    pub fn export_canvas(&self) {
        let Some(texture) = self
            .resources
            .as_ref()
            .and_then(|r| r.canvas.color0_texture_id())
        else {
            log::warn!("nothing to export: canvas is not configured");
            return;
        };

        let dir: &Path = &self.config.export_dir;
        match write_texture(self.ctx.as_ref(), texture, dir, EXPORT_LABEL) {
            Ok(path) => log::info!("canvas written to {}", path.display()),
            Err(e) => log::warn!("canvas export failed: {e}"),
        }
    }

    #[inline]
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    #[inline]
    pub fn frame_size(&self) -> (u32, u32) {
        self.frame_size
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.resources.as_ref().map(|r| &r.canvas)
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.resources.is_some()
    }
}

impl WindowEvents for Renderer {
    fn on_resize(&mut self, width: u32, height: u32) -> AppControl {
        if width == 0 || height == 0 || (width, height) == self.frame_size {
            return AppControl::Continue;
        }

        self.frame_size = (width, height);
        self.ctx.resize_surface(width, height);
        self.camera.update_viewport(width, height);
        self.canvas_stale = true;
        AppControl::Continue
    }

    fn on_close_request(&mut self) -> AppControl {
        AppControl::Exit
    }

    fn on_key(&mut self, key: Key, state: KeyState, repeat: bool) -> AppControl {
        match ViewerCommand::for_key(key, state, repeat) {
            Some(ViewerCommand::Quit) => return AppControl::Exit,
            Some(ViewerCommand::ExportCanvas) => self.export_canvas(),
            Some(ViewerCommand::ReportFrame) => {
                let (width, height) = self.frame_size;
                log::info!(
                    "frame {} at {width}x{height}, {:.1} fps",
                    self.frame_index,
                    self.frame_rate
                );
            }
            None => {}
        }
        AppControl::Continue
    }
}
