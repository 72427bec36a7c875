use std::path::PathBuf;

use crate::gfx::ColorFormat;
use crate::shader::LinkPolicy;

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Frame size used until the surface reports its own.
    pub frame_width: u32,
    pub frame_height: u32,

    /// Cadence of the fixed-step update hook, in seconds.
    pub update_interval: f64,

    /// Directory holding `raytracer.wgsl`, `screen.vert.wgsl` and `screen.frag.wgsl`.
    pub shader_dir: PathBuf,

    pub canvas_format: ColorFormat,

    /// Clear color of the window before each frame.
    pub clear_color: [f32; 4],

    pub link_policy: LinkPolicy,

    /// Near/far planes of the screen-pass projection.
    pub near: f32,
    pub far: f32,

    /// Where F12 writes canvas snapshots.
    pub export_dir: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            frame_width: 2000,
            frame_height: 1000,
            update_interval: 0.1,
            shader_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")),
            canvas_format: ColorFormat::Rgba8,
            clear_color: [1.0, 1.0, 1.0, 1.0],
            link_policy: LinkPolicy::Permissive,
            near: -1.0,
            far: 1.0,
            export_dir: PathBuf::from("."),
        }
    }
}
