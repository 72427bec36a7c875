/// How the window surface encodes stored color.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SurfaceEncoding {
    /// Values are stored as written. The ray tracer gamma-corrects its own output.
    #[default]
    Unorm,
    /// Linear shader output is encoded to sRGB on store.
    Srgb,
}

/// Parameters for bringing up the device and surface.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub encoding: SurfaceEncoding,

    /// FIFO is universally supported and paces the loop at display rate.
    pub present_mode: wgpu::PresentMode,

    pub power_preference: wgpu::PowerPreference,

    /// Features enabled only when the adapter exposes them.
    ///
    /// Clamp-to-border sampling is requested this way; canvases fall back to
    /// clamp-to-edge without it.
    pub optional_features: wgpu::Features,

    /// Hint; support depends on platform and backend.
    pub frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            encoding: SurfaceEncoding::Unorm,
            present_mode: wgpu::PresentMode::Fifo,
            power_preference: wgpu::PowerPreference::HighPerformance,
            optional_features: wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER,
            frame_latency: 2,
        }
    }
}
