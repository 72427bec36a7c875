use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface::WindowSurface;
use super::{DeviceError, GpuInit, SurfaceErrorAction};

/// Adapter, device, and queue bound to one window surface.
///
/// The surface holds its own `Arc<Window>`, so no borrow ties the window's
/// lifetime to this value.
pub struct Gpu {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: WindowSurface,
}

impl Gpu {
    /// Opens a device able to present to `window` and run compute passes.
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self, DeviceError> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(DeviceError::ZeroSizedWindow);
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        if !adapter
            .get_downlevel_capabilities()
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
        {
            return Err(DeviceError::NoComputeShaders { adapter: info.name });
        }
        log::debug!("adapter: {} ({:?}, {:?})", info.name, info.device_type, info.backend);

        let enabled = adapter.features() & init.optional_features;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prism-engine device"),
                required_features: enabled,
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface = WindowSurface::configure(surface, &adapter, &device, size, &init)?;

        Ok(Self {
            adapter,
            device,
            queue,
            surface,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface.format()
    }

    /// Current drawable size in physical pixels; may be zero while minimized.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.surface.size()
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.surface.resize(&self.device, size);
    }

    /// Acquires the next surface texture; the caller presents it after submitting.
    pub fn acquire(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.acquire()
    }

    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        self.surface.recover(&self.device, err)
    }
}
