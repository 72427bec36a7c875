use winit::dpi::PhysicalSize;

use super::{DeviceError, GpuInit, SurfaceEncoding, SurfaceErrorAction};

/// Picks an 8-bit format with the requested encoding, BGRA first.
pub(crate) fn pick_format(
    formats: &[wgpu::TextureFormat],
    encoding: SurfaceEncoding,
) -> Option<wgpu::TextureFormat> {
    let wanted = match encoding {
        SurfaceEncoding::Unorm => [
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Rgba8Unorm,
        ],
        SurfaceEncoding::Srgb => [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ],
    };
    wanted.into_iter().find(|f| formats.contains(f))
}

/// The blit writes alpha 1 everywhere, so opaque composition is preferred.
pub(crate) fn pick_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    if modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
        wgpu::CompositeAlphaMode::Opaque
    } else {
        modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto)
    }
}

/// Window surface together with its last applied configuration.
///
/// A zero-sized window (minimized) keeps the old configuration; wgpu rejects
/// configuring a 0x0 surface.
pub(crate) struct WindowSurface {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl WindowSurface {
    pub(crate) fn configure(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        init: &GpuInit,
    ) -> Result<Self, DeviceError> {
        let caps = surface.get_capabilities(adapter);
        let format = pick_format(&caps.formats, init.encoding)
            .ok_or(DeviceError::NoSurfaceFormat(init.encoding))?;
        let present_mode = if caps.present_modes.contains(&init.present_mode) {
            init.present_mode
        } else {
            log::warn!("{:?} present mode unsupported, using FIFO", init.present_mode);
            wgpu::PresentMode::Fifo
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: pick_alpha_mode(&caps.alpha_modes),
            view_formats: vec![],
            desired_maximum_frame_latency: init.frame_latency,
        };
        surface.configure(device, &config);
        log::debug!("surface configured: {}x{} {format:?} {present_mode:?}", size.width, size.height);

        Ok(Self {
            surface,
            config,
            size,
        })
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub(crate) fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.size = size;
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(device, &self.config);
    }

    pub(crate) fn acquire(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    /// Reconfigures a lost or outdated surface and reports how to proceed.
    pub(crate) fn recover(
        &self,
        device: &wgpu::Device,
        err: wgpu::SurfaceError,
    ) -> SurfaceErrorAction {
        let action = SurfaceErrorAction::for_error(&err);
        match action {
            SurfaceErrorAction::Reconfigured => {
                if self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(device, &self.config);
                }
                log::debug!("surface {err}; reconfigured");
            }
            SurfaceErrorAction::SkipFrame => log::debug!("surface {err}; frame skipped"),
            SurfaceErrorAction::Fatal => log::error!("surface {err}"),
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode, TextureFormat};

    // ── format ───────────────────────────────────────────────────────────

    #[test]
    fn unorm_skips_srgb_formats() {
        let formats = [
            TextureFormat::Bgra8UnormSrgb,
            TextureFormat::Rgba8Unorm,
            TextureFormat::Bgra8Unorm,
        ];
        assert_eq!(
            pick_format(&formats, SurfaceEncoding::Unorm),
            Some(TextureFormat::Bgra8Unorm)
        );
        assert_eq!(
            pick_format(&formats, SurfaceEncoding::Srgb),
            Some(TextureFormat::Bgra8UnormSrgb)
        );
    }

    #[test]
    fn missing_encoding_yields_none() {
        let formats = [TextureFormat::Rgba8UnormSrgb, TextureFormat::Rgba16Float];
        assert_eq!(pick_format(&formats, SurfaceEncoding::Unorm), None);
        assert_eq!(pick_format(&[], SurfaceEncoding::Srgb), None);
    }

    // ── alpha ────────────────────────────────────────────────────────────

    #[test]
    fn opaque_alpha_preferred() {
        let modes = [CompositeAlphaMode::PreMultiplied, CompositeAlphaMode::Opaque];
        assert_eq!(pick_alpha_mode(&modes), CompositeAlphaMode::Opaque);
    }

    #[test]
    fn alpha_falls_back_to_first_then_auto() {
        assert_eq!(
            pick_alpha_mode(&[CompositeAlphaMode::Inherit]),
            CompositeAlphaMode::Inherit
        );
        assert_eq!(pick_alpha_mode(&[]), CompositeAlphaMode::Auto);
    }
}
