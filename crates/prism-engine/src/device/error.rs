use thiserror::Error;

use super::SurfaceEncoding;

/// Failure while bringing up the adapter, device, or surface.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("window has zero size")]
    ZeroSizedWindow,

    #[error("failed to create the window surface")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no GPU adapter can present to the window")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open the GPU device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("adapter {adapter} does not run compute shaders")]
    NoComputeShaders { adapter: String },

    #[error("surface offers no {0:?} 8-bit format")]
    NoSurfaceFormat(SurfaceEncoding),
}

/// What the frame loop should do after the surface refused a texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the next frame may acquire again.
    Reconfigured,
    /// Transient; drop this frame only.
    SkipFrame,
    /// Device memory is gone; rendering cannot continue.
    Fatal,
}

impl SurfaceErrorAction {
    pub(crate) fn for_error(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigured,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Self::SkipFrame,
            wgpu::SurfaceError::OutOfMemory => Self::Fatal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_surfaces_are_reconfigured() {
        assert_eq!(
            SurfaceErrorAction::for_error(&wgpu::SurfaceError::Lost),
            SurfaceErrorAction::Reconfigured
        );
        assert_eq!(
            SurfaceErrorAction::for_error(&wgpu::SurfaceError::Outdated),
            SurfaceErrorAction::Reconfigured
        );
    }

    #[test]
    fn only_out_of_memory_is_fatal() {
        assert_eq!(
            SurfaceErrorAction::for_error(&wgpu::SurfaceError::Timeout),
            SurfaceErrorAction::SkipFrame
        );
        assert_eq!(
            SurfaceErrorAction::for_error(&wgpu::SurfaceError::Other),
            SurfaceErrorAction::SkipFrame
        );
        assert_eq!(
            SurfaceErrorAction::for_error(&wgpu::SurfaceError::OutOfMemory),
            SurfaceErrorAction::Fatal
        );
    }
}
