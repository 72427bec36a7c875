//! GPU device and window surface.
//!
//! [`Gpu`] brings up the adapter, device, and queue for a window and keeps the
//! surface configured across resizes. The graphics context is its only user.

mod error;
mod gpu;
mod init;
mod surface;

pub use error::{DeviceError, SurfaceErrorAction};
pub use gpu::Gpu;
pub use init::{GpuInit, SurfaceEncoding};
