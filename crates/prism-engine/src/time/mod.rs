//! Frame timing for the render loop.
//!
//! [`FrameClock`] is ticked once per iteration; its delta feeds a
//! [`FixedStep`] that gates the renderer's update hook.

mod fixed_step;
mod frame_clock;

pub use fixed_step::FixedStep;
pub use frame_clock::{FrameClock, FrameTime};
