use crate::core::WindowEvents;
use crate::gfx::{GfxError, GraphicsContext};

/// What the frame loop needs from a window.
pub trait WindowHost {
    fn should_close(&self) -> bool;

    /// Delivers pending platform events to `events` without blocking.
    fn poll_events(&mut self, events: &mut dyn WindowEvents);

    /// Presents the frame recorded on `ctx`.
    fn swap_buffers(&mut self, ctx: &dyn GraphicsContext) -> Result<(), GfxError>;
}
