use super::WindowHost;
use crate::core::WindowEvents;
use crate::gfx::{GfxError, GraphicsContext};

/// Host without a window: produces no input and closes after a fixed number
/// of loop iterations.
///
/// Iterations are counted at each poll as well as each swap, so a loop whose
/// frames keep failing before the swap still ends.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    frames: u32,
    swapped: u32,
    polled: u32,
}

impl HeadlessHost {
    pub fn new(frames: u32) -> Self {
        Self {
            frames,
            swapped: 0,
            polled: 0,
        }
    }

    #[inline]
    pub fn frames_swapped(&self) -> u32 {
        self.swapped
    }
}

impl WindowHost for HeadlessHost {
    fn should_close(&self) -> bool {
        self.swapped >= self.frames || self.polled >= self.frames
    }

    fn poll_events(&mut self, _events: &mut dyn WindowEvents) {
        self.polled += 1;
    }

    fn swap_buffers(&mut self, ctx: &dyn GraphicsContext) -> Result<(), GfxError> {
        self.swapped += 1;
        ctx.present()
    }
}
