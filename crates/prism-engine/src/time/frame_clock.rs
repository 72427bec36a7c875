use std::time::{Duration, Instant};

/// Timing of one loop iteration.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped seconds since the previous tick.
    pub dt: f64,
    /// Seconds since the clock started.
    pub elapsed: f64,
    /// Exponentially smoothed frames per second.
    pub fps: f64,
}

/// Per-frame clock for the render loop.
///
/// `dt` is clamped so a debugger pause or a minimized window does not feed a
/// huge step into the fixed-step accumulator.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    dt_min: Duration,
    dt_max: Duration,
    fps: f64,
}

/// Weight of the newest sample in the smoothed frame rate.
const FPS_SMOOTHING: f64 = 0.1;

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Clock whose first tick measures from `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
            fps: 0.0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances to `now`. Instants earlier than the last tick count as the minimum step.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max)
            .as_secs_f64();
        self.last = self.last.max(now);

        let sample = 1.0 / dt;
        self.fps = if self.fps == 0.0 {
            sample
        } else {
            self.fps + (sample - self.fps) * FPS_SMOOTHING
        };

        FrameTime {
            dt,
            elapsed: self.last.saturating_duration_since(self.start).as_secs_f64(),
            fps: self.fps,
        }
    }

    /// Last smoothed frame rate; zero before the first tick.
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
