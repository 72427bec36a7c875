/// Fixed-cadence update accumulator.
///
/// Wall time is fed in with [`advance`](FixedStep::advance). Each call fires at
/// most one step, even when several intervals have accumulated; the remainder
/// after subtracting one interval is carried into the next call.
#[derive(Debug, Clone)]
pub struct FixedStep {
    interval: f64,
    accumulated: f64,
}

impl FixedStep {
    /// Creates an accumulator firing every `interval` seconds.
    ///
    /// Non-positive or non-finite intervals are replaced by a tiny positive
    /// value, which makes the hook fire every frame.
    pub fn new(interval: f64) -> Self {
        let interval = if interval.is_finite() && interval > 0.0 {
            interval
        } else {
            f64::EPSILON
        };
        Self {
            interval,
            accumulated: 0.0,
        }
    }

    #[inline]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Time accumulated towards the next step, in seconds.
    #[inline]
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Adds `dt` seconds and reports whether the update hook should run now.
    pub fn advance(&mut self, dt: f64) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.accumulated += dt;
        }

        if self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            true
        } else {
            false
        }
    }

    /// Drops any accumulated time.
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    // ── threshold crossing ────────────────────────────────────────────────

    #[test]
    fn fires_once_on_fourth_poll_and_carries_remainder() {
        let mut step = FixedStep::new(0.1);
        let fired: Vec<bool> = (0..4).map(|_| step.advance(0.03)).collect();

        assert_eq!(fired, [false, false, false, true]);
        assert!((step.accumulated() - 0.02).abs() < EPS);
    }

    #[test]
    fn matches_reference_simulation() {
        let mut step = FixedStep::new(0.1);
        let mut reference = 0.0f64;

        for _ in 0..100 {
            reference += 0.03;
            let expected = reference >= 0.1;
            if expected {
                reference -= 0.1;
            }
            assert_eq!(step.advance(0.03), expected);
            assert!((step.accumulated() - reference).abs() < EPS);
        }
    }

    // ── carry-over ────────────────────────────────────────────────────────

    #[test]
    fn large_delta_fires_once_and_keeps_excess() {
        let mut step = FixedStep::new(0.1);
        assert!(step.advance(0.35));
        assert!((step.accumulated() - 0.25).abs() < EPS);

        // The excess drains one step per call.
        assert!(step.advance(0.0));
        assert!(step.advance(0.0));
        assert!(!step.advance(0.0));
        assert!((step.accumulated() - 0.05).abs() < EPS);
    }

    #[test]
    fn ignores_negative_and_nan_deltas() {
        let mut step = FixedStep::new(0.1);
        assert!(!step.advance(-1.0));
        assert!(!step.advance(f64::NAN));
        assert_eq!(step.accumulated(), 0.0);
    }

    #[test]
    fn non_positive_interval_fires_every_frame() {
        let mut step = FixedStep::new(0.0);
        assert!(step.advance(0.016));
        assert!(step.advance(0.016));
    }

    #[test]
    fn reset_drops_accumulated_time() {
        let mut step = FixedStep::default();
        step.advance(0.09);
        step.reset();
        assert!(!step.advance(0.02));
    }
}
