/// Monotonic stage clock in milliseconds.
/// Advanced by the host once per animation frame with the frame delta.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    now_ms: f64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame delta and return the new time. Negative or non-finite
    /// deltas count as zero so the clock never runs backwards.
    pub fn advance(&mut self, dt_ms: f64) -> f64 {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.now_ms += dt_ms;
        }
        self.now_ms
    }

    /// Current time since stage creation.
    pub fn now(&self) -> f64 {
        self.now_ms
    }
}
