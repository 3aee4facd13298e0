/// Frame gaps longer than this are treated as this long, so a tab that was
/// in the background does not replay a burst of ticks.
pub const MAX_FRAME_GAP_MS: f64 = 500.0;

/// Fixed-interval tick clock driven by elapsed frame time.
///
/// The scheduler only counts; the caller runs each due tick to completion
/// before the next one, so ticks never overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct TickScheduler {
    interval_ms: f64,
    accumulated_ms: f64,
    running: bool,
}

impl TickScheduler {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: f64::from(interval_ms.max(1)),
            accumulated_ms: 0.0,
            running: false,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts (or restarts) with an empty accumulator.
    pub fn start(&mut self) {
        self.accumulated_ms = 0.0;
        self.running = true;
    }

    /// After this no tick is due until `start` is called again.
    pub fn stop(&mut self) {
        self.accumulated_ms = 0.0;
        self.running = false;
    }

    /// Adds `dt_ms` of elapsed time and returns how many ticks are now due.
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        if !self.running || !(dt_ms > 0.0) {
            return 0;
        }

        self.accumulated_ms += dt_ms.min(MAX_FRAME_GAP_MS);

        let mut due = 0;
        while self.accumulated_ms >= self.interval_ms {
            self.accumulated_ms -= self.interval_ms;
            due += 1;
        }
        due
    }
}
