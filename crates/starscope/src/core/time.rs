/// Stillness accumulator for settle detection.
/// Fires once the camera has been motionless for `interval` seconds in a row;
/// any motion restarts the count.
#[derive(Debug, Clone)]
pub struct Debounce {
    /// Required stillness in seconds.
    interval: f64,
    /// Accumulated stillness since the last motion.
    still_for: f64,
}

impl Debounce {
    pub fn new(interval: f64) -> Self {
        Self {
            interval: interval.max(0.0),
            still_for: 0.0,
        }
    }

    /// Motion this frame: restart the stillness count.
    pub fn reset(&mut self) {
        self.still_for = 0.0;
    }

    /// Add a still frame. Returns true once the interval has elapsed.
    pub fn accumulate(&mut self, frame_dt: f64) -> bool {
        self.still_for += frame_dt.max(0.0);
        self.elapsed()
    }

    /// Whether the interval has elapsed without further accumulation.
    pub fn elapsed(&self) -> bool {
        self.still_for >= self.interval
    }

    /// Seconds of stillness observed so far.
    pub fn still_for(&self) -> f64 {
        self.still_for
    }
}
