use std::time::Instant;

/// Wall clock for the render loop.
///
/// Reports seconds since creation so the orchestrator can be driven with
/// injected timestamps in tests and real ones in the binary.
#[derive(Debug)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    /// Seconds since the clock started
    pub fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Restart from zero
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame-rate telemetry over a rolling one-second window
#[derive(Debug, Clone, Default)]
pub struct FrameTelemetry {
    window_start: Option<f64>,
    frames_in_window: u32,
    fps: f32,
    total_frames: u64,
    tick_faults: u64,
}

impl FrameTelemetry {
    pub const WINDOW_SECONDS: f64 = 1.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Count a frame finished at `now`; returns the new FPS when a window closes
    pub fn record_frame(&mut self, now: f64) -> Option<f32> {
        self.total_frames += 1;
        let start = *self.window_start.get_or_insert(now);
        self.frames_in_window += 1;

        let elapsed = now - start;
        if elapsed >= Self::WINDOW_SECONDS {
            self.fps = (self.frames_in_window as f64 / elapsed).round() as f32;
            self.frames_in_window = 0;
            self.window_start = Some(now);
            return Some(self.fps);
        }
        None
    }

    pub fn record_tick_fault(&mut self) {
        self.tick_faults += 1;
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn tick_faults(&self) -> u64 {
        self.tick_faults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_elapsed() {
        let clock = Clock::new();
        thread::sleep(Duration::from_millis(10));
        let now = clock.now();
        assert!(now >= 0.009 && now <= 0.5);
    }

    #[test]
    fn clock_resets() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(10));
        clock.reset();
        assert!(clock.now() < 0.005);
    }

    #[test]
    fn telemetry_reports_once_per_window() {
        let mut telemetry = FrameTelemetry::new();
        let mut reports = Vec::new();
        for i in 0..=120 {
            if let Some(fps) = telemetry.record_frame(i as f64 / 60.0) {
                reports.push(fps);
            }
        }
        assert_eq!(reports.len(), 2, "two full windows in two seconds: {:?}", reports);
        assert!((reports[0] - 61.0).abs() <= 1.0);
        assert_eq!(telemetry.total_frames(), 121);
    }
}
