/// Number of frames averaged per FPS report.
pub const FPS_SAMPLE_WINDOW: u32 = 10;

/// Frames-per-second sampler.
///
/// Counts ticks and, every `window` ticks, reports the average rate over the
/// elapsed wall time since the previous report.
#[derive(Debug, Clone)]
pub struct FpsSampler {
    last_sample_time: f64,
    frame_counter: u32,
    window: u32,
}

impl FpsSampler {
    /// Creates a sampler whose first window starts at `start` (seconds).
    pub fn new(start: f64) -> Self {
        Self::with_window(start, FPS_SAMPLE_WINDOW)
    }

    pub fn with_window(start: f64, window: u32) -> Self {
        debug_assert!(window > 0);
        Self {
            last_sample_time: start,
            frame_counter: 0,
            window: window.max(1),
        }
    }

    /// Frames counted in the current window; always `< window`.
    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    pub fn last_sample_time(&self) -> f64 {
        self.last_sample_time
    }

    /// Records one frame at `now` (seconds).
    ///
    /// Returns the rounded rate when the window completes. A window with no
    /// measurable elapsed time restarts without reporting.
    pub fn tick(&mut self, now: f64) -> Option<u32> {
        self.frame_counter += 1;
        if self.frame_counter < self.window {
            return None;
        }

        let elapsed = now - self.last_sample_time;
        self.last_sample_time = now;
        self.frame_counter = 0;

        if !(elapsed > 0.0) || !elapsed.is_finite() {
            log::trace!("fps window skipped: elapsed={elapsed}");
            return None;
        }

        let per_frame = elapsed / self.window as f64;
        Some((1.0 / per_frame).round() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frames(s: &mut FpsSampler, start: f64, dt: f64, n: u32) -> Vec<Option<u32>> {
        (1..=n).map(|i| s.tick(start + dt * i as f64)).collect()
    }

    #[test]
    fn reports_once_per_window() {
        let mut s = FpsSampler::new(0.0);
        let out = run_frames(&mut s, 0.0, 1.0 / 60.0, 10);
        assert!(out[..9].iter().all(Option::is_none));
        assert_eq!(out[9], Some(60));
        assert_eq!(s.frame_counter(), 0);
    }

    #[test]
    fn counter_stays_below_window() {
        let mut s = FpsSampler::new(0.0);
        for i in 1..=35 {
            s.tick(i as f64 * 0.01);
            assert!(s.frame_counter() < FPS_SAMPLE_WINDOW);
        }
        assert_eq!(s.frame_counter(), 5);
    }

    #[test]
    fn second_window_measures_from_previous_sample() {
        let mut s = FpsSampler::new(0.0);
        run_frames(&mut s, 0.0, 1.0 / 60.0, 10);
        let t0 = s.last_sample_time();
        let out = run_frames(&mut s, t0, 1.0 / 30.0, 10);
        assert_eq!(out[9], Some(30));
    }

    #[test]
    fn rate_is_rounded_to_nearest() {
        let mut s = FpsSampler::new(0.0);
        // 10 frames in 0.166 s -> 60.24 fps
        let out = run_frames(&mut s, 0.0, 0.0166, 10);
        assert_eq!(out[9], Some(60));
    }

    #[test]
    fn zero_elapsed_window_is_not_reported() {
        let mut s = FpsSampler::new(5.0);
        let out: Vec<_> = (0..10).map(|_| s.tick(5.0)).collect();
        assert!(out.iter().all(Option::is_none));
        assert_eq!(s.frame_counter(), 0);
    }

    #[test]
    fn custom_window() {
        let mut s = FpsSampler::with_window(0.0, 2);
        assert_eq!(s.tick(0.5), None);
        assert_eq!(s.tick(1.0), Some(2));
    }
}
