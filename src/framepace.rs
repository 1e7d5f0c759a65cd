use std::time::{Duration, Instant};

/// Measures frame deltas for the effect clocks and sleeps off the rest of a
/// frame when the framerate is capped.
pub struct Framepacer {
    frame_start: Instant,
    last_delta: Duration,
}

impl Framepacer {
    /// Longest step handed to the effects, so a stall doesn't fast-forward
    /// every animation at once.
    pub const MAX_DELTA: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            last_delta: Duration::ZERO,
        }
    }

    pub fn frametime(&self) -> f32 {
        self.last_delta.as_secs_f32()
    }

    /// Starts a frame and returns the time since the previous one began.
    pub fn begin_frame(&mut self) -> Duration {
        let now = Instant::now();
        self.last_delta = now.duration_since(self.frame_start).min(Self::MAX_DELTA);
        self.frame_start = now;
        self.last_delta
    }

    pub fn end_frame(&mut self, framerate: u32) {
        if framerate == 0 {
            return;
        }

        const ACCURACY: Duration = Duration::from_micros(100);
        let limit = Duration::from_secs_f32(1.0 / framerate as f32);
        let elapsed = self.frame_start.elapsed();

        if let Some(sleep_time) = limit.checked_sub(elapsed + ACCURACY) {
            std::thread::sleep(sleep_time);

            while self.frame_start.elapsed() < limit {
                std::thread::yield_now();
            }
        }
    }
}
