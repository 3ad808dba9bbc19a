//! Time management utilities

/// Frame clock driven by the host's per-frame delta times
///
/// The host passes real elapsed seconds each frame; the clock applies the
/// debug time scale and accumulates total time and frame count.
#[derive(Debug, Clone)]
pub struct FrameClock {
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    time_scale: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock at time zero
    pub fn new() -> Self {
        Self {
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            time_scale: 1.0,
        }
    }

    /// Advance by `raw_dt` seconds, returns the scaled delta
    pub fn advance(&mut self, raw_dt: f32) -> f32 {
        self.delta_time = raw_dt.max(0.0) * self.time_scale;
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }

    /// Hold the clock for a frame: zero delta, time and frame count unchanged
    pub fn hold(&mut self) {
        self.delta_time = 0.0;
    }

    /// Scaled time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total scaled time since the clock started
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of frames advanced
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Current time scale
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the time scale (clamped to be non-negative)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Average FPS since the clock started
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
