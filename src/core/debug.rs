//! Debug and statistics module

use std::collections::VecDeque;
use std::time::Duration;

/// Frame statistics tracker
///
/// Keeps a rolling window of frame times for min/avg/max and a plain
/// frames-per-second counter that is re-sampled once every second.
#[derive(Debug)]
pub struct FrameStats {
    /// Frame time history for averaging
    frame_times: VecDeque<Duration>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Frames counted in the current one second window
    window_frames: u32,
    /// Time accumulated in the current window
    window_elapsed: Duration,
    /// Frames counted in the last complete window
    fps: f32,
    /// Average frame time in milliseconds
    avg_frame_time_ms: f32,
    /// Minimum frame time in milliseconds
    min_frame_time_ms: f32,
    /// Maximum frame time in milliseconds
    max_frame_time_ms: f32,
    /// Total frames rendered
    total_frames: u64,
}

impl FrameStats {
    const WINDOW: Duration = Duration::from_secs(1);

    /// Create a new frame stats tracker
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
            window_frames: 0,
            window_elapsed: Duration::ZERO,
            fps: 0.0,
            avg_frame_time_ms: 0.0,
            min_frame_time_ms: 0.0,
            max_frame_time_ms: 0.0,
            total_frames: 0,
        }
    }

    /// Record a frame with the given delta time.
    ///
    /// Returns `true` when a one second window closed and `fps()` was
    /// refreshed.
    pub fn record_frame(&mut self, delta: Duration) -> bool {
        self.total_frames += 1;

        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(delta);
        self.update_window_stats();

        self.window_frames += 1;
        self.window_elapsed += delta;
        if self.window_elapsed > Self::WINDOW {
            self.fps = self.window_frames as f32;
            self.window_frames = 0;
            self.window_elapsed = Duration::ZERO;
            return true;
        }
        false
    }

    fn update_window_stats(&mut self) {
        if self.frame_times.is_empty() {
            return;
        }

        let mut total = Duration::ZERO;
        let mut min = Duration::MAX;
        let mut max = Duration::ZERO;

        for &dt in &self.frame_times {
            total += dt;
            min = min.min(dt);
            max = max.max(dt);
        }

        let count = self.frame_times.len() as f32;
        self.avg_frame_time_ms = total.as_secs_f32() / count * 1000.0;
        self.min_frame_time_ms = min.as_secs_f32() * 1000.0;
        self.max_frame_time_ms = max.as_secs_f32() * 1000.0;
    }

    /// Frames counted during the last complete second
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Get average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f32 {
        self.avg_frame_time_ms
    }

    /// Get minimum frame time in milliseconds
    pub fn min_frame_time_ms(&self) -> f32 {
        self.min_frame_time_ms
    }

    /// Get maximum frame time in milliseconds
    pub fn max_frame_time_ms(&self) -> f32 {
        self.max_frame_time_ms
    }

    /// Get total frames rendered
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "FPS {:.0} FRAME {:.1}MS",
            self.fps, self.avg_frame_time_ms
        )
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Debug overlay information
#[derive(Debug, Default)]
pub struct DebugInfo {
    /// Whether the FPS overlay is drawn
    pub enabled: bool,
    /// Frame statistics
    pub frame_stats: FrameStats,
}

impl DebugInfo {
    /// Create new debug info
    pub fn new() -> Self {
        Self {
            enabled: false,
            frame_stats: FrameStats::new(),
        }
    }

    /// Toggle debug overlay
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Record a frame, logging the frame rate whenever it is re-sampled
    pub fn record_frame(&mut self, delta: Duration) {
        if self.frame_stats.record_frame(delta) {
            log::debug!("FPS: {}", self.frame_stats.fps());
        }
    }

    /// Lines for the overlay
    pub fn overlay_lines(&self) -> Vec<String> {
        vec![self.frame_stats.format_stats()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_resampled_after_one_second() {
        let mut stats = FrameStats::new();
        let frame = Duration::from_millis(20);

        // 50 frames of 20ms reach exactly one second, which is not yet past
        // the window.
        for _ in 0..50 {
            assert!(!stats.record_frame(frame));
        }
        assert_eq!(stats.fps(), 0.0);

        assert!(stats.record_frame(frame));
        assert_eq!(stats.fps(), 51.0);
        assert_eq!(stats.total_frames(), 51);
    }

    #[test]
    fn test_min_avg_max() {
        let mut stats = FrameStats::new();
        stats.record_frame(Duration::from_millis(10));
        stats.record_frame(Duration::from_millis(30));

        assert!((stats.min_frame_time_ms() - 10.0).abs() < 0.01);
        assert!((stats.max_frame_time_ms() - 30.0).abs() < 0.01);
        assert!((stats.avg_frame_time_ms() - 20.0).abs() < 0.01);
    }
}
