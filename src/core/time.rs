//! Frame timing

use std::time::{Duration, Instant};

/// Tracks wall-clock time between frames
#[derive(Debug, Clone)]
pub struct Time {
    start: Instant,
    last: Instant,
    delta: Duration,
    frame_count: u64,
}

impl Time {
    /// Create a new timer starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance to the current instant. Call once per frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now.duration_since(self.last);
        self.last = now;
        self.frame_count += 1;
    }

    /// Time elapsed between the two most recent updates
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Frame delta in milliseconds
    pub fn delta_millis(&self) -> f32 {
        self.delta.as_secs_f32() * 1000.0
    }

    /// Time since the timer was created
    pub fn elapsed(&self) -> Duration {
        self.last.duration_since(self.start)
    }

    /// Number of updates so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_advances_frame_count() {
        let mut time = Time::new();
        assert_eq!(time.frame_count(), 0);
        assert_eq!(time.delta(), Duration::ZERO);

        std::thread::sleep(Duration::from_millis(2));
        time.update();

        assert_eq!(time.frame_count(), 1);
        assert!(time.delta() >= Duration::from_millis(2));
        assert!(time.delta_millis() >= 2.0);
        assert!(time.elapsed() >= time.delta());
    }
}
