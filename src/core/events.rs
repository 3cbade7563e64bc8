//! Event queue for gameplay notifications
//!
//! The session pushes what happened during a frame (hits, launches, lost
//! balls, points). Audio and UI read those events on the following frame, so
//! they never reach into the simulation directly.
//!
//! ```ignore
//! // Simulation
//! events.push(GameEvent::BlockHit { point, platform, destroyed: false });
//!
//! // Next frame, after `swap()`
//! for event in events.iter() {
//!     if let GameEvent::BlockHit { .. } = event {
//!         audio.play_hit();
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;

/// Something that happened in the simulation
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameEvent {
    /// A ball hit a blok and the hit counted
    BlockHit {
        /// World-space contact point
        point: Vec3,
        /// Platform that launched the ball
        platform: usize,
        /// Whether the hit destroyed the blok
        destroyed: bool,
    },

    /// A new ball appeared on a platform
    BallSpawned { platform: usize },

    /// A player swiped their ball off the platform
    BallLaunched {
        platform: usize,
        /// Impulse applied to the ball
        impulse: Vec3,
    },

    /// A ball fell into the black hole
    BallLost { platform: usize },

    /// An explosion particle delivered its point
    PointScored { platform: usize, score: u32 },

    /// Every blok is gone and every point delivered
    LevelCleared,
}

/// Double-buffered event queue.
///
/// Events pushed during frame N are readable during frame N+1, after
/// `swap()`.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this frame
    pending: VecDeque<GameEvent>,
    /// Events from previous frame, ready for processing
    processing: VecDeque<GameEvent>,
}

impl EventQueue {
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next frame.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Make this frame's events readable and start a fresh pending buffer.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous frame.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.processing.iter()
    }

    /// Drain all events from the previous frame.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.processing.drain(..)
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Number of events waiting for the next `swap()`
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop everything, used when a new level starts
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_visible_after_swap() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::BallSpawned { platform: 2 });
        assert!(queue.is_empty());
        assert_eq!(queue.pending_count(), 1);

        queue.swap();
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.iter().next(),
            Some(&GameEvent::BallSpawned { platform: 2 })
        );
    }

    #[test]
    fn test_double_buffer_isolation() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::PointScored { platform: 0, score: 1 });
        queue.swap();
        queue.push(GameEvent::LevelCleared);

        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events, vec![&GameEvent::PointScored { platform: 0, score: 1 }]);

        queue.swap();
        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events, vec![GameEvent::LevelCleared]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut queue = EventQueue::new();
        queue.push(GameEvent::BallLost { platform: 1 });
        queue.swap();
        queue.push(GameEvent::BallLost { platform: 3 });

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.pending_count(), 0);
    }
}
