//! Frame timing utilities
//!
//! The surface ticker reports raw elapsed milliseconds; the engine works in
//! seconds. [`FrameClock`] does the conversion and keeps running statistics.

use std::collections::VecDeque;

/// Number of frame samples used for the smoothed FPS value
const FPS_SAMPLES: usize = 60;

/// Converts ticker samples into delta time and tracks frame statistics
#[derive(Debug, Clone)]
pub struct FrameClock {
    max_delta: f32,
    delta_time: f32,
    total_time: f64,
    frame_count: u64,
    samples: VecDeque<f32>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl FrameClock {
    /// Create a clock that clamps single-frame deltas to `max_delta` seconds
    pub fn new(max_delta: f32) -> Self {
        Self {
            max_delta: max_delta.max(0.0),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            samples: VecDeque::with_capacity(FPS_SAMPLES),
        }
    }

    /// Advance by one ticker sample and return the delta in seconds
    pub fn advance(&mut self, elapsed_ms: f32) -> f32 {
        let raw = (elapsed_ms.max(0.0)) / 1000.0;
        let delta = if self.max_delta > 0.0 {
            raw.min(self.max_delta)
        } else {
            raw
        };

        self.delta_time = delta;
        self.total_time += f64::from(delta);
        self.frame_count += 1;

        if self.samples.len() == FPS_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(raw);

        delta
    }

    /// Delta of the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total clamped time since the clock started, in seconds
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Number of frames advanced so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// FPS averaged over the last samples (unclamped)
    pub fn fps(&self) -> f32 {
        let sum: f32 = self.samples.iter().sum();
        if sum > 0.0 {
            self.samples.len() as f32 / sum
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_converts_milliseconds_to_seconds() {
        let mut clock = FrameClock::new(1.0);
        let dt = clock.advance(16.0);
        assert_relative_eq!(dt, 0.016);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_clamps_hitches() {
        let mut clock = FrameClock::new(0.1);
        assert_relative_eq!(clock.advance(2000.0), 0.1);
        assert_relative_eq!(clock.total_time(), 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_smoothed_fps() {
        let mut clock = FrameClock::default();
        for _ in 0..10 {
            clock.advance(20.0);
        }
        assert_relative_eq!(clock.fps(), 50.0, epsilon = 1e-3);
    }
}
