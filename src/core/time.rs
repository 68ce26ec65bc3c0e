//! Wall-clock time tracking for the demo runner

use std::time::{Duration, Instant};

/// Tracks elapsed wall time and the delta between updates
#[derive(Debug, Clone)]
pub struct Time {
    start: Instant,
    last: Instant,
    delta: Duration,
}

impl Time {
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            delta: Duration::ZERO,
        }
    }

    /// Advance to now, recording the delta since the previous update
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last;
        self.last = now;
    }

    /// Delta of the most recent update
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta of the most recent update, in seconds
    #[must_use]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Wall time since construction
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.last - self.start
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
    fn test_update_advances_elapsed() {
        let mut time = Time::new();
        assert_eq!(time.delta(), Duration::ZERO);

        std::thread::sleep(Duration::from_millis(5));
        time.update();

        assert!(time.delta() > Duration::ZERO);
        assert!(time.elapsed() >= time.delta());
    }
}
