//! Frame pacing

use std::thread;
use std::time::{Duration, Instant};

/// Paces the render loop to a target frame rate
#[derive(Debug)]
pub struct FrameClock {
    frame: Duration,
    deadline: Instant,
}

impl FrameClock {
    pub fn new(target_fps: u32) -> Self {
        let frame = Duration::from_secs(1) / target_fps.max(1);
        Self {
            frame,
            deadline: Instant::now() + frame,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame
    }

    /// Time left before the current frame is due
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Sleep out the rest of the frame and start the next one.
    ///
    /// A loop that fell behind does not try to catch up.
    pub fn wait(&mut self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }

        let now = Instant::now();
        self.deadline += self.frame;
        if self.deadline < now {
            self.deadline = now + self.frame;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_duration() {
        assert_eq!(FrameClock::new(100).frame_duration(), Duration::from_millis(10));
        // Zero is treated as one frame per second
        assert_eq!(FrameClock::new(0).frame_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_wait_paces_frames() {
        let mut clock = FrameClock::new(100);
        let started = Instant::now();
        for _ in 0..5 {
            clock.wait();
        }
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_late_frame_does_not_burst() {
        let mut clock = FrameClock::new(100);
        thread::sleep(Duration::from_millis(50));
        clock.wait();
        // Deadline was reset from now rather than stacking up missed frames
        assert!(!clock.remaining().is_zero());
    }
}
