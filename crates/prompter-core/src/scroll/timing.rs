//! L4 Atomic Layer: Time calculation utilities for the scroll engine
//!
//! Pure functions over explicit `Instant`s plus a single-slot timer. Nothing
//! here reads the clock; callers pass `now` so behaviour is reproducible.

use std::time::{Duration, Instant};

/// Calculate progress (0.0 to 1.0) of a span that started at `start`
#[inline]
pub fn progress(start: Instant, now: Instant, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start);
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Duration of one frame at the given rate
#[inline]
pub fn frame_duration(fps: u32) -> Duration {
    if fps == 0 {
        Duration::from_millis(16) // ~60fps fallback
    } else {
        Duration::from_nanos(1_000_000_000 / fps as u64)
    }
}

/// Fire-once timer
///
/// Arming it again before it fires moves the deadline instead of stacking a
/// second timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FireOnceTimer {
    started: Option<Instant>,
    deadline: Option<Instant>,
}

impl FireOnceTimer {
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.started = Some(now);
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.started = None;
        self.deadline = None;
    }

    /// Returns true exactly once, on the first call at or after the deadline
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.cancel();
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fraction of the armed span that has elapsed (0.0 when not armed)
    pub fn progress(&self, now: Instant) -> f64 {
        match (self.started, self.deadline) {
            (Some(start), Some(deadline)) => progress(start, now, deadline - start),
            _ => 0.0,
        }
    }
}
