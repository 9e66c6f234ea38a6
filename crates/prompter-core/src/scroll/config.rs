//! L4 Atomic Layer: Scroll configuration helpers
//!
//! Re-exports the scroll configuration and derives the geometry the animator
//! works with from it.

use std::time::Duration;

pub use crate::config::{Pacing, ScrollConfig};

/// Extension trait for ScrollConfig with utility methods
pub trait ScrollConfigExt {
    /// How long `is_restarting` stays raised after a restart
    fn restart_pulse(&self) -> Duration;

    /// Offset the scroll snaps to on restart/reset
    fn preroll_offset(&self, container_height: f64) -> f64;

    /// Offset past which the script restarts
    fn max_scroll(&self, text_height: f64, container_height: f64) -> f64;

    /// Total rendered height: script body plus the blank space before and after it
    fn text_height(&self, content_height: f64, container_height: f64) -> f64;

    /// Offset increment for one tick at `speed`
    ///
    /// `elapsed` is only consulted with wall-clock pacing.
    fn step(&self, speed: f64, elapsed: Option<Duration>) -> f64;
}

impl ScrollConfigExt for ScrollConfig {
    #[inline]
    fn restart_pulse(&self) -> Duration {
        Duration::from_millis(self.restart_pulse_ms)
    }

    #[inline]
    fn preroll_offset(&self, container_height: f64) -> f64 {
        -(container_height * self.preroll_ratio)
    }

    #[inline]
    fn max_scroll(&self, text_height: f64, container_height: f64) -> f64 {
        text_height - container_height + container_height * self.tail_ratio
    }

    #[inline]
    fn text_height(&self, content_height: f64, container_height: f64) -> f64 {
        content_height + 2.0 * container_height * self.spacer_ratio
    }

    fn step(&self, speed: f64, elapsed: Option<Duration>) -> f64 {
        let per_frame = speed / self.speed_divisor;
        match self.pacing {
            Pacing::Frame => per_frame,
            Pacing::WallClock => {
                let frames = match elapsed {
                    Some(elapsed) => elapsed.as_secs_f64() * self.reference_fps as f64,
                    // First tick after start advances one nominal frame
                    None => 1.0,
                };
                per_frame * frames
            }
        }
    }
}
