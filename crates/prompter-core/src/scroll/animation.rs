//! L3 Molecular Layer: Scroll position controller
//!
//! Advances the scroll offset once per rendered frame while playing, wraps
//! back to the pre-roll when the script has fully scrolled past, and applies
//! manual adjustments coming from gestures.

use std::time::Instant;

use tracing::debug;

use super::config::{ScrollConfig, ScrollConfigExt};
use super::timing::FireOnceTimer;
use crate::settings::SPEED_RANGE;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollState {
    offset: f64,
    is_playing: bool,
    is_restarting: bool,
    speed: f64,
}

/// Container and content extents a tick is checked against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub container_height: f64,
    /// Full rendered height, spacers included
    pub text_height: f64,
}

impl Viewport {
    /// A container with no height yet (before the first layout)
    fn is_degenerate(&self) -> bool {
        !(self.container_height.is_finite() && self.container_height > 0.0)
    }
}

/// Scroll position controller
///
/// Call `start()`/`stop()` to gate the tick loop and `tick()` once per frame
/// while playing. `update()` expires the restart pulse and may be called on
/// any frame, playing or not.
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    state: ScrollState,
    config: ScrollConfig,
    restart_timer: FireOnceTimer,
    /// Time of the previous tick, for wall-clock pacing
    last_tick: Option<Instant>,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new(ScrollConfig::default(), 10.0)
    }
}

impl ScrollAnimator {
    /// Create a new animator at offset 0, paused
    pub fn new(config: ScrollConfig, speed: f64) -> Self {
        let mut animator = Self {
            state: ScrollState {
                offset: 0.0,
                is_playing: false,
                is_restarting: false,
                speed: SPEED_RANGE.0,
            },
            config,
            restart_timer: FireOnceTimer::default(),
            last_tick: None,
        };
        animator.set_speed(speed);
        animator
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Get current configuration
    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.state.offset
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    #[inline]
    pub fn is_restarting(&self) -> bool {
        self.state.is_restarting
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.state.speed
    }

    /// Check if there's pending work (ticking or a restart pulse to expire)
    /// Use this to determine if we need high frame rate
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.state.is_playing || self.restart_timer.is_armed()
    }

    /// When the restart pulse ends, if one is running
    pub fn next_deadline(&self) -> Option<Instant> {
        self.restart_timer.deadline()
    }

    /// Fraction of the restart pulse that has elapsed
    pub fn restart_progress(&self, now: Instant) -> f64 {
        self.restart_timer.progress(now)
    }

    /// Let the scheduler invoke `tick()`; the offset is untouched
    pub fn start(&mut self) {
        self.state.is_playing = true;
        self.last_tick = None;
    }

    /// Stop ticking; the offset is untouched
    pub fn stop(&mut self) {
        self.state.is_playing = false;
        self.last_tick = None;
    }

    /// Change speed; takes effect from the next tick
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() {
            self.state.speed = speed.clamp(SPEED_RANGE.0, SPEED_RANGE.1);
        }
    }

    /// Advance one frame and return the new offset
    ///
    /// No-op while paused. With a zero-height container the bound check is
    /// skipped and the offset is left as is.
    pub fn tick(&mut self, viewport: Viewport, now: Instant) -> f64 {
        if !self.state.is_playing {
            return self.state.offset;
        }

        let elapsed = self.last_tick.map(|prev| now.saturating_duration_since(prev));
        self.last_tick = Some(now);

        if viewport.is_degenerate() {
            return self.state.offset;
        }

        let next = self.state.offset + self.config.step(self.state.speed, elapsed);
        let max_scroll = self
            .config
            .max_scroll(viewport.text_height, viewport.container_height);

        if max_scroll.is_finite() && next > max_scroll {
            debug!(offset = next, max_scroll, "Script finished, restarting");
            self.restart(viewport.container_height, now);
        } else if next.is_finite() {
            self.state.offset = next;
        }

        self.state.offset
    }

    /// Snap back to the pre-roll start and raise the restart pulse
    ///
    /// Works whether or not the animator is playing.
    pub fn reset(&mut self, container_height: f64, now: Instant) {
        self.restart(container_height, now);
    }

    /// Manual offset change from a swipe, never above `-container_height`
    pub fn adjust(&mut self, delta: f64, container_height: f64) {
        if !delta.is_finite() {
            return;
        }
        let floor = -sanitize_height(container_height);
        self.state.offset = (self.state.offset + delta).max(floor);
    }

    /// Expire the restart pulse; returns true when it just ended
    pub fn update(&mut self, now: Instant) -> bool {
        if self.restart_timer.fire(now) {
            self.state.is_restarting = false;
            true
        } else {
            false
        }
    }

    fn restart(&mut self, container_height: f64, now: Instant) {
        self.state.offset = self.config.preroll_offset(sanitize_height(container_height));
        self.state.is_restarting = true;
        self.restart_timer.arm(now, self.config.restart_pulse());
        self.last_tick = Some(now);
    }
}

fn sanitize_height(height: f64) -> f64 {
    if height.is_finite() {
        height.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Pacing;

    const ROOMY: Viewport = Viewport {
        container_height: 600.0,
        text_height: 100_000.0,
    };

    fn playing(speed: f64) -> ScrollAnimator {
        let mut animator = ScrollAnimator::new(ScrollConfig::default(), speed);
        animator.start();
        animator
    }

    #[test]
    fn test_tick_adds_speed_over_ten() {
        let now = Instant::now();
        for speed in 1..=30 {
            let speed = speed as f64;
            let mut animator = playing(speed);
            let before = animator.offset();
            animator.tick(ROOMY, now);
            assert_eq!(animator.offset() - before, speed / 10.0, "speed {}", speed);
        }
    }

    #[test]
    fn test_paused_tick_is_noop() {
        let mut animator = ScrollAnimator::with_defaults();
        animator.tick(ROOMY, Instant::now());
        assert_eq!(animator.offset(), 0.0);
    }

    #[test]
    fn test_start_stop_leave_offset() {
        let now = Instant::now();
        let mut animator = playing(10.0);
        animator.tick(ROOMY, now);
        let offset = animator.offset();
        animator.stop();
        assert_eq!(animator.offset(), offset);
        animator.start();
        assert_eq!(animator.offset(), offset);
        assert!(animator.is_playing());
    }

    #[test]
    fn test_reset_snaps_and_pulses() {
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::with_defaults();
        animator.adjust(450.0, 600.0);

        animator.reset(600.0, t0);
        assert_eq!(animator.offset(), -300.0);
        assert!(animator.is_restarting());
        assert!(animator.needs_update());

        assert!(!animator.update(t0 + Duration::from_millis(499)));
        assert!(animator.is_restarting());
        assert!(animator.update(t0 + Duration::from_millis(500)));
        assert!(!animator.is_restarting());
        assert!(!animator.needs_update());
    }

    #[test]
    fn test_reset_again_extends_pulse() {
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::with_defaults();
        animator.reset(600.0, t0);
        animator.reset(600.0, t0 + Duration::from_millis(400));

        assert!(!animator.update(t0 + Duration::from_millis(600)));
        assert!(animator.is_restarting());
        assert!(animator.update(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_restart_progress() {
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::with_defaults();
        assert_eq!(animator.restart_progress(t0), 0.0);

        animator.reset(600.0, t0);
        assert!((animator.restart_progress(t0 + Duration::from_millis(250)) - 0.5).abs() < 0.001);

        animator.update(t0 + Duration::from_millis(500));
        assert_eq!(animator.restart_progress(t0 + Duration::from_millis(500)), 0.0);
    }

    #[test]
    fn test_overrun_restarts() {
        let t0 = Instant::now();
        let viewport = Viewport {
            container_height: 600.0,
            text_height: 2000.0,
        };
        // max_scroll = 2000 - 600 + 300 = 1700
        let mut animator = playing(10.0);
        animator.adjust(1698.5, 600.0);
        animator.tick(viewport, t0);
        assert_eq!(animator.offset(), 1699.5);
        assert!(!animator.is_restarting());

        animator.tick(viewport, t0 + Duration::from_millis(16));
        assert_eq!(animator.offset(), -300.0);
        assert!(animator.is_restarting());

        animator.update(t0 + Duration::from_millis(516));
        assert!(!animator.is_restarting());
    }

    #[test]
    fn test_offset_monotonic_until_restart() {
        let t0 = Instant::now();
        let viewport = Viewport {
            container_height: 200.0,
            text_height: 400.0,
        };
        let mut animator = playing(30.0);
        let mut prev = animator.offset();
        let mut restarts = 0;
        for frame in 0..500u64 {
            let offset = animator.tick(viewport, t0 + Duration::from_millis(frame * 16));
            if offset < prev {
                assert_eq!(offset, -100.0);
                restarts += 1;
            }
            prev = offset;
        }
        assert!(restarts > 0);
    }

    #[test]
    fn test_degenerate_container_leaves_offset() {
        let mut animator = playing(10.0);
        let viewport = Viewport {
            container_height: 0.0,
            text_height: 0.0,
        };
        animator.tick(viewport, Instant::now());
        assert_eq!(animator.offset(), 0.0);
        assert!(!animator.is_restarting());
    }

    #[test]
    fn test_speed_change_applies_next_tick() {
        let t0 = Instant::now();
        let mut animator = playing(10.0);
        animator.tick(ROOMY, t0);
        assert_eq!(animator.offset(), 1.0);

        animator.set_speed(20.0);
        assert_eq!(animator.offset(), 1.0);
        animator.tick(ROOMY, t0 + Duration::from_millis(16));
        assert_eq!(animator.offset(), 3.0);

        animator.set_speed(400.0);
        assert_eq!(animator.speed(), 30.0);
    }

    #[test]
    fn test_adjust_clamps_to_container() {
        let mut animator = ScrollAnimator::with_defaults();
        animator.adjust(-100.0, 50.0);
        assert_eq!(animator.offset(), -50.0);

        animator.adjust(100.0, 50.0);
        assert_eq!(animator.offset(), 50.0);

        animator.adjust(f64::NAN, 50.0);
        assert_eq!(animator.offset(), 50.0);
    }

    #[test]
    fn test_wall_clock_pacing() {
        let config = ScrollConfig {
            pacing: Pacing::WallClock,
            reference_fps: 60,
            ..Default::default()
        };
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::new(config, 6.0);
        animator.start();

        animator.tick(ROOMY, t0);
        assert!((animator.offset() - 0.6).abs() < 1e-9);

        // One second later: 60 nominal frames
        animator.tick(ROOMY, t0 + Duration::from_secs(1));
        assert!((animator.offset() - 36.6).abs() < 1e-9);
    }
}
