//! Touch gesture classification
//!
//! A single-pointer press/release pair is classified as a long press, a tap,
//! a swipe or nothing. Long presses and swipes act on the [`ScrollAnimator`]
//! directly; a tap only produces a [`PlaybackIntent`] for whoever owns the
//! play state.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::GestureConfig;
use crate::scroll::ScrollAnimator;

/// Where and when a touch started or ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSample {
    pub y: f64,
    pub at: Instant,
}

/// Direction the finger travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved up the screen: advance through the script
    Up,
    /// Finger moved down the screen: go back
    Down,
}

/// Outcome of one completed touch sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    LongPress,
    Tap,
    Swipe(SwipeDirection),
    None,
}

/// Request for the play-state owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackIntent {
    TogglePlayback,
}

/// Single-slot touch tracker and classifier
#[derive(Debug, Clone, Default)]
pub struct GestureInterpreter {
    config: GestureConfig,
    sample: Option<TouchSample>,
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            sample: None,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Begin tracking a touch; an unresolved earlier touch is dropped
    pub fn touch_start(&mut self, y: f64, at: Instant) {
        if let Some(prev) = self.sample.replace(TouchSample { y, at }) {
            debug!(start_y = prev.y, "Discarding unfinished touch");
        }
    }

    /// Finish the tracked touch and classify it
    ///
    /// Without a matching start this is `Gesture::None`.
    pub fn touch_end(&mut self, y: f64, at: Instant) -> Gesture {
        match self.sample.take() {
            Some(start) => self.classify(start, TouchSample { y, at }),
            None => Gesture::None,
        }
    }

    /// Drop the tracked touch without classifying it
    pub fn cancel(&mut self) {
        self.sample = None;
    }

    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.sample.is_some()
    }

    /// Classify a start/end pair; the first matching rule wins
    pub fn classify(&self, start: TouchSample, end: TouchSample) -> Gesture {
        let delta_y = start.y - end.y;
        let distance = delta_y.abs();
        let elapsed = end.at.saturating_duration_since(start.at);
        let c = &self.config;

        let still = distance < c.still_threshold;
        if still && elapsed > Duration::from_millis(c.long_press_ms) {
            return Gesture::LongPress;
        }
        if still && elapsed < Duration::from_millis(c.tap_ms) {
            return Gesture::Tap;
        }
        if distance > c.swipe_distance && elapsed < Duration::from_millis(c.swipe_ms) {
            let direction = if delta_y > 0.0 {
                SwipeDirection::Up
            } else {
                SwipeDirection::Down
            };
            return Gesture::Swipe(direction);
        }
        Gesture::None
    }

    /// Offset change for a swipe: up advances, down goes back
    pub fn swipe_delta(&self, direction: SwipeDirection) -> f64 {
        match direction {
            SwipeDirection::Up => self.config.swipe_step,
            SwipeDirection::Down => -self.config.swipe_step,
        }
    }

    /// Carry out a gesture against the animator
    ///
    /// Returns the intent a tap produces; the interpreter never toggles
    /// playback itself.
    pub fn dispatch(
        &self,
        gesture: Gesture,
        animator: &mut ScrollAnimator,
        container_height: f64,
        now: Instant,
    ) -> Option<PlaybackIntent> {
        match gesture {
            Gesture::LongPress => {
                animator.reset(container_height, now);
                None
            }
            Gesture::Tap => Some(PlaybackIntent::TogglePlayback),
            Gesture::Swipe(direction) => {
                animator.adjust(self.swipe_delta(direction), container_height);
                None
            }
            Gesture::None => None,
        }
    }
}
