use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use prompter_core::scroll::timing::frame_duration;

/// Event handler for terminal events
pub struct EventHandler {
    tick_rate: Duration,
    frame_interval: Duration,
}

impl EventHandler {
    /// Create a handler that polls at `animation_fps` while scrolling
    pub fn with_animation_fps(tick_rate_ms: u64, animation_fps: u32) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
            frame_interval: frame_duration(animation_fps),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// How long the next poll may block
    ///
    /// Full frame rate while the engine needs it; otherwise the idle tick
    /// rate, shortened so a pending timer is not overslept.
    pub fn timeout(&self, fast: bool, deadline: Option<Instant>, now: Instant) -> Duration {
        if fast {
            return self.frame_interval;
        }
        match deadline {
            Some(deadline) => deadline
                .saturating_duration_since(now)
                .min(self.tick_rate),
            None => self.tick_rate,
        }
    }

    /// Poll for the next event, waiting at most `timeout`
    pub fn next(&self, timeout: Duration) -> Result<Option<AppEvent>> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events, ignore release events
                    if key.kind == KeyEventKind::Press {
                        Ok(Some(AppEvent::Key(key)))
                    } else {
                        Ok(None)
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left)
                    | MouseEventKind::Up(MouseButton::Left) => Ok(Some(AppEvent::Mouse(mouse))),
                    _ => Ok(None),
                },
                Event::Resize(w, h) => Ok(Some(AppEvent::Resize(w, h))),
                _ => Ok(None),
            }
        } else {
            Ok(Some(AppEvent::Tick))
        }
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// Left button pressed or released
    Mouse(MouseEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Nothing arrived before the timeout
    Tick,
}
