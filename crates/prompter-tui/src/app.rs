use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use prompter_core::gesture::PlaybackIntent;
use prompter_core::scroll::FireOnceTimer;
use prompter_core::settings::{SettingUpdate, UpdateEffect};
use prompter_core::{AppConfig, Prompter, Script};
use ratatui::layout::Rect;
use tracing::warn;

use crate::input::Action;
use crate::layout::MonospaceLayout;
use crate::theme::Theme;

/// Speed change per key press
const SPEED_STEP: f64 = 1.0;
/// Font size change per key press
const FONT_STEP: f64 = 2.0;
/// How long a status message replaces the settings summary
const STATUS_TTL: Duration = Duration::from_secs(2);

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Prompter view
    Normal,
    /// Help overlay
    Help,
}

/// Application state
pub struct App {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Scroll and reveal engine
    pub prompter: Prompter<MonospaceLayout>,
    pub theme: Theme,
    /// Current application mode
    pub mode: Mode,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Status message
    pub status_message: Option<String>,
    status_timer: FireOnceTimer,
    /// Reset counter observed by the engine; only ever goes up
    pub reset_count: u64,
    /// Cells the prompter view occupies
    pub view_area: Rect,
}

impl App {
    pub fn new(config: Arc<AppConfig>, script: Script) -> Self {
        let layout = MonospaceLayout::from_config(&config.ui);
        let prompter = Prompter::new(layout, &config, script);
        Self {
            config,
            prompter,
            theme: Theme::default(),
            mode: Mode::Normal,
            should_quit: false,
            status_message: None,
            status_timer: FireOnceTimer::default(),
            reset_count: 0,
            view_area: Rect::default(),
        }
    }

    /// Split the terminal into the prompter view and the status bar
    pub fn split_area(area: Rect) -> (Rect, Rect) {
        let bar_height = area.height.min(1);
        let view = Rect::new(area.x, area.y, area.width, area.height - bar_height);
        let bar = Rect::new(area.x, area.y + view.height, area.width, bar_height);
        (view, bar)
    }

    /// Track the terminal size; the engine sees it in layout pixels
    pub fn resize(&mut self, width: u16, height: u16, now: Instant) {
        let (view, _) = Self::split_area(Rect::new(0, 0, width, height));
        self.view_area = view;
        let layout = self.prompter.layout();
        let (cell_w, cell_h) = (layout.cell_width(), layout.cell_height());
        self.prompter
            .resize(view.width as f64 * cell_w, view.height as f64 * cell_h, now);
    }

    /// Run one frame of engine work and expire the status message
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.status_timer.fire(now) {
            self.status_message = None;
        }
        self.prompter.advance(now)
    }

    /// True while the event loop should poll at frame rate
    pub fn needs_fast_update(&self) -> bool {
        self.prompter.needs_fast_update()
    }

    pub fn handle_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePlay => self.apply(SettingUpdate::TogglePlaying, now),
            Action::SpeedUp => self.apply(SettingUpdate::AdjustSpeed(SPEED_STEP), now),
            Action::SpeedDown => self.apply(SettingUpdate::AdjustSpeed(-SPEED_STEP), now),
            Action::FontLarger => self.apply(SettingUpdate::AdjustFontSize(FONT_STEP), now),
            Action::FontSmaller => self.apply(SettingUpdate::AdjustFontSize(-FONT_STEP), now),
            Action::ToggleFlip => self.apply(SettingUpdate::ToggleFlipped, now),
            Action::ToggleOutline => self.apply(SettingUpdate::ToggleOutline, now),
            Action::CycleAlign => self.apply(SettingUpdate::CycleTextAlign, now),
            Action::Reset => self.request_reset(now),
            Action::ShowHelp => self.mode = Mode::Help,
            Action::ExitMode => self.mode = Mode::Normal,
            Action::None => {}
        }
    }

    /// Forward a left-button press/release to the gesture interpreter
    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let y = self.touch_y(mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.prompter.touch_start(y, now),
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(PlaybackIntent::TogglePlayback) = self.prompter.touch_end(y, now) {
                    self.apply(SettingUpdate::TogglePlaying, now);
                }
            }
            _ => {}
        }
    }

    /// Centre of a terminal row, in layout pixels from the top of the view
    fn touch_y(&self, row: u16) -> f64 {
        let cell_h = self.prompter.layout().cell_height();
        let rel = row.saturating_sub(self.view_area.y) as f64;
        rel * cell_h + cell_h / 2.0
    }

    /// Bump the reset counter and let the engine observe it
    pub fn request_reset(&mut self, now: Instant) {
        self.reset_count += 1;
        self.prompter.observe_reset_trigger(self.reset_count, now);
    }

    fn apply(&mut self, update: SettingUpdate, now: Instant) {
        match self.prompter.update_setting(update, now) {
            Ok(UpdateEffect::Unchanged) => {}
            Ok(effect) => {
                let settings = self.prompter.settings();
                let message = match effect {
                    UpdateEffect::Speed => format!("Speed {}", settings.speed),
                    UpdateEffect::Layout => format!(
                        "Size {} · {}",
                        settings.font_size,
                        settings.text_align.as_str()
                    ),
                    _ => return self.clear_status(),
                };
                self.set_status(message, now);
            }
            Err(e) => {
                warn!(error = %e, "Rejected setting change");
                self.set_status(format!("Error: {}", e), now);
            }
        }
    }

    /// Show a status message for a couple of seconds
    pub fn set_status(&mut self, message: impl Into<String>, now: Instant) {
        self.status_message = Some(message.into());
        self.status_timer.arm(now, STATUS_TTL);
    }

    /// Clear the status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
        self.status_timer.cancel();
    }
}
