//! Engine facade
//!
//! [`Prompter`] wires the measurer, animator, reveal computer and gesture
//! interpreter together around one settings snapshot and one script. A host
//! feeds it container sizes, setting changes and touches, calls
//! [`Prompter::advance`] once per frame and draws whatever
//! [`Prompter::render`] returns.

use std::time::Instant;

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::gesture::{GestureInterpreter, PlaybackIntent};
use crate::layout::{LayoutMeasurer, LayoutRequest, TextLayout, WordGeometry};
use crate::reveal::{RevealAttributes, RevealComputer, RevealMetrics};
use crate::script::{Script, Word};
use crate::scroll::{ScrollAnimator, ScrollConfigExt, Viewport};
use crate::settings::{Rgb, SettingUpdate, Settings, TextAlign, UpdateEffect};
use crate::Result;

/// Offsets of the four outline shadows, in pixels
pub const OUTLINE_OFFSETS: [(f64, f64); 4] = [(2.0, 2.0), (-2.0, -2.0), (2.0, -2.0), (-2.0, 2.0)];

/// Size of the scroll container
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

/// One text shadow of the outline effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineShadow {
    pub dx: f64,
    pub dy: f64,
    pub color: Rgb,
}

/// Container-level presentation derived from the settings
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDirective {
    /// Mirror horizontally for beam-splitter glass
    pub mirrored: bool,
    /// Empty unless the outline is enabled
    pub outline: Vec<OutlineShadow>,
    /// Horizontal padding on each side, percent of container width
    pub padding_percent: f64,
    pub align: TextAlign,
    pub font_size: f64,
    pub text_color: Rgb,
    pub background_color: Rgb,
}

/// A token ready to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedWord<'a> {
    pub text: &'a str,
    pub is_whitespace: bool,
    /// Absent until the first successful measurement
    pub geometry: Option<WordGeometry>,
    /// Top of the token inside the container at the current offset
    pub screen_y: Option<f64>,
    pub attributes: RevealAttributes,
}

/// Everything the host needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame<'a> {
    pub offset: f64,
    pub container: ContainerSize,
    pub reading_line: f64,
    pub is_playing: bool,
    pub is_restarting: bool,
    pub words: Vec<RenderedWord<'a>>,
    pub directive: ContainerDirective,
}

/// Scroll-and-reveal engine bound to one text layout backend
pub struct Prompter<L: TextLayout> {
    layout: L,
    settings: Settings,
    script: Script,
    measurer: LayoutMeasurer,
    animator: ScrollAnimator,
    reveal: RevealComputer,
    gestures: GestureInterpreter,
    container: ContainerSize,
    /// Last value seen from the external reset counter
    reset_counter: u64,
}

impl<L: TextLayout> Prompter<L> {
    pub fn new(layout: L, config: &AppConfig, script: Script) -> Self {
        let settings = config.display.clone().sanitized();
        let mut animator = ScrollAnimator::new(config.scroll.clone(), settings.speed);
        if settings.is_playing {
            animator.start();
        }

        Self {
            layout,
            settings,
            script,
            measurer: LayoutMeasurer::new(config.layout.clone()),
            animator,
            reveal: RevealComputer::new(config.reveal.clone()),
            gestures: GestureInterpreter::new(config.gesture.clone()),
            container: ContainerSize::default(),
            reset_counter: 0,
        }
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn animator(&self) -> &ScrollAnimator {
        &self.animator
    }

    pub fn measurer(&self) -> &LayoutMeasurer {
        &self.measurer
    }

    pub fn container(&self) -> ContainerSize {
        self.container
    }

    fn layout_request(&self) -> LayoutRequest {
        LayoutRequest {
            font_size: self.settings.font_size,
            container_width: self.container.width,
            container_height: self.container.height,
            margin_percent: self.settings.margin,
            align: self.settings.text_align,
        }
    }

    /// Replace the script; geometry is re-measured after the settle delay
    pub fn set_script(&mut self, script: Script, now: Instant) {
        info!(tokens = script.len(), "Loaded script");
        self.script = script;
        self.gestures.cancel();
        self.measurer.request(self.layout_request(), now);
    }

    /// Record a new container size
    pub fn resize(&mut self, width: f64, height: f64, now: Instant) {
        let size = ContainerSize { width, height };
        if size == self.container {
            return;
        }
        debug!(width, height, "Container resized");
        self.container = size;
        self.measurer.request_if_changed(self.layout_request(), now);
    }

    /// Apply a settings change and route it to the part that cares
    pub fn update_setting(&mut self, update: SettingUpdate, now: Instant) -> Result<UpdateEffect> {
        let effect = self.settings.apply(update)?;
        match effect {
            UpdateEffect::Playback => self.sync_playback(),
            UpdateEffect::Speed => self.animator.set_speed(self.settings.speed),
            UpdateEffect::Layout => {
                self.measurer.request_if_changed(self.layout_request(), now);
            }
            UpdateEffect::Style | UpdateEffect::Unchanged => {}
        }
        Ok(effect)
    }

    fn sync_playback(&mut self) {
        if self.settings.is_playing {
            self.animator.start();
        } else {
            self.animator.stop();
        }
    }

    /// Reset whenever the externally owned counter goes up
    ///
    /// Returns true when a reset was performed.
    pub fn observe_reset_trigger(&mut self, counter: u64, now: Instant) -> bool {
        let increased = counter > self.reset_counter;
        self.reset_counter = counter;
        if increased {
            self.reset(now);
        }
        increased
    }

    pub fn reset(&mut self, now: Instant) {
        info!("Restarting script");
        self.animator.reset(self.container.height, now);
    }

    pub fn touch_start(&mut self, y: f64, now: Instant) {
        self.gestures.touch_start(y, now);
    }

    /// Finish a touch; a tap comes back as an intent for the play-state owner
    pub fn touch_end(&mut self, y: f64, now: Instant) -> Option<PlaybackIntent> {
        let gesture = self.gestures.touch_end(y, now);
        debug!(?gesture, "Touch classified");
        self.gestures
            .dispatch(gesture, &mut self.animator, self.container.height, now)
    }

    /// Current extents the animator bounds its offset against
    pub fn viewport(&self) -> Viewport {
        let h = self.container.height;
        Viewport {
            container_height: h,
            text_height: self
                .animator
                .config()
                .text_height(self.measurer.content_height(), h),
        }
    }

    /// One frame of work: settle the measurer, tick, expire the restart pulse
    ///
    /// Returns true when anything visible changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        let mut changed = self.measurer.poll(&self.layout, self.script.words(), now);

        if self.animator.is_playing() {
            let before = self.animator.offset();
            let after = self.animator.tick(self.viewport(), now);
            changed |= after != before;
        }

        changed |= self.animator.update(now);
        changed
    }

    #[inline]
    pub fn is_restarting(&self) -> bool {
        self.animator.is_restarting()
    }

    /// True while the host should keep its frame loop at full rate
    pub fn needs_fast_update(&self) -> bool {
        self.animator.needs_update()
    }

    /// Earliest pending timer, for hosts that sleep while paused
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.measurer.next_deadline(), self.animator.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn directive(&self) -> ContainerDirective {
        let outline = if self.settings.has_outline {
            OUTLINE_OFFSETS
                .iter()
                .map(|&(dx, dy)| OutlineShadow {
                    dx,
                    dy,
                    color: Rgb::BLACK,
                })
                .collect()
        } else {
            Vec::new()
        };

        ContainerDirective {
            mirrored: self.settings.is_flipped,
            outline,
            padding_percent: self.settings.margin,
            align: self.settings.text_align,
            font_size: self.settings.font_size,
            text_color: self.settings.text_rgb(),
            background_color: self.settings.background_rgb(),
        }
    }

    /// Per-word reveal attributes plus the container directive for this frame
    pub fn render(&self) -> RenderFrame<'_> {
        let offset = self.animator.offset();
        let h = self.container.height;
        let words: &[Word] = self.script.words();
        let geometry = self.measurer.geometry();
        let metrics = RevealMetrics {
            container_height: h,
            font_size: self.settings.font_size,
        };
        let attributes = self
            .reveal
            .compute_all(geometry, words.len(), offset, metrics);
        let geometry = geometry.filter(|g| g.len() == words.len());

        let words = words
            .iter()
            .zip(attributes)
            .enumerate()
            .map(|(i, (word, attributes))| {
                let geometry = geometry.map(|g| g[i]);
                RenderedWord {
                    text: &word.text,
                    is_whitespace: word.is_whitespace,
                    geometry,
                    screen_y: geometry.map(|g| self.reveal.screen_y(g.top, offset, h)),
                    attributes,
                }
            })
            .collect();

        RenderFrame {
            offset,
            container: self.container,
            reading_line: self.reveal.reading_line(h),
            is_playing: self.animator.is_playing(),
            is_restarting: self.animator.is_restarting(),
            words,
            directive: self.directive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::layout::TokenBox;

    /// One token per line at a 1.5 × font size pitch
    struct StackLayout;

    impl TextLayout for StackLayout {
        fn measure(&self, words: &[Word], request: &LayoutRequest) -> crate::Result<Vec<TokenBox>> {
            Ok(words
                .iter()
                .map(|w| TokenBox {
                    top: w.index as f64 * request.font_size * 1.5,
                    left: 0.0,
                    width: w.text.len() as f64 * 10.0,
                    height: request.font_size,
                })
                .collect())
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn prompter(text: &str, t0: Instant) -> Prompter<StackLayout> {
        let mut prompter = Prompter::new(StackLayout, &AppConfig::default(), Script::new(text));
        prompter.resize(800.0, 600.0, t0);
        prompter
    }

    #[test]
    fn test_render_before_measurement_is_neutral() {
        let t0 = Instant::now();
        let prompter = prompter("hello there", t0);
        let frame = prompter.render();
        assert_eq!(frame.words.len(), 3);
        for word in &frame.words {
            assert!(word.geometry.is_none());
            assert_eq!(word.attributes, RevealAttributes::NEUTRAL);
        }
    }

    #[test]
    fn test_geometry_lands_after_settle() {
        let t0 = Instant::now();
        let mut prompter = prompter("hello there", t0);
        assert!(!prompter.advance(t0 + ms(100)));
        assert!(prompter.advance(t0 + ms(150)));

        let frame = prompter.render();
        assert!(frame.words.iter().all(|w| w.geometry.is_some()));
        assert_eq!(frame.words[0].text, "hello");
        // top 0, offset 0: 0 - 0 + 600 * 0.6
        assert_eq!(frame.words[0].screen_y, Some(360.0));
        assert_eq!(frame.reading_line, 300.0);
    }

    #[test]
    fn test_playing_advances_each_frame() {
        let t0 = Instant::now();
        let mut prompter = prompter("a b c d e f", t0);
        prompter.advance(t0 + ms(150));
        prompter
            .update_setting(SettingUpdate::SetPlaying(true), t0 + ms(150))
            .unwrap();
        assert!(prompter.needs_fast_update());

        prompter.advance(t0 + ms(166));
        assert_eq!(prompter.render().offset, 1.0);

        prompter
            .update_setting(SettingUpdate::SetPlaying(false), t0 + ms(170))
            .unwrap();
        prompter.advance(t0 + ms(182));
        assert_eq!(prompter.render().offset, 1.0);
        assert!(!prompter.needs_fast_update());
    }

    #[test]
    fn test_speed_setting_reaches_animator() {
        let t0 = Instant::now();
        let mut prompter = prompter("a b", t0);
        prompter
            .update_setting(SettingUpdate::SetSpeed(25.0), t0)
            .unwrap();
        assert_eq!(prompter.animator().speed(), 25.0);
    }

    #[test]
    fn test_layout_setting_schedules_measurement() {
        let t0 = Instant::now();
        let mut prompter = prompter("a b", t0);
        prompter.advance(t0 + ms(150));
        assert!(!prompter.measurer().is_pending());

        let effect = prompter
            .update_setting(SettingUpdate::AdjustFontSize(2.0), t0 + ms(200))
            .unwrap();
        assert_eq!(effect, UpdateEffect::Layout);
        assert!(prompter.measurer().is_pending());
        assert_eq!(prompter.next_deadline(), Some(t0 + ms(350)));
    }

    #[test]
    fn test_invalid_colour_is_rejected() {
        let t0 = Instant::now();
        let mut prompter = prompter("a", t0);
        let err = prompter.update_setting(SettingUpdate::SetTextColor("teal-ish".into()), t0);
        assert!(err.is_err());
        assert_eq!(prompter.settings().text_color, "#ffffff");
    }

    #[test]
    fn test_reset_counter_increase_only() {
        let t0 = Instant::now();
        let mut prompter = prompter("a b c", t0);
        assert!(prompter.observe_reset_trigger(1, t0));
        assert_eq!(prompter.render().offset, -300.0);
        assert!(prompter.is_restarting());

        assert!(!prompter.observe_reset_trigger(1, t0 + ms(10)));
        assert!(!prompter.observe_reset_trigger(0, t0 + ms(20)));
        assert!(prompter.observe_reset_trigger(4, t0 + ms(30)));

        prompter.advance(t0 + ms(530));
        assert!(!prompter.is_restarting());
    }

    #[test]
    fn test_tap_does_not_toggle_playback() {
        let t0 = Instant::now();
        let mut prompter = prompter("a b c", t0);
        prompter.touch_start(200.0, t0);
        let intent = prompter.touch_end(201.0, t0 + ms(80));
        assert_eq!(intent, Some(PlaybackIntent::TogglePlayback));
        assert!(!prompter.settings().is_playing);
        assert!(!prompter.animator().is_playing());
    }

    #[test]
    fn test_swipe_and_long_press() {
        let t0 = Instant::now();
        let mut prompter = prompter("a b c", t0);

        prompter.touch_start(400.0, t0);
        assert_eq!(prompter.touch_end(250.0, t0 + ms(100)), None);
        assert_eq!(prompter.render().offset, 100.0);

        prompter.touch_start(300.0, t0 + ms(200));
        prompter.touch_end(300.0, t0 + ms(1300));
        assert_eq!(prompter.render().offset, -300.0);
        assert!(prompter.is_restarting());
    }

    #[test]
    fn test_directive_follows_settings() {
        let t0 = Instant::now();
        let mut prompter = prompter("a", t0);
        assert!(prompter.directive().outline.is_empty());
        assert!(!prompter.directive().mirrored);

        prompter.update_setting(SettingUpdate::ToggleOutline, t0).unwrap();
        prompter.update_setting(SettingUpdate::ToggleFlipped, t0).unwrap();
        prompter
            .update_setting(SettingUpdate::SetTextAlign(TextAlign::Right), t0)
            .unwrap();

        let directive = prompter.directive();
        assert!(directive.mirrored);
        assert_eq!(directive.align, TextAlign::Right);
        let offsets: Vec<(f64, f64)> = directive.outline.iter().map(|s| (s.dx, s.dy)).collect();
        assert_eq!(offsets, OUTLINE_OFFSETS.to_vec());
        assert!(directive.outline.iter().all(|s| s.color == Rgb::BLACK));
    }

    #[test]
    fn test_empty_script_renders_nothing() {
        let t0 = Instant::now();
        let mut prompter = prompter("a b", t0);
        prompter.advance(t0 + ms(150));
        prompter.set_script(Script::new(""), t0 + ms(200));
        prompter.advance(t0 + ms(350));

        assert!(prompter.measurer().geometry().is_none());
        assert!(prompter.render().words.is_empty());
    }

    #[test]
    fn test_idle_has_no_deadline() {
        let t0 = Instant::now();
        let mut prompter = prompter("a", t0);
        prompter.advance(t0 + ms(150));
        assert_eq!(prompter.next_deadline(), None);
        assert!(!prompter.needs_fast_update());
    }

    #[test]
    fn test_restart_after_measured_script_scrolls_past() {
        let t0 = Instant::now();
        // Tokens "a", " ", "b" stacked at 99px pitch; last bottom 198 + 66
        let mut prompter = prompter("a b", t0);
        prompter.advance(t0 + ms(150));
        assert_eq!(prompter.measurer().content_height(), 264.0);
        // content + 2 * 0.6h
        assert_eq!(prompter.viewport().text_height, 984.0);

        prompter.update_setting(SettingUpdate::SetSpeed(30.0), t0 + ms(150)).unwrap();
        prompter.update_setting(SettingUpdate::SetPlaying(true), t0 + ms(150)).unwrap();

        // 3px per frame reaches content + 0.7h = 684 without wrapping
        for frame in 1..=228 {
            prompter.advance(t0 + ms(150 + frame));
        }
        assert_eq!(prompter.render().offset, 684.0);
        assert!(!prompter.is_restarting());

        let wrapped_at = t0 + ms(150 + 229);
        prompter.advance(wrapped_at);
        assert_eq!(prompter.render().offset, -300.0);
        assert!(prompter.is_restarting());
        assert!(prompter.settings().is_playing);

        prompter.advance(wrapped_at + ms(500));
        assert!(!prompter.is_restarting());
        assert_eq!(prompter.render().offset, -297.0);
    }

    #[test]
    fn test_zero_height_container_never_restarts() {
        let t0 = Instant::now();
        let mut prompter = Prompter::new(StackLayout, &AppConfig::default(), Script::new("a b"));
        prompter.update_setting(SettingUpdate::SetPlaying(true), t0).unwrap();
        for frame in 0..100 {
            prompter.advance(t0 + ms(frame * 16));
        }
        assert_eq!(prompter.render().offset, 0.0);
        assert!(!prompter.is_restarting());
    }
}
