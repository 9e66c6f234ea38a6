//! Settings snapshot and its single update entry point
//!
//! The engine never shares a mutable settings object with its host. The host
//! holds a `Settings` value and routes every change through
//! [`Settings::apply`], which clamps numeric ranges, validates colours and
//! reports which part of the engine has to react.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const SPEED_RANGE: (f64, f64) = (1.0, 30.0);
pub const FONT_SIZE_RANGE: (f64, f64) = (20.0, 120.0);
pub const MARGIN_RANGE: (f64, f64) = (0.0, 20.0);

/// Horizontal text alignment inside the padded container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    /// Next alignment in the left -> center -> right cycle
    pub fn next(self) -> Self {
        match self {
            TextAlign::Left => TextAlign::Center,
            TextAlign::Center => TextAlign::Right,
            TextAlign::Right => TextAlign::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// An sRGB colour parsed from a hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 0xff, g: 0xff, b: 0xff };

    /// Parse a hex colour string
    /// Accepts formats: "#RRGGBB", "RRGGBB", "#RGB", "RGB"
    pub fn parse_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Rgb { r, g, b })
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Rgb { r, g, b })
            }
            _ => None,
        }
    }

    /// Mix `self` toward `other`; `amount = 1.0` keeps `self`
    pub fn blend(self, other: Rgb, amount: f64) -> Rgb {
        let t = if amount.is_finite() { amount.clamp(0.0, 1.0) } else { 1.0 };
        let mix = |a: u8, b: u8| (b as f64 + (a as f64 - b as f64) * t).round() as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

/// Read-only snapshot of everything the presenter can tune
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    /// Horizontal padding as a percentage of container width
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default)]
    pub is_flipped: bool,
    #[serde(default)]
    pub has_outline: bool,
    #[serde(default)]
    pub text_align: TextAlign,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_playing: false,
            speed: default_speed(),
            font_size: default_font_size(),
            text_color: default_text_color(),
            background_color: default_background_color(),
            margin: default_margin(),
            is_flipped: false,
            has_outline: false,
            text_align: TextAlign::default(),
        }
    }
}

fn default_speed() -> f64 {
    10.0
}

fn default_font_size() -> f64 {
    66.0
}

fn default_text_color() -> String {
    "#ffffff".to_string()
}

fn default_background_color() -> String {
    "#000000".to_string()
}

fn default_margin() -> f64 {
    5.0
}

/// Every recognised change to the settings snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum SettingUpdate {
    SetPlaying(bool),
    TogglePlaying,
    SetSpeed(f64),
    AdjustSpeed(f64),
    SetFontSize(f64),
    AdjustFontSize(f64),
    SetTextColor(String),
    SetBackgroundColor(String),
    SetMargin(f64),
    SetFlipped(bool),
    ToggleFlipped,
    SetOutline(bool),
    ToggleOutline,
    SetTextAlign(TextAlign),
    CycleTextAlign,
}

/// Which part of the engine has to react to an applied update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEffect {
    /// Value did not change
    Unchanged,
    /// Start or stop the tick loop
    Playback,
    /// New speed applies from the next tick
    Speed,
    /// Geometry must be re-measured
    Layout,
    /// Only the container directive changes
    Style,
}

impl Settings {
    /// Apply one update, clamping to the documented ranges
    ///
    /// An unparseable colour leaves the snapshot untouched and returns
    /// `Error::InvalidSetting`.
    pub fn apply(&mut self, update: SettingUpdate) -> Result<UpdateEffect> {
        let effect = match update {
            SettingUpdate::SetPlaying(playing) => {
                changed(&mut self.is_playing, playing, UpdateEffect::Playback)
            }
            SettingUpdate::TogglePlaying => {
                self.is_playing = !self.is_playing;
                UpdateEffect::Playback
            }
            SettingUpdate::SetSpeed(speed) => {
                let speed = clamp_range(speed, SPEED_RANGE, self.speed);
                changed(&mut self.speed, speed, UpdateEffect::Speed)
            }
            SettingUpdate::AdjustSpeed(delta) => {
                let speed = clamp_range(self.speed + delta, SPEED_RANGE, self.speed);
                changed(&mut self.speed, speed, UpdateEffect::Speed)
            }
            SettingUpdate::SetFontSize(size) => {
                let size = clamp_range(size, FONT_SIZE_RANGE, self.font_size);
                changed(&mut self.font_size, size, UpdateEffect::Layout)
            }
            SettingUpdate::AdjustFontSize(delta) => {
                let size = clamp_range(self.font_size + delta, FONT_SIZE_RANGE, self.font_size);
                changed(&mut self.font_size, size, UpdateEffect::Layout)
            }
            SettingUpdate::SetTextColor(color) => {
                let color = normalize_color(&color)?;
                changed(&mut self.text_color, color, UpdateEffect::Style)
            }
            SettingUpdate::SetBackgroundColor(color) => {
                let color = normalize_color(&color)?;
                changed(&mut self.background_color, color, UpdateEffect::Style)
            }
            SettingUpdate::SetMargin(margin) => {
                let margin = clamp_range(margin, MARGIN_RANGE, self.margin);
                changed(&mut self.margin, margin, UpdateEffect::Layout)
            }
            SettingUpdate::SetFlipped(flipped) => {
                changed(&mut self.is_flipped, flipped, UpdateEffect::Style)
            }
            SettingUpdate::ToggleFlipped => {
                self.is_flipped = !self.is_flipped;
                UpdateEffect::Style
            }
            SettingUpdate::SetOutline(outline) => {
                changed(&mut self.has_outline, outline, UpdateEffect::Style)
            }
            SettingUpdate::ToggleOutline => {
                self.has_outline = !self.has_outline;
                UpdateEffect::Style
            }
            SettingUpdate::SetTextAlign(align) => {
                changed(&mut self.text_align, align, UpdateEffect::Layout)
            }
            SettingUpdate::CycleTextAlign => {
                self.text_align = self.text_align.next();
                UpdateEffect::Layout
            }
        };
        Ok(effect)
    }

    /// Text colour, falling back to white when the stored string is malformed
    pub fn text_rgb(&self) -> Rgb {
        Rgb::parse_hex(&self.text_color).unwrap_or(Rgb::WHITE)
    }

    /// Background colour, falling back to black when the stored string is malformed
    pub fn background_rgb(&self) -> Rgb {
        Rgb::parse_hex(&self.background_color).unwrap_or(Rgb::BLACK)
    }

    /// Copy with every numeric field forced into range
    ///
    /// Used on snapshots that come from a config file rather than `apply`.
    pub fn sanitized(mut self) -> Self {
        self.speed = clamp_range(self.speed, SPEED_RANGE, default_speed());
        self.font_size = clamp_range(self.font_size, FONT_SIZE_RANGE, default_font_size());
        self.margin = clamp_range(self.margin, MARGIN_RANGE, default_margin());
        self
    }
}

fn changed<T: PartialEq>(slot: &mut T, value: T, effect: UpdateEffect) -> UpdateEffect {
    if *slot == value {
        UpdateEffect::Unchanged
    } else {
        *slot = value;
        effect
    }
}

fn clamp_range(value: f64, (min, max): (f64, f64), fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

fn normalize_color(color: &str) -> Result<String> {
    let rgb = Rgb::parse_hex(color)
        .ok_or_else(|| Error::InvalidSetting(format!("not a hex colour: {:?}", color)))?;
    Ok(format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_is_clamped() {
        let mut settings = Settings::default();
        assert_eq!(settings.apply(SettingUpdate::SetSpeed(45.0)).unwrap(), UpdateEffect::Speed);
        assert_eq!(settings.speed, 30.0);

        settings.apply(SettingUpdate::AdjustSpeed(-100.0)).unwrap();
        assert_eq!(settings.speed, 1.0);

        // Already at the bottom of the range
        assert_eq!(
            settings.apply(SettingUpdate::AdjustSpeed(-1.0)).unwrap(),
            UpdateEffect::Unchanged
        );
    }

    #[test]
    fn test_font_size_steps_and_clamps() {
        let mut settings = Settings::default();
        settings.apply(SettingUpdate::AdjustFontSize(2.0)).unwrap();
        assert_eq!(settings.font_size, 68.0);

        settings.apply(SettingUpdate::SetFontSize(5.0)).unwrap();
        assert_eq!(settings.font_size, 20.0);

        let effect = settings.apply(SettingUpdate::SetFontSize(f64::NAN)).unwrap();
        assert_eq!(effect, UpdateEffect::Unchanged);
        assert_eq!(settings.font_size, 20.0);
    }

    #[test]
    fn test_effects_route_by_kind() {
        let mut settings = Settings::default();
        assert_eq!(settings.apply(SettingUpdate::TogglePlaying).unwrap(), UpdateEffect::Playback);
        assert!(settings.is_playing);
        assert_eq!(settings.apply(SettingUpdate::SetMargin(12.0)).unwrap(), UpdateEffect::Layout);
        assert_eq!(settings.apply(SettingUpdate::ToggleOutline).unwrap(), UpdateEffect::Style);
        assert_eq!(settings.apply(SettingUpdate::CycleTextAlign).unwrap(), UpdateEffect::Layout);
        assert_eq!(settings.text_align, TextAlign::Right);
    }

    #[test]
    fn test_alignment_cycles() {
        assert_eq!(TextAlign::Left.next(), TextAlign::Center);
        assert_eq!(TextAlign::Center.next(), TextAlign::Right);
        assert_eq!(TextAlign::Right.next(), TextAlign::Left);
    }

    #[test]
    fn test_invalid_colour_is_rejected_and_kept() {
        let mut settings = Settings::default();
        let result = settings.apply(SettingUpdate::SetTextColor("chartreuse".to_string()));
        assert!(matches!(result, Err(Error::InvalidSetting(_))));
        assert_eq!(settings.text_color, "#ffffff");

        let result = settings.apply(SettingUpdate::SetTextColor("#+f+f+f".to_string()));
        assert!(matches!(result, Err(Error::InvalidSetting(_))));
        assert_eq!(settings.text_color, "#ffffff");

        settings
            .apply(SettingUpdate::SetBackgroundColor("#0F0".to_string()))
            .unwrap();
        assert_eq!(settings.background_color, "#00ff00");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse_hex("#ff8000"), Some(Rgb { r: 255, g: 128, b: 0 }));
        assert_eq!(Rgb::parse_hex("fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse_hex("#12345"), None);
        assert_eq!(Rgb::parse_hex("#gg0000"), None);
        assert_eq!(Rgb::parse_hex("#+f+f+f"), None);
        assert_eq!(Rgb::parse_hex("#+ff"), None);
        assert_eq!(Rgb::parse_hex("##fff"), None);
    }

    #[test]
    fn test_blend() {
        assert_eq!(Rgb::WHITE.blend(Rgb::BLACK, 1.0), Rgb::WHITE);
        assert_eq!(Rgb::WHITE.blend(Rgb::BLACK, 0.0), Rgb::BLACK);
        assert_eq!(Rgb::WHITE.blend(Rgb::BLACK, 0.5), Rgb { r: 128, g: 128, b: 128 });
    }

    #[test]
    fn test_sanitized_config_snapshot() {
        let settings = Settings {
            speed: 99.0,
            margin: -3.0,
            font_size: f64::INFINITY,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.speed, 30.0);
        assert_eq!(settings.margin, 0.0);
        assert_eq!(settings.font_size, 66.0);
    }
}
