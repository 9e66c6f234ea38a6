use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::settings::Settings;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    /// Initial settings snapshot
    #[serde(default)]
    pub display: Settings,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Script loaded when no path is given on the command line
    #[serde(default)]
    pub script_path: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            script_path: None,
        }
    }
}

/// How the scroll offset advances between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Fixed increment per rendered frame; perceived speed follows the refresh rate
    #[default]
    Frame,
    /// Increment scaled by elapsed wall-clock time, normalized to `reference_fps`
    WallClock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    #[serde(default)]
    pub pacing: Pacing,
    /// Per-frame step is `speed / speed_divisor`
    #[serde(default = "default_speed_divisor")]
    pub speed_divisor: f64,
    /// Frame rate the wall-clock pacing is normalized to
    #[serde(default = "default_reference_fps")]
    pub reference_fps: u32,
    /// How long the restart indicator stays up
    #[serde(default = "default_restart_pulse_ms")]
    pub restart_pulse_ms: u64,
    /// Restart offset is `-(container_height * preroll_ratio)`
    #[serde(default = "default_half")]
    pub preroll_ratio: f64,
    /// Extra travel past the end before restarting, as a fraction of container height
    #[serde(default = "default_half")]
    pub tail_ratio: f64,
    /// Blank space rendered before and after the script, as a fraction of container height
    #[serde(default = "default_spacer_ratio")]
    pub spacer_ratio: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            pacing: Pacing::default(),
            speed_divisor: default_speed_divisor(),
            reference_fps: default_reference_fps(),
            restart_pulse_ms: default_restart_pulse_ms(),
            preroll_ratio: default_half(),
            tail_ratio: default_half(),
            spacer_ratio: default_spacer_ratio(),
        }
    }
}

/// Tuned perceptual constants for the reading-line reveal
///
/// Zone multipliers are expressed in line heights (`font_size * line_height_factor`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Reading line position as a fraction of container height
    #[serde(default = "default_half")]
    pub reading_line_ratio: f64,
    /// Pre-roll spacer compensation as a fraction of container height
    #[serde(default = "default_spacer_ratio")]
    pub spacer_ratio: f64,
    #[serde(default = "default_line_height_factor")]
    pub line_height_factor: f64,
    #[serde(default = "default_active_zone")]
    pub active_zone: f64,
    #[serde(default = "default_primary_zone")]
    pub primary_zone: f64,
    #[serde(default = "default_secondary_zone")]
    pub secondary_zone: f64,
    #[serde(default = "default_fade_zone")]
    pub fade_zone: f64,
    #[serde(default = "default_active_opacity")]
    pub active_opacity: f64,
    #[serde(default = "default_primary_opacity")]
    pub primary_opacity: f64,
    #[serde(default = "default_secondary_opacity")]
    pub secondary_opacity: f64,
    #[serde(default = "default_floor_opacity")]
    pub floor_opacity: f64,
    /// Scale/glow band is `font_size * emphasis_zone_factor` around the reading line
    #[serde(default = "default_emphasis_zone_factor")]
    pub emphasis_zone_factor: f64,
    #[serde(default = "default_emphasis_scale")]
    pub emphasis_scale: f64,
    /// Opacity used before geometry is known or when inputs are not finite
    #[serde(default = "default_neutral_opacity")]
    pub neutral_opacity: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            reading_line_ratio: default_half(),
            spacer_ratio: default_spacer_ratio(),
            line_height_factor: default_line_height_factor(),
            active_zone: default_active_zone(),
            primary_zone: default_primary_zone(),
            secondary_zone: default_secondary_zone(),
            fade_zone: default_fade_zone(),
            active_opacity: default_active_opacity(),
            primary_opacity: default_primary_opacity(),
            secondary_opacity: default_secondary_opacity(),
            floor_opacity: default_floor_opacity(),
            emphasis_zone_factor: default_emphasis_zone_factor(),
            emphasis_scale: default_emphasis_scale(),
            neutral_opacity: default_neutral_opacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Maximum vertical travel (px) for a press to count as stationary
    #[serde(default = "default_still_threshold")]
    pub still_threshold: f64,
    /// A stationary press held longer than this resets the script
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
    /// A stationary press shorter than this is a tap
    #[serde(default = "default_tap_ms")]
    pub tap_ms: u64,
    /// Minimum vertical travel (px) for a swipe
    #[serde(default = "default_swipe_distance")]
    pub swipe_distance: f64,
    /// A swipe must finish within this window
    #[serde(default = "default_swipe_ms")]
    pub swipe_ms: u64,
    /// Offset adjustment applied per swipe
    #[serde(default = "default_swipe_step")]
    pub swipe_step: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            still_threshold: default_still_threshold(),
            long_press_ms: default_long_press_ms(),
            tap_ms: default_tap_ms(),
            swipe_distance: default_swipe_distance(),
            swipe_ms: default_swipe_ms(),
            swipe_step: default_swipe_step(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Delay between a layout-affecting change and the geometry query
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// A token starts a new line when its top moves more than `font_size * line_break_ratio`
    #[serde(default = "default_half")]
    pub line_break_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            line_break_ratio: default_half(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds while idle
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frame rate while scrolling
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Width of one terminal cell in layout pixels
    #[serde(default = "default_cell_width")]
    pub cell_width_px: f64,
    /// Height of one terminal cell in layout pixels
    #[serde(default = "default_cell_height")]
    pub cell_height_px: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            cell_width_px: default_cell_width(),
            cell_height_px: default_cell_height(),
        }
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "f", "<C-c>" (Ctrl+c), "<Space>", "<Up>", "<Left>", "<Esc>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    #[serde(default = "default_key_quit")]
    pub quit: String,
    #[serde(default = "default_key_toggle_play")]
    pub toggle_play: String,
    #[serde(default = "default_key_speed_up")]
    pub speed_up: String,
    #[serde(default = "default_key_speed_down")]
    pub speed_down: String,
    #[serde(default = "default_key_font_larger")]
    pub font_larger: String,
    #[serde(default = "default_key_font_smaller")]
    pub font_smaller: String,
    #[serde(default = "default_key_toggle_flip")]
    pub toggle_flip: String,
    #[serde(default = "default_key_toggle_outline")]
    pub toggle_outline: String,
    #[serde(default = "default_key_cycle_align")]
    pub cycle_align: String,
    #[serde(default = "default_key_reset")]
    pub reset: String,
    #[serde(default = "default_key_help")]
    pub help: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            toggle_play: default_key_toggle_play(),
            speed_up: default_key_speed_up(),
            speed_down: default_key_speed_down(),
            font_larger: default_key_font_larger(),
            font_smaller: default_key_font_smaller(),
            toggle_flip: default_key_toggle_flip(),
            toggle_outline: default_key_toggle_outline(),
            cycle_align: default_key_cycle_align(),
            reset: default_key_reset(),
            help: default_key_help(),
        }
    }
}

fn default_key_quit() -> String { "q".to_string() }
fn default_key_toggle_play() -> String { "<Space>".to_string() }
fn default_key_speed_up() -> String { "<Up>".to_string() }
fn default_key_speed_down() -> String { "<Down>".to_string() }
fn default_key_font_larger() -> String { "<Right>".to_string() }
fn default_key_font_smaller() -> String { "<Left>".to_string() }
fn default_key_toggle_flip() -> String { "f".to_string() }
fn default_key_toggle_outline() -> String { "o".to_string() }
fn default_key_cycle_align() -> String { "a".to_string() }
fn default_key_reset() -> String { "r".to_string() }
fn default_key_help() -> String { "?".to_string() }

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prompter")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_half() -> f64 {
    0.5
}

fn default_speed_divisor() -> f64 {
    10.0
}

fn default_reference_fps() -> u32 {
    60
}

fn default_restart_pulse_ms() -> u64 {
    500
}

fn default_spacer_ratio() -> f64 {
    0.6
}

fn default_line_height_factor() -> f64 {
    1.5
}

fn default_active_zone() -> f64 {
    0.7
}

fn default_primary_zone() -> f64 {
    2.0
}

fn default_secondary_zone() -> f64 {
    4.0
}

fn default_fade_zone() -> f64 {
    6.0
}

fn default_active_opacity() -> f64 {
    1.0
}

fn default_primary_opacity() -> f64 {
    0.85
}

fn default_secondary_opacity() -> f64 {
    0.6
}

fn default_floor_opacity() -> f64 {
    0.15
}

fn default_emphasis_zone_factor() -> f64 {
    1.05 // slightly wider than one font size
}

fn default_emphasis_scale() -> f64 {
    1.02
}

fn default_neutral_opacity() -> f64 {
    0.3
}

fn default_still_threshold() -> f64 {
    10.0
}

fn default_long_press_ms() -> u64 {
    1000
}

fn default_tap_ms() -> u64 {
    300
}

fn default_swipe_distance() -> f64 {
    50.0
}

fn default_swipe_ms() -> u64 {
    500
}

fn default_swipe_step() -> f64 {
    100.0
}

fn default_settle_delay_ms() -> u64 {
    150
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_cell_width() -> f64 {
    10.0
}

fn default_cell_height() -> f64 {
    20.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default location or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/prompter/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("prompter")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the log file used while the terminal UI owns the screen
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("prompter.log")
    }

    /// Script path from config, with tilde expansion
    pub fn script_path(&self) -> Option<PathBuf> {
        self.general.script_path.as_deref().map(expand_tilde)
    }
}
