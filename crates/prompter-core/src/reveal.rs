//! Reading-line reveal
//!
//! Maps a word's measured position and the current scroll offset to its
//! visual emphasis. Words near the reading line are fully opaque and slightly
//! enlarged with a glow; prominence falls off in bands of line heights.
//! Everything here is a pure function of its inputs.

use crate::config::RevealConfig;
use crate::layout::WordGeometry;

/// Hard output clamps, independent of configuration
pub const OPACITY_RANGE: (f64, f64) = (0.1, 1.0);
pub const SCALE_RANGE: (f64, f64) = (0.9, 1.1);

/// Visual emphasis of one word for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealAttributes {
    pub opacity: f64,
    pub scale: f64,
    pub glow: bool,
}

impl RevealAttributes {
    /// Shown before geometry exists or when an input is not finite
    pub const NEUTRAL: RevealAttributes = RevealAttributes {
        opacity: 0.3,
        scale: 1.0,
        glow: false,
    };
}

impl Default for RevealAttributes {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Viewport values the reveal depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealMetrics {
    pub container_height: f64,
    pub font_size: f64,
}

/// Stateless reveal calculator over a fixed set of tuned constants
#[derive(Debug, Clone, Default)]
pub struct RevealComputer {
    config: RevealConfig,
}

impl RevealComputer {
    pub fn new(config: RevealConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Y of the reading line inside the container
    #[inline]
    pub fn reading_line(&self, container_height: f64) -> f64 {
        container_height * self.config.reading_line_ratio
    }

    /// Where a word with the given top currently sits on screen
    #[inline]
    pub fn screen_y(&self, top: f64, offset: f64, container_height: f64) -> f64 {
        top - offset + container_height * self.config.spacer_ratio
    }

    fn neutral(&self) -> RevealAttributes {
        let opacity = self.config.neutral_opacity;
        if opacity.is_finite() {
            RevealAttributes {
                opacity: opacity.clamp(OPACITY_RANGE.0, OPACITY_RANGE.1),
                ..RevealAttributes::NEUTRAL
            }
        } else {
            RevealAttributes::NEUTRAL
        }
    }

    /// Emphasis for one word
    pub fn compute(
        &self,
        word: &WordGeometry,
        offset: f64,
        metrics: RevealMetrics,
    ) -> RevealAttributes {
        let RevealMetrics {
            container_height,
            font_size,
        } = metrics;
        if !is_positive(container_height) || !is_positive(font_size) {
            return self.neutral();
        }

        let center = self.reading_line(container_height);
        let distance = (self.screen_y(word.top, offset, container_height) - center).abs();
        if !distance.is_finite() {
            return self.neutral();
        }

        let line_height = font_size * self.config.line_height_factor;
        let opacity = self.opacity_at(distance / line_height);

        let emphasized = distance < font_size * self.config.emphasis_zone_factor;
        let scale = if emphasized {
            self.config.emphasis_scale
        } else {
            1.0
        };

        if !opacity.is_finite() || !scale.is_finite() {
            return self.neutral();
        }

        RevealAttributes {
            opacity: opacity.clamp(OPACITY_RANGE.0, OPACITY_RANGE.1),
            scale: scale.clamp(SCALE_RANGE.0, SCALE_RANGE.1),
            glow: emphasized,
        }
    }

    /// Emphasis for every token of the script
    ///
    /// Without geometry (or with geometry that does not line up with the
    /// token count) every word takes the neutral value.
    pub fn compute_all(
        &self,
        geometry: Option<&[WordGeometry]>,
        word_count: usize,
        offset: f64,
        metrics: RevealMetrics,
    ) -> Vec<RevealAttributes> {
        match geometry {
            Some(geometry) if geometry.len() == word_count => geometry
                .iter()
                .map(|word| self.compute(word, offset, metrics))
                .collect(),
            _ => vec![self.neutral(); word_count],
        }
    }

    /// Opacity for a distance expressed in line heights
    fn opacity_at(&self, lines: f64) -> f64 {
        let c = &self.config;
        if lines < c.active_zone {
            c.active_opacity
        } else if lines < c.primary_zone {
            c.primary_opacity
        } else if lines < c.secondary_zone {
            c.secondary_opacity
        } else if lines < c.fade_zone {
            let t = (lines - c.secondary_zone) / (c.fade_zone - c.secondary_zone);
            c.secondary_opacity + (c.floor_opacity - c.secondary_opacity) * t
        } else {
            c.floor_opacity
        }
    }
}

#[inline]
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
