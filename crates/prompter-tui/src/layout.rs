//! Monospace text layout for terminal cells
//!
//! Lays tokens out the way a `pre-wrap` block would: whitespace is kept,
//! newlines inside whitespace runs break lines, words wrap at the right
//! padding edge and trailing whitespace hangs past it. Every display column
//! is one cell wide; `font_size` only sets the line pitch.

use std::ops::Range;

use prompter_core::config::UiConfig;
use prompter_core::layout::{LayoutRequest, TextLayout, TokenBox};
use prompter_core::script::Word;
use prompter_core::settings::TextAlign;
use prompter_core::Error;
use unicode_width::UnicodeWidthStr;

/// Display columns a tab advances by
const TAB_WIDTH: usize = 4;

/// Pixel-addressed layout over a grid of terminal cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceLayout {
    cell_width: f64,
    cell_height: f64,
}

/// Token position in cells, before alignment
#[derive(Debug, Clone, Copy)]
struct Placement {
    row: usize,
    col: usize,
    width: usize,
}

/// Tokens that share a row plus the columns their visible text uses
struct LineSpan {
    tokens: Range<usize>,
    used: usize,
}

impl MonospaceLayout {
    pub fn new(cell_width: f64, cell_height: f64) -> Self {
        Self {
            cell_width: positive_or(cell_width, 1.0),
            cell_height: positive_or(cell_height, 1.0),
        }
    }

    pub fn from_config(config: &UiConfig) -> Self {
        Self::new(config.cell_width_px, config.cell_height_px)
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Distance between consecutive line tops
    pub fn line_pitch(&self, font_size: f64) -> f64 {
        (font_size * 1.5).max(self.cell_height)
    }

    /// Columns available between the paddings
    pub fn columns(&self, request: &LayoutRequest) -> usize {
        let padding = request.container_width * margin_fraction(request.margin_percent);
        let usable = request.container_width - 2.0 * padding;
        ((usable / self.cell_width).floor() as usize).max(1)
    }
}

impl Default for MonospaceLayout {
    fn default() -> Self {
        Self::from_config(&UiConfig::default())
    }
}

impl TextLayout for MonospaceLayout {
    fn measure(&self, words: &[Word], request: &LayoutRequest) -> prompter_core::Result<Vec<TokenBox>> {
        if !is_positive(request.container_width) || !is_positive(request.font_size) {
            return Err(Error::Measurement(format!(
                "cannot lay out text in a {}px wide container at {}px",
                request.container_width, request.font_size
            )));
        }

        let columns = self.columns(request);
        let (placements, lines) = place(words, columns);

        let pitch = self.line_pitch(request.font_size);
        let padding = request.container_width * margin_fraction(request.margin_percent);
        let mut boxes: Vec<TokenBox> = placements
            .iter()
            .map(|p| TokenBox {
                top: p.row as f64 * pitch,
                left: padding + p.col as f64 * self.cell_width,
                width: p.width as f64 * self.cell_width,
                height: request.font_size,
            })
            .collect();

        for line in lines {
            let slack = columns.saturating_sub(line.used);
            let shift = match request.align {
                TextAlign::Left => 0,
                TextAlign::Center => slack / 2,
                TextAlign::Right => slack,
            };
            if shift == 0 {
                continue;
            }
            for b in &mut boxes[line.tokens] {
                b.left += shift as f64 * self.cell_width;
            }
        }

        Ok(boxes)
    }
}

/// Flow tokens into rows of `columns` cells
fn place(words: &[Word], columns: usize) -> (Vec<Placement>, Vec<LineSpan>) {
    let mut placements = Vec::with_capacity(words.len());
    let mut lines = Vec::new();
    let mut row = 0;
    let mut col = 0;
    let mut line_start = 0;
    let mut used = 0;

    for word in words {
        if word.is_whitespace {
            let mut segments = word.text.split('\n');
            let first = segments.next().map(whitespace_columns).unwrap_or(0);
            placements.push(Placement {
                row,
                col,
                width: first.min(columns.saturating_sub(col)),
            });
            col += first;

            let breaks = word.line_breaks();
            if breaks > 0 {
                lines.push(LineSpan {
                    tokens: line_start..placements.len(),
                    used,
                });
                row += breaks;
                col = segments.last().map(whitespace_columns).unwrap_or(0);
                line_start = placements.len();
                used = 0;
            }
        } else {
            let width = word.text.width().max(1);
            if col > 0 && col + width > columns {
                lines.push(LineSpan {
                    tokens: line_start..placements.len(),
                    used,
                });
                row += 1;
                col = 0;
                line_start = placements.len();
            }
            placements.push(Placement {
                row,
                col,
                width: width.min(columns),
            });
            col += width;
            used = col.min(columns);
        }
    }

    lines.push(LineSpan {
        tokens: line_start..placements.len(),
        used,
    });
    (placements, lines)
}

fn whitespace_columns(segment: &str) -> usize {
    segment
        .chars()
        .map(|c| match c {
            '\t' => TAB_WIDTH,
            '\r' => 0,
            _ => 1,
        })
        .sum()
}

fn margin_fraction(margin_percent: f64) -> f64 {
    if margin_percent.is_finite() {
        margin_percent.clamp(0.0, 49.0) / 100.0
    } else {
        0.0
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if is_positive(value) {
        value
    } else {
        fallback
    }
}
