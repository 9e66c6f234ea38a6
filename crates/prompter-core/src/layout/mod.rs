//! Word geometry and the text-layout capability
//!
//! The engine does not know how text is rasterized. A host plugs in any
//! [`TextLayout`] able to report a bounding box per token; the
//! [`LayoutMeasurer`] turns those boxes into [`WordGeometry`] with line
//! grouping, debounced and coalesced so only the latest request lands.

pub mod measurer;

pub use measurer::{LayoutMeasurer, MeasureTicket};

use crate::script::Word;
use crate::settings::TextAlign;

/// Inputs a layout pass depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRequest {
    pub font_size: f64,
    pub container_width: f64,
    pub container_height: f64,
    /// Horizontal padding on each side, percent of container width
    pub margin_percent: f64,
    pub align: TextAlign,
}

/// Rendered bounding box of one token, relative to the script body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Measured position of one token plus its line grouping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordGeometry {
    pub index: usize,
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    pub line_index: usize,
}

impl WordGeometry {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Anything that can report where each token of a script ends up on screen
pub trait TextLayout {
    /// Return exactly one box per token, in token order
    fn measure(&self, words: &[Word], request: &LayoutRequest) -> crate::Result<Vec<TokenBox>>;
}

/// Height of the script body described by a geometry set
pub fn content_height(geometry: &[WordGeometry]) -> f64 {
    geometry
        .iter()
        .map(WordGeometry::bottom)
        .filter(|b| b.is_finite())
        .fold(0.0, f64::max)
}
