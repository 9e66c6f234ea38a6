//! Settle-delayed, coalescing measurement
//!
//! A layout-affecting change arms a timer; once it fires the latest request is
//! measured and older tickets are dropped. Failures keep the last good geometry.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{content_height, LayoutRequest, TextLayout, TokenBox, WordGeometry};
use crate::config::LayoutConfig;
use crate::scroll::timing::FireOnceTimer;
use crate::script::Word;

/// Queued layout pass waiting for the settle delay
#[derive(Debug, Clone, Copy)]
struct PendingMeasure {
    generation: u64,
    request: LayoutRequest,
}

/// Handle for one measurement pass
///
/// Hosts that measure asynchronously take a ticket with
/// [`LayoutMeasurer::begin`] and hand the result back through
/// [`LayoutMeasurer::finish`]. A ticket that has been superseded by a newer
/// request is discarded on finish.
#[derive(Debug, Clone, Copy)]
pub struct MeasureTicket {
    generation: u64,
    request: LayoutRequest,
}

impl MeasureTicket {
    pub fn request(&self) -> &LayoutRequest {
        &self.request
    }
}

/// Debounced, coalescing producer of [`WordGeometry`]
#[derive(Debug, Clone)]
pub struct LayoutMeasurer {
    config: LayoutConfig,
    settle: FireOnceTimer,
    pending: Option<PendingMeasure>,
    /// Generation of the most recent request
    generation: u64,
    last_request: Option<LayoutRequest>,
    geometry: Vec<WordGeometry>,
    initialized: bool,
}

impl LayoutMeasurer {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            settle: FireOnceTimer::default(),
            pending: None,
            generation: 0,
            last_request: None,
            geometry: Vec::new(),
            initialized: false,
        }
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.config.settle_delay_ms)
    }

    /// Schedule a measurement after the settle delay
    ///
    /// Any pending request is replaced and its timer restarted. Returns the
    /// generation of the new request.
    pub fn request(&mut self, request: LayoutRequest, now: Instant) -> u64 {
        self.generation += 1;
        if let Some(prev) = self.pending.replace(PendingMeasure {
            generation: self.generation,
            request,
        }) {
            debug!(
                superseded = prev.generation,
                generation = self.generation,
                "Coalescing layout measurement"
            );
        }
        self.last_request = Some(request);
        self.settle.arm(now, self.settle_delay());
        self.generation
    }

    /// Schedule a measurement only if the inputs differ from the last request
    pub fn request_if_changed(&mut self, request: LayoutRequest, now: Instant) -> bool {
        if self.last_request == Some(request) {
            return false;
        }
        self.request(request, now);
        true
    }

    /// Run the pending measurement once its settle delay has elapsed
    ///
    /// Returns true when the stored geometry changed.
    pub fn poll<L: TextLayout + ?Sized>(
        &mut self,
        layout: &L,
        words: &[Word],
        now: Instant,
    ) -> bool {
        if !self.settle.fire(now) {
            return false;
        }
        match self.begin() {
            Some(ticket) => {
                let result = layout.measure(words, ticket.request());
                self.finish(ticket, words.len(), result)
            }
            None => false,
        }
    }

    /// Measure immediately, bypassing the settle delay
    pub fn measure_now<L: TextLayout + ?Sized>(
        &mut self,
        layout: &L,
        words: &[Word],
        request: LayoutRequest,
        now: Instant,
    ) -> bool {
        self.request(request, now);
        match self.begin() {
            Some(ticket) => {
                let result = layout.measure(words, ticket.request());
                self.finish(ticket, words.len(), result)
            }
            None => false,
        }
    }

    /// Take the pending request, cancelling its timer
    pub fn begin(&mut self) -> Option<MeasureTicket> {
        self.settle.cancel();
        self.pending.take().map(|p| MeasureTicket {
            generation: p.generation,
            request: p.request,
        })
    }

    /// Apply the outcome of a measurement pass
    ///
    /// Failures never propagate: an error, an empty result or a box count
    /// that does not match the token count keeps the previous geometry (or
    /// leaves the measurer uninitialized). Returns true when the stored
    /// geometry changed.
    pub fn finish(
        &mut self,
        ticket: MeasureTicket,
        expected_len: usize,
        result: crate::Result<Vec<TokenBox>>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                latest = self.generation,
                "Discarding superseded layout measurement"
            );
            return false;
        }

        if expected_len == 0 {
            let had_geometry = self.initialized || !self.geometry.is_empty();
            self.geometry.clear();
            self.initialized = false;
            return had_geometry;
        }

        match result {
            Ok(boxes) if boxes.len() == expected_len => {
                let threshold = ticket.request.font_size * self.config.line_break_ratio;
                self.geometry = group_lines(&boxes, threshold);
                self.initialized = true;
                true
            }
            Ok(boxes) => {
                warn!(
                    expected = expected_len,
                    measured = boxes.len(),
                    "Layout measurement returned wrong token count, keeping previous geometry"
                );
                self.last_request = None;
                false
            }
            Err(e) => {
                warn!(error = %e, "Layout measurement failed, keeping previous geometry");
                self.last_request = None;
                false
            }
        }
    }

    /// Current geometry, or `None` before the first successful measurement
    pub fn geometry(&self) -> Option<&[WordGeometry]> {
        self.initialized.then_some(self.geometry.as_slice())
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending measurement becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.settle.deadline()
    }

    /// Height of the measured script body (0 when uninitialized)
    pub fn content_height(&self) -> f64 {
        self.geometry().map(content_height).unwrap_or(0.0)
    }
}

/// Attach line indices: a token whose top differs from the current line's
/// top by more than `threshold` opens a new line
fn group_lines(boxes: &[TokenBox], threshold: f64) -> Vec<WordGeometry> {
    let mut line_top: Option<f64> = None;
    let mut line_index = 0usize;

    boxes
        .iter()
        .enumerate()
        .map(|(index, b)| {
            match line_top {
                None => line_top = Some(b.top),
                Some(top) if (b.top - top).abs() > threshold => {
                    line_index += 1;
                    line_top = Some(b.top);
                }
                Some(_) => {}
            }
            WordGeometry {
                index,
                top: b.top,
                left: b.left,
                width: b.width,
                height: b.height,
                line_index,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Script;
    use crate::settings::TextAlign;
    use crate::Error;

    /// Lays tokens out on a fixed grid, `per_line` tokens per line
    struct GridLayout {
        per_line: usize,
    }

    impl TextLayout for GridLayout {
        fn measure(&self, words: &[Word], request: &LayoutRequest) -> crate::Result<Vec<TokenBox>> {
            let pitch = request.font_size * 1.5;
            Ok(words
                .iter()
                .map(|w| TokenBox {
                    top: (w.index / self.per_line) as f64 * pitch,
                    left: (w.index % self.per_line) as f64 * 40.0,
                    width: 40.0,
                    height: request.font_size,
                })
                .collect())
        }
    }

    struct FailingLayout;

    impl TextLayout for FailingLayout {
        fn measure(&self, _: &[Word], _: &LayoutRequest) -> crate::Result<Vec<TokenBox>> {
            Err(Error::Measurement("surface not attached".to_string()))
        }
    }

    struct EmptyLayout;

    impl TextLayout for EmptyLayout {
        fn measure(&self, _: &[Word], _: &LayoutRequest) -> crate::Result<Vec<TokenBox>> {
            Ok(Vec::new())
        }
    }

    fn request(font_size: f64) -> LayoutRequest {
        LayoutRequest {
            font_size,
            container_width: 800.0,
            container_height: 600.0,
            margin_percent: 5.0,
            align: TextAlign::Center,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_waits_for_settle_delay() {
        let script = Script::new("one two three four");
        let mut measurer = LayoutMeasurer::new(LayoutConfig::default());
        let t0 = Instant::now();

        measurer.request(request(40.0), t0);
        assert!(!measurer.poll(&GridLayout { per_line: 3 }, script.words(), t0 + ms(100)));
        assert!(!measurer.is_initialized());

        assert!(measurer.poll(&GridLayout { per_line: 3 }, script.words(), t0 + ms(150)));
        let geometry = measurer.geometry().unwrap();
        assert_eq!(geometry.len(), script.len());
        for (i, g) in geometry.iter().enumerate() {
            assert_eq!(g.index, i);
        }
    }

    #[test]
    fn test_line_indices_follow_tops() {
        let script = Script::new("a b c d e f g");
        let mut measurer = LayoutMeasurer::new(LayoutConfig::default());
        measurer.measure_now(&GridLayout { per_line: 4 }, script.words(), request(40.0), Instant::now());

        let geometry = measurer.geometry().unwrap();
        let lines: Vec<usize> = geometry.iter().map(|g| g.line_index).collect();
        assert_eq!(lines, vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3]);
        for pair in geometry.windows(2) {
            assert!(pair[1].top >= pair[0].top);
            assert!(pair[1].line_index >= pair[0].line_index);
        }
    }

    #[test]
    fn test_small_top_jitter_stays_on_line() {
        let boxes = [
            TokenBox { top: 0.0, left: 0.0, width: 10.0, height: 40.0 },
            TokenBox { top: 3.0, left: 10.0, width: 10.0, height: 40.0 },
            TokenBox { top: 61.0, left: 0.0, width: 10.0, height: 40.0 },
        ];
        let geometry = group_lines(&boxes, 20.0);
        assert_eq!(geometry[1].line_index, 0);
        assert_eq!(geometry[2].line_index, 1);
    }

    #[test]
    fn test_overlapping_requests_keep_latest() {
        let script = Script::new("alpha beta gamma delta");
        let layout = GridLayout { per_line: 2 };
        let mut measurer = LayoutMeasurer::new(LayoutConfig::default());
        let t0 = Instant::now();

        measurer.request(request(30.0), t0);
        measurer.request(request(60.0), t0 + ms(50));

        // First request's deadline has passed, but its timer was superseded
        assert!(!measurer.poll(&layout, script.words(), t0 + ms(160)));
        assert!(measurer.poll(&layout, script.words(), t0 + ms(200)));
        assert!(!measurer.is_pending());

        let mut expected = LayoutMeasurer::new(LayoutConfig::default());
        expected.measure_now(&layout, script.words(), request(60.0), t0);
        assert_eq!(measurer.geometry(), expected.geometry());
    }

    #[test]
    fn test_superseded_ticket_is_discarded() {
        let script = Script::new("alpha beta gamma");
        let layout = GridLayout { per_line: 1 };
        let mut measurer = LayoutMeasurer::new(LayoutConfig::default());
        let t0 = Instant::now();

        measurer.request(request(30.0), t0);
        let stale = measurer.begin().unwrap();
        measurer.request(request(90.0), t0 + ms(10));
        let fresh = measurer.begin().unwrap();

        let fresh_result = layout.measure(script.words(), fresh.request());
        assert!(measurer.finish(fresh, script.len(), fresh_result));
        let stale_result = layout.measure(script.words(), stale.request());
        assert!(!measurer.finish(stale, script.len(), stale_result));

        // Geometry reflects the 90px request: pitch 135
        assert_eq!(measurer.geometry().unwrap()[1].top, 135.0);
    }

    #[test]
    fn test_remeasure_is_idempotent() {
        let script = Script::new("the quick brown fox jumps over the lazy dog");
        let layout = GridLayout { per_line: 5 };
        let mut measurer = LayoutMeasurer::new(LayoutConfig::default());
        let t0 = Instant::now();

        measurer.measure_now(&layout, script.words(), request(50.0), t0);
        let first = measurer.geometry().unwrap().to_vec();
        measurer.measure_now(&layout, script.words(), request(50.0), t0 + ms(500));
        let second = measurer.geometry().unwrap().to_vec();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.top.to_bits(), b.top.to_bits());
            assert_eq!(a.left.to_bits(), b.left.to_bits());
            assert_eq!(a.width.to_bits(), b.width.to_bits());
            assert_eq!(a.height.to_bits(), b.height.to_bits());
            assert_eq!(a.line_index, b.line_index);
        }
    }

    #[test]
    fn test_request_if_changed() {
        let mut measurer = LayoutMeasurer::new(LayoutConfig::default());
        let t0 = Instant::now();
        assert!(measurer.request_if_changed(request(40.0), t0));
        assert!(!measurer.request_if_changed(request(40.0), t0 + ms(5)));

        let mut taller = request(40.0);
        taller.container_height = 900.0;
        assert!(measurer.request_if_changed(taller, t0 + ms(10)));
    }

    #[test]
    fn test_failure_before_first_measure_stays_uninitialized() {
        let script = Script::new("hello world");
        let mut measurer = LayoutMeasurer::new(LayoutConfig::default());
        assert!(!measurer.measure_now(&FailingLayout, script.words(), request(40.0), Instant::now()));
        assert!(measurer.geometry().is_none());
        assert_eq!(measurer.content_height(), 0.0);
    }

    #[test]
    fn test_failure_keeps_prior_geometry() {
        let script = Script::new("hello world");
        let mut measurer = LayoutMeasurer::new(LayoutConfig::default());
        let t0 = Instant::now();
        measurer.measure_now(&GridLayout { per_line: 1 }, script.words(), request(40.0), t0);
        let before = measurer.geometry().unwrap().to_vec();

        assert!(!measurer.measure_now(&FailingLayout, script.words(), request(80.0), t0));
        assert_eq!(measurer.geometry().unwrap(), before.as_slice());

        assert!(!measurer.measure_now(&EmptyLayout, script.words(), request(80.0), t0));
        assert_eq!(measurer.geometry().unwrap(), before.as_slice());
    }

    #[test]
    fn test_empty_script_clears_geometry() {
        let mut measurer = LayoutMeasurer::new(LayoutConfig::default());
        let t0 = Instant::now();
        let script = Script::new("hello");
        measurer.measure_now(&GridLayout { per_line: 1 }, script.words(), request(40.0), t0);
        assert!(measurer.is_initialized());

        let empty = Script::new("");
        assert!(measurer.measure_now(&GridLayout { per_line: 1 }, empty.words(), request(40.0), t0));
        assert!(measurer.geometry().is_none());
    }

    #[test]
    fn test_content_height() {
        let script = Script::new("a b c");
        let mut measurer = LayoutMeasurer::new(LayoutConfig::default());
        measurer.measure_now(&GridLayout { per_line: 1 }, script.words(), request(40.0), Instant::now());
        // 5 tokens, pitch 60, last top 240, height 40
        assert_eq!(measurer.content_height(), 280.0);
    }
}
