//! Colored span layers.
//!
//! A layer holds, per line, a sorted list of non-overlapping byte-range
//! spans. Later additions win: inserting a span truncates or splits
//! whatever it overlaps. Every mutation is recorded in a change journal
//! that the viewer drains at render time to invalidate exactly the
//! affected per-line caches.

use std::collections::{BTreeMap, BTreeSet};

use ratatui::style::Color;

/// A line-local colored byte range. `color: None` means the range takes
/// the layer's default color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSpan {
    pub start: usize,
    pub end: usize,
    pub color: Option<Color>,
}

impl ColorSpan {
    pub fn new(start: usize, end: usize, color: Option<Color>) -> Self {
        Self { start, end, color }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// What changed in a layer since the journal was last drained.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LayerChanges {
    #[default]
    None,
    Lines(BTreeSet<usize>),
    All,
}

/// Insert `new` into a sorted non-overlapping span list, keeping it
/// sorted and non-overlapping. The new span wins: fully covered spans
/// are removed, partially covered neighbors are truncated, and a span
/// that strictly contains the new one is split around it.
pub(crate) fn insert_span(spans: &mut Vec<ColorSpan>, new: ColorSpan) {
    if new.is_empty() {
        return;
    }
    let mut idx = spans.partition_point(|s| s.start < new.start);
    if idx > 0 && spans[idx - 1].end > new.start {
        let prev = spans[idx - 1];
        if prev.end > new.end {
            // Strictly containing span: split around the new one.
            spans[idx - 1].end = new.start;
            let tail = ColorSpan::new(new.end, prev.end, prev.color);
            if spans[idx - 1].is_empty() {
                spans[idx - 1] = new;
                spans.insert(idx, tail);
            } else {
                spans.insert(idx, new);
                spans.insert(idx + 1, tail);
            }
            return;
        }
        spans[idx - 1].end = new.start;
        if spans[idx - 1].is_empty() {
            spans.remove(idx - 1);
            idx -= 1;
        }
    }
    while idx < spans.len() && spans[idx].end <= new.end {
        spans.remove(idx);
    }
    if idx < spans.len() && spans[idx].start < new.end {
        spans[idx].start = new.end;
    }
    spans.insert(idx, new);
}

/// Carve `[start, end)` out of a sorted non-overlapping span list.
pub(crate) fn remove_range(spans: &mut Vec<ColorSpan>, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let mut idx = spans.partition_point(|s| s.start < start);
    if idx > 0 && spans[idx - 1].end > start {
        let prev = spans[idx - 1];
        if prev.end > end {
            spans[idx - 1].end = start;
            let tail = ColorSpan::new(end, prev.end, prev.color);
            if spans[idx - 1].is_empty() {
                spans[idx - 1] = tail;
            } else {
                spans.insert(idx, tail);
            }
            return;
        }
        spans[idx - 1].end = start;
        if spans[idx - 1].is_empty() {
            spans.remove(idx - 1);
            idx -= 1;
        }
    }
    while idx < spans.len() && spans[idx].end <= end {
        spans.remove(idx);
    }
    if idx < spans.len() && spans[idx].start < end {
        spans[idx].start = end;
    }
}

/// Per-line colored spans with a drainable change journal.
#[derive(Debug, Default)]
pub struct ColorSpanLayer {
    lines: BTreeMap<usize, Vec<ColorSpan>>,
    default_color: Option<Color>,
    changes: LayerChanges,
}

impl ColorSpanLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_color(color: Color) -> Self {
        Self {
            default_color: Some(color),
            ..Self::default()
        }
    }

    /// The color a `color: None` span resolves to.
    pub fn default_color(&self) -> Option<Color> {
        self.default_color
    }

    /// Change the default color; every line holding a default-colored
    /// span may render differently, so this is a layer-wide change.
    pub fn set_default_color(&mut self, color: Option<Color>) {
        if self.default_color != color {
            self.default_color = color;
            self.changes = LayerChanges::All;
        }
    }

    /// A span's color with the layer default applied.
    pub fn resolve_color(&self, span: &ColorSpan) -> Option<Color> {
        span.color.or(self.default_color)
    }

    /// Add a span to a line, truncating or splitting whatever it
    /// overlaps.
    pub fn add(&mut self, line: usize, start: usize, end: usize, color: Option<Color>) {
        if start >= end {
            return;
        }
        insert_span(
            self.lines.entry(line).or_default(),
            ColorSpan::new(start, end, color),
        );
        self.record_line(line);
    }

    /// Remove the intersection of `[start, end)` from a line's spans.
    pub fn remove(&mut self, line: usize, start: usize, end: usize) {
        let Some(spans) = self.lines.get_mut(&line) else {
            return;
        };
        remove_range(spans, start, end);
        if spans.is_empty() {
            self.lines.remove(&line);
        }
        self.record_line(line);
    }

    /// Remove all spans of one line.
    pub fn clear_line(&mut self, line: usize) {
        if self.lines.remove(&line).is_some() {
            self.record_line(line);
        }
    }

    /// Remove every span in the layer.
    pub fn clear(&mut self) {
        if !self.lines.is_empty() {
            self.lines.clear();
            self.changes = LayerChanges::All;
            tracing::trace!("span layer cleared");
        }
    }

    /// Sorted, non-overlapping spans of a line; empty when none.
    pub fn spans_for_line(&self, line: usize) -> &[ColorSpan] {
        self.lines.get(&line).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drain the change journal, resetting it to `None`.
    pub fn take_changes(&mut self) -> LayerChanges {
        std::mem::take(&mut self.changes)
    }

    fn record_line(&mut self, line: usize) {
        match &mut self.changes {
            LayerChanges::None => {
                self.changes = LayerChanges::Lines(BTreeSet::from([line]));
            }
            LayerChanges::Lines(lines) => {
                lines.insert(line);
            }
            LayerChanges::All => {}
        }
    }
}
