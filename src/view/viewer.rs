//! The text viewer model.
//!
//! Owns the document text, the line table, the color span layers, and
//! per-line caches of shaped geometry, merged foreground spans, and
//! background rects. Caches are filled lazily by `render` and
//! `hit_test`, so every query costs time proportional to the viewport,
//! not the document. Invalidation is narrow: layer change journals,
//! highlighter or shaper swaps, and selection changes each clear only
//! what they affect.

use std::collections::HashMap;
use std::rc::Rc;

use ratatui::style::Color;

use crate::error::ViewerError;
use crate::primitives::line_table::{LineTable, TextPosition};
use crate::view::highlight::{Highlighter, HighlighterToken};
use crate::view::shaping::{MonospaceShaper, ShapedLine, TextShaper};
use crate::view::span_layer::{insert_span, ColorSpan, ColorSpanLayer, LayerChanges};

/// Pixel size of the area a render call must fill.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Handle to a layer added to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(usize);

/// Result of a successful hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextHitInfo {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// A background highlight rect within one rendered line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundRect {
    pub x: f32,
    pub width: f32,
    pub color: Color,
}

/// A run of same-colored text within one rendered line. `start`/`end`
/// are byte offsets into the line's text; `color: None` means the
/// embedder's default foreground.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledSegment {
    pub start: usize,
    pub end: usize,
    pub x: f32,
    pub color: Option<Color>,
}

/// Selection geometry within one rendered line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub x: f32,
    pub width: f32,
}

/// One visible line of a rendered frame. `y` is viewport-relative;
/// segment and rect x positions already account for horizontal scroll.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    pub line: usize,
    pub y: f32,
    pub backgrounds: Vec<BackgroundRect>,
    pub segments: Vec<StyledSegment>,
    pub selection: Option<SelectionRect>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderFrame {
    pub lines: Vec<RenderedLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayerRole {
    Foreground,
    Background,
}

struct LayerEntry {
    role: LayerRole,
    layer: ColorSpanLayer,
}

#[derive(Default)]
struct LineCache {
    shaped: Option<Rc<ShapedLine>>,
    fg_valid: bool,
    fg_spans: Vec<ColorSpan>,
    bg_valid: bool,
    bg_rects: Vec<BackgroundRect>,
}

impl LineCache {
    fn invalidate_role(&mut self, role: LayerRole) {
        match role {
            LayerRole::Foreground => self.fg_valid = false,
            LayerRole::Background => self.bg_valid = false,
        }
    }
}

pub struct TextViewerModel {
    text: Option<Rc<str>>,
    line_table: LineTable,
    shaper: Box<dyn TextShaper>,
    highlighter: Option<Box<dyn Highlighter>>,
    layers: Vec<LayerEntry>,
    caches: Vec<LineCache>,
    shaped_count: usize,
    // Multi-line highlighter blocks, sorted by start offset.
    blocks: Vec<HighlighterToken>,
    block_starts: Vec<usize>,
    blocks_valid: bool,
    top_line: usize,
    horizontal_scroll: f32,
    // Selection as a clamped (start offset, length) pair with derived
    // endpoint positions.
    selection: Option<Selection>,
    selection_rects: HashMap<usize, SelectionRect>,
    hit_memo: Option<HitMemo>,
}

#[derive(Debug, Clone, Copy)]
struct Selection {
    start: usize,
    end: usize,
    start_position: TextPosition,
    end_position: TextPosition,
}

#[derive(Debug, Clone, Copy)]
struct HitMemo {
    x: f32,
    y: f32,
    result: Option<TextHitInfo>,
}

impl Default for TextViewerModel {
    fn default() -> Self {
        Self::new(Box::new(MonospaceShaper::default()))
    }
}

impl TextViewerModel {
    pub fn new(shaper: Box<dyn TextShaper>) -> Self {
        Self {
            text: None,
            line_table: LineTable::default(),
            shaper,
            highlighter: None,
            layers: Vec::new(),
            caches: Vec::new(),
            shaped_count: 0,
            blocks: Vec::new(),
            block_starts: Vec::new(),
            blocks_valid: true,
            top_line: 0,
            horizontal_scroll: 0.0,
            selection: None,
            selection_rects: HashMap::new(),
            hit_memo: None,
        }
    }

    /// Load a document, rebuilding the line table and discarding every
    /// cache. There is no incremental edit path; replacing the text is
    /// the only mutation.
    pub fn set_text(&mut self, text: impl Into<Rc<str>>) {
        let text = text.into();
        self.line_table = LineTable::new(&text);
        let line_count = self.line_table.line_count();
        self.caches = std::iter::repeat_with(LineCache::default)
            .take(line_count)
            .collect();
        self.shaped_count = 0;
        self.blocks_valid = false;
        self.top_line = 0;
        self.horizontal_scroll = 0.0;
        self.selection = None;
        self.selection_rects.clear();
        self.hit_memo = None;
        tracing::debug!(bytes = text.len(), lines = line_count, "document loaded");
        self.text = Some(text);
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn line_count(&self) -> usize {
        self.line_table.line_count()
    }

    pub fn line_table(&self) -> &LineTable {
        &self.line_table
    }

    /// Number of lines that have ever been shaped since the last
    /// `set_text` or shaper change.
    pub fn shaped_line_count(&self) -> usize {
        self.shaped_count
    }

    /// Swap the shaper, invalidating all geometry-derived caches.
    pub fn set_shaper(&mut self, shaper: Box<dyn TextShaper>) {
        self.shaper = shaper;
        for cache in &mut self.caches {
            cache.shaped = None;
            cache.fg_valid = false;
            cache.bg_valid = false;
        }
        self.shaped_count = 0;
        self.selection_rects.clear();
        self.hit_memo = None;
        tracing::debug!("shaper replaced, shaping caches dropped");
    }

    /// Swap the highlighter, invalidating all foreground caches and the
    /// multi-line block index.
    pub fn set_highlighter(&mut self, highlighter: Option<Box<dyn Highlighter>>) {
        self.highlighter = highlighter;
        self.blocks_valid = false;
        for cache in &mut self.caches {
            cache.fg_valid = false;
        }
        tracing::debug!("highlighter replaced, foreground caches dropped");
    }

    pub fn add_foreground_layer(&mut self) -> LayerId {
        self.add_layer(LayerRole::Foreground)
    }

    pub fn add_background_layer(&mut self) -> LayerId {
        self.add_layer(LayerRole::Background)
    }

    fn add_layer(&mut self, role: LayerRole) -> LayerId {
        self.layers.push(LayerEntry {
            role,
            layer: ColorSpanLayer::new(),
        });
        LayerId(self.layers.len() - 1)
    }

    /// Mutable access to a layer's spans. Mutations are picked up at the
    /// next render through the layer's change journal.
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut ColorSpanLayer> {
        self.layers.get_mut(id.0).map(|entry| &mut entry.layer)
    }

    pub fn top_line(&self) -> usize {
        self.top_line
    }

    /// Scroll so `line` is the first visible line. Out-of-range values
    /// clamp to the line count.
    pub fn set_top_line(&mut self, line: usize) {
        let clamped = line.min(self.line_table.line_count());
        if clamped != line {
            tracing::warn!(line, clamped, "top line clamped");
        }
        self.top_line = clamped;
    }

    pub fn horizontal_scroll(&self) -> f32 {
        self.horizontal_scroll
    }

    pub fn set_horizontal_scroll(&mut self, x: f32) {
        self.horizontal_scroll = x.max(0.0);
    }

    /// Select `len` bytes starting at `offset`. Both endpoints are
    /// clamped to the document and snapped back to the nearest char
    /// boundary, so an offset inside a multi-byte character selects
    /// from that character's start.
    pub fn select(&mut self, offset: usize, len: usize) -> Result<(), ViewerError> {
        let text = self.require_text()?;
        let start = snap_to_char_boundary(text, offset);
        let end = snap_to_char_boundary(text, offset.saturating_add(len));
        self.selection_rects.clear();
        if start >= end || self.line_table.line_count() == 0 {
            self.selection = None;
            return Ok(());
        }
        // In-range offsets always convert; line_count was checked above.
        let start_position = self
            .line_table
            .position_of_offset(start)
            .unwrap_or_default();
        let end_position = self.line_table.position_of_offset(end).unwrap_or_default();
        self.selection = Some(Selection {
            start,
            end,
            start_position,
            end_position,
        });
        Ok(())
    }

    /// Select the range between two positions, in either order.
    pub fn select_positions(
        &mut self,
        a: TextPosition,
        b: TextPosition,
    ) -> Result<(), ViewerError> {
        self.require_text()?;
        let table = &self.line_table;
        let offset_a = table.offset_of_position(a).unwrap_or(table.end_offset());
        let offset_b = table.offset_of_position(b).unwrap_or(table.end_offset());
        let (start, end) = if offset_a <= offset_b {
            (offset_a, offset_b)
        } else {
            (offset_b, offset_a)
        };
        self.select(start, end - start)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.selection_rects.clear();
    }

    /// The selection as a `(start offset, length)` pair.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection.map(|s| (s.start, s.end - s.start))
    }

    pub fn selection_positions(&self) -> Option<(TextPosition, TextPosition)> {
        self.selection.map(|s| (s.start_position, s.end_position))
    }

    /// Exactly the selected substring, `None` when nothing is selected.
    pub fn selected_text(&self) -> Option<&str> {
        let selection = self.selection?;
        let text = self.text.as_deref()?;
        Some(&text[selection.start..selection.end])
    }

    /// Produce the visible frame: background rects, styled segments, and
    /// selection geometry for every line in
    /// `[top_line, top_line + rows)`. Only those lines have their caches
    /// refreshed.
    pub fn render(&mut self, viewport: ViewportSize) -> Result<RenderFrame, ViewerError> {
        let text = self.require_text()?.clone();
        self.hit_memo = None;
        self.apply_layer_changes();
        if !self.blocks_valid {
            self.rebuild_blocks(&text);
        }
        let line_height = self.shaper.line_height();
        if viewport.is_empty() || line_height <= 0.0 {
            return Ok(RenderFrame::default());
        }
        let rows = (viewport.height / line_height).ceil() as usize;
        let line_count = self.line_table.line_count();
        let mut frame = RenderFrame::default();
        for row in 0..rows {
            let line = self.top_line + row;
            if line >= line_count {
                break;
            }
            let shaped = self.ensure_shaped(&text, line);
            if !self.caches[line].fg_valid {
                self.refresh_foreground(&text, line);
            }
            if !self.caches[line].bg_valid {
                self.refresh_background(line, &shaped);
            }
            let cache = &self.caches[line];
            let scroll = self.horizontal_scroll;
            let segments = cache
                .fg_spans
                .iter()
                .map(|span| StyledSegment {
                    start: span.start,
                    end: span.end,
                    x: shaped.x_for_offset(span.start) - scroll,
                    color: span.color,
                })
                .collect();
            let backgrounds = cache
                .bg_rects
                .iter()
                .map(|rect| BackgroundRect {
                    x: rect.x - scroll,
                    ..*rect
                })
                .collect();
            let selection = self
                .selection_rect_for_line(line, &shaped)
                .map(|rect| SelectionRect {
                    x: rect.x - scroll,
                    width: rect.width,
                });
            frame.lines.push(RenderedLine {
                line,
                y: row as f32 * line_height,
                backgrounds,
                segments,
                selection,
            });
        }
        Ok(frame)
    }

    /// Map a viewport-relative pixel position to a text position.
    /// `None` when the position falls outside the document. The last
    /// answer is memoized per pixel and the memo is cleared by every
    /// render, so mouse-move floods between frames cost one lookup.
    pub fn hit_test(&mut self, x: f32, y: f32) -> Result<Option<TextHitInfo>, ViewerError> {
        let text = self.require_text()?.clone();
        if let Some(memo) = &self.hit_memo {
            if memo.x == x && memo.y == y {
                return Ok(memo.result);
            }
        }
        let result = self.hit_test_uncached(&text, x, y);
        self.hit_memo = Some(HitMemo { x, y, result });
        Ok(result)
    }

    fn hit_test_uncached(&mut self, text: &str, x: f32, y: f32) -> Option<TextHitInfo> {
        let line_height = self.shaper.line_height();
        if y < 0.0 || line_height <= 0.0 {
            return None;
        }
        let line = self.top_line + (y / line_height) as usize;
        if line >= self.line_table.line_count() {
            return None;
        }
        let shaped = self.ensure_shaped(text, line);
        let column = shaped.offset_for_x(x + self.horizontal_scroll);
        let offset = self.line_table.line_start(line) + column;
        Some(TextHitInfo {
            line,
            column,
            offset,
        })
    }

    /// Vertically scroll the minimum amount that makes the line range
    /// `[first, last]` visible. No-op when it already is.
    pub fn bring_line_range_into_view(
        &mut self,
        first: usize,
        last: usize,
        viewport: ViewportSize,
    ) -> Result<(), ViewerError> {
        self.require_text()?;
        let line_height = self.shaper.line_height();
        if line_height <= 0.0 {
            return Ok(());
        }
        let rows = ((viewport.height / line_height) as usize).max(1);
        let line_count = self.line_table.line_count();
        let first = first.min(line_count.saturating_sub(1));
        let last = last.clamp(first, line_count.saturating_sub(1));
        if first >= self.top_line && last < self.top_line + rows {
            return Ok(());
        }
        let new_top = if first < self.top_line {
            first
        } else {
            (last + 1).saturating_sub(rows)
        };
        tracing::trace!(first, last, from = self.top_line, to = new_top, "scrolled into view");
        self.top_line = new_top;
        Ok(())
    }

    /// Scroll vertically and horizontally so the byte range
    /// `[start, end)` is visible. The horizontal extent is taken from
    /// the widest intersecting line of a multi-line range.
    pub fn bring_offset_range_into_view(
        &mut self,
        start: usize,
        end: usize,
        viewport: ViewportSize,
    ) -> Result<(), ViewerError> {
        let text = self.require_text()?.clone();
        let end_of_text = text.len();
        let start = start.min(end_of_text);
        let end = end.clamp(start, end_of_text);
        let Some(start_position) = self.line_table.position_of_offset(start) else {
            return Ok(());
        };
        let Some(end_position) = self.line_table.position_of_offset(end) else {
            return Ok(());
        };
        self.bring_line_range_into_view(start_position.line, end_position.line, viewport)?;
        // Horizontal: x extents across every intersecting line.
        let mut min_x = f32::INFINITY;
        let mut max_x: f32 = 0.0;
        for line in start_position.line..=end_position.line {
            let line_start = self.line_table.line_start(line);
            let line_end = line_start + self.line_table.line_text(&text, line).len();
            let shaped = self.ensure_shaped(&text, line);
            let from = start.max(line_start) - line_start;
            let to = end.min(line_end).saturating_sub(line_start);
            min_x = min_x.min(shaped.x_for_offset(from));
            max_x = max_x.max(shaped.x_for_offset(to));
        }
        if !min_x.is_finite() {
            return Ok(());
        }
        if min_x < self.horizontal_scroll {
            tracing::trace!(from = self.horizontal_scroll, to = min_x, "scrolled left");
            self.horizontal_scroll = min_x;
        } else if max_x > self.horizontal_scroll + viewport.width {
            let to = (max_x - viewport.width).max(0.0);
            tracing::trace!(from = self.horizontal_scroll, to, "scrolled right");
            self.horizontal_scroll = to;
        }
        Ok(())
    }

    fn require_text(&self) -> Result<&Rc<str>, ViewerError> {
        self.text.as_ref().ok_or(ViewerError::NoDocument)
    }

    /// Drain every layer's change journal into per-line dirty flags.
    fn apply_layer_changes(&mut self) {
        let drained: Vec<(LayerRole, LayerChanges)> = self
            .layers
            .iter_mut()
            .map(|entry| (entry.role, entry.layer.take_changes()))
            .collect();
        for (role, changes) in drained {
            match changes {
                LayerChanges::None => {}
                LayerChanges::All => {
                    tracing::trace!(?role, "layer changed wholesale");
                    for cache in &mut self.caches {
                        cache.invalidate_role(role);
                    }
                }
                LayerChanges::Lines(lines) => {
                    for line in lines {
                        if let Some(cache) = self.caches.get_mut(line) {
                            cache.invalidate_role(role);
                        }
                    }
                }
            }
        }
    }

    /// Recompute the multi-line block index from the highlighter.
    fn rebuild_blocks(&mut self, text: &str) {
        self.blocks.clear();
        self.block_starts.clear();
        if let Some(highlighter) = &self.highlighter {
            let table = &self.line_table;
            let mut blocks: Vec<HighlighterToken> = highlighter
                .highlight_blocks(text)
                .into_iter()
                .filter(|token| {
                    let first = table.position_of_offset(token.start.min(text.len()));
                    let last = table.position_of_offset(token.end.min(text.len()));
                    match (first, last) {
                        (Some(a), Some(b)) => a.line != b.line,
                        _ => false,
                    }
                })
                .collect();
            blocks.sort_by_key(|token| token.start);
            self.block_starts = blocks.iter().map(|token| token.start).collect();
            self.blocks = blocks;
        }
        self.blocks_valid = true;
        tracing::debug!(blocks = self.blocks.len(), "block index rebuilt");
    }

    /// The multi-line block open at the start of `line`, if any.
    fn active_block_for_line(&self, line: usize) -> Option<&HighlighterToken> {
        let line_start = self.line_table.line_start(line);
        let idx = self.block_starts.partition_point(|&s| s <= line_start);
        let candidate = &self.blocks[idx.checked_sub(1)?];
        (candidate.end > line_start).then_some(candidate)
    }

    fn ensure_shaped(&mut self, text: &str, line: usize) -> Rc<ShapedLine> {
        if let Some(shaped) = &self.caches[line].shaped {
            return shaped.clone();
        }
        let shaped = Rc::new(self.shaper.shape(self.line_table.line_text(text, line)));
        self.caches[line].shaped = Some(shaped.clone());
        self.shaped_count += 1;
        shaped
    }

    /// Merge base color, active block, highlighter tokens, and all
    /// foreground layers into one sorted non-overlapping span list.
    /// Later contributors win via the span insertion routine.
    fn refresh_foreground(&mut self, text: &str, line: usize) {
        let line_text = self.line_table.line_text(text, line);
        let line_start = self.line_table.line_start(line);
        let line_len = line_text.len();
        if line_len == 0 {
            let cache = &mut self.caches[line];
            cache.fg_spans.clear();
            cache.fg_valid = true;
            return;
        }
        let mut spans = vec![ColorSpan::new(0, line_len, None)];
        let active_block = self.active_block_for_line(line).cloned();
        if let Some(block) = &active_block {
            // Clip the document-global block to line-local coordinates.
            let from = block.start.saturating_sub(line_start).min(line_len);
            let to = block.end.saturating_sub(line_start).min(line_len);
            insert_span(&mut spans, ColorSpan::new(from, to, Some(block.color)));
        }
        if let Some(highlighter) = &self.highlighter {
            for token in highlighter.highlight_line(line_text, active_block.as_ref()) {
                insert_span(
                    &mut spans,
                    ColorSpan::new(token.start, token.end.min(line_len), Some(token.color)),
                );
            }
        }
        for entry in &self.layers {
            if entry.role != LayerRole::Foreground {
                continue;
            }
            for span in entry.layer.spans_for_line(line) {
                insert_span(
                    &mut spans,
                    ColorSpan::new(
                        span.start,
                        span.end.min(line_len),
                        entry.layer.resolve_color(span),
                    ),
                );
            }
        }
        let cache = &mut self.caches[line];
        cache.fg_spans = spans;
        cache.fg_valid = true;
    }

    /// Accumulate background rects from every background layer, in layer
    /// order.
    fn refresh_background(&mut self, line: usize, shaped: &ShapedLine) {
        let mut rects = Vec::new();
        for entry in &self.layers {
            if entry.role != LayerRole::Background {
                continue;
            }
            for span in entry.layer.spans_for_line(line) {
                // A span without its own color takes the layer default;
                // with neither there is nothing to paint.
                let Some(color) = entry.layer.resolve_color(span) else {
                    continue;
                };
                let x = shaped.x_for_offset(span.start);
                let width = shaped.x_for_offset(span.end) - x;
                if width > 0.0 {
                    rects.push(BackgroundRect { x, width, color });
                }
            }
        }
        let cache = &mut self.caches[line];
        cache.bg_rects = rects;
        cache.bg_valid = true;
    }

    /// Selection geometry for one line, cached until the selection
    /// changes.
    fn selection_rect_for_line(&mut self, line: usize, shaped: &ShapedLine) -> Option<SelectionRect> {
        let selection = self.selection?;
        if line < selection.start_position.line || line > selection.end_position.line {
            return None;
        }
        if let Some(rect) = self.selection_rects.get(&line) {
            return Some(*rect);
        }
        let line_start = self.line_table.line_start(line);
        let line_end = self.line_table.line_range(line).end;
        let from = selection.start.max(line_start) - line_start;
        let to = selection.end.min(line_end) - line_start;
        let x = shaped.x_for_offset(from);
        let width = shaped.x_for_offset(to) - x;
        let rect = SelectionRect { x, width };
        self.selection_rects.insert(line, rect);
        Some(rect)
    }
}

/// Clamp to the text length, then back off to the nearest char
/// boundary. Selection endpoints must never split a multi-byte
/// character or slicing the selected text would panic.
fn snap_to_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

impl std::fmt::Debug for TextViewerModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextViewerModel")
            .field("lines", &self.line_table.line_count())
            .field("top_line", &self.top_line)
            .field("layers", &self.layers.len())
            .field("shaped_count", &self.shaped_count)
            .finish_non_exhaustive()
    }
}
