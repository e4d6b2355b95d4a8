//! Text shaping seam.
//!
//! The viewer converts between byte offsets and x pixel positions only
//! through a [`TextShaper`], so the geometry source (a real font shaper
//! in a GUI shell, terminal cells here) is swappable. The bundled
//! [`MonospaceShaper`] measures with `unicode-width` and expands tabs to
//! fixed stops.

use unicode_width::UnicodeWidthChar;

pub const TAB_WIDTH: usize = 8;

/// Geometry of one shaped line.
///
/// `offsets` holds the byte offset of each character plus an end
/// sentinel; `xs` holds the leading-edge x of each character plus the
/// trailing x of the line. Both are monotonically non-decreasing and
/// always the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedLine {
    offsets: Vec<usize>,
    xs: Vec<f32>,
}

impl ShapedLine {
    pub fn new(offsets: Vec<usize>, xs: Vec<f32>) -> Self {
        debug_assert_eq!(offsets.len(), xs.len());
        debug_assert!(!offsets.is_empty());
        Self { offsets, xs }
    }

    /// Total advance width of the line.
    pub fn width(&self) -> f32 {
        *self.xs.last().unwrap_or(&0.0)
    }

    /// Leading-edge x of the character containing `offset`. Offsets past
    /// the end clamp to the trailing edge; an offset inside a multi-byte
    /// character snaps to that character's leading edge.
    pub fn x_for_offset(&self, offset: usize) -> f32 {
        let idx = self.offsets.partition_point(|&o| o <= offset);
        self.xs[idx.saturating_sub(1).min(self.xs.len() - 1)]
    }

    /// Byte offset of the character boundary nearest to `x`. Positions
    /// past either end clamp to the first or last boundary.
    pub fn offset_for_x(&self, x: f32) -> usize {
        if x <= 0.0 {
            return self.offsets[0];
        }
        let last = self.xs.len() - 1;
        if x >= self.xs[last] {
            return self.offsets[last];
        }
        // Character whose [leading, trailing) interval contains x.
        let idx = self.xs.partition_point(|&edge| edge <= x) - 1;
        let lead = self.xs[idx];
        let trail = self.xs[idx + 1];
        if x - lead > (trail - lead) / 2.0 {
            self.offsets[idx + 1]
        } else {
            self.offsets[idx]
        }
    }
}

pub trait TextShaper {
    fn shape(&self, line: &str) -> ShapedLine;
    fn line_height(&self) -> f32;
}

/// Fixed-cell shaper: every character advances by its terminal cell
/// width times `cell_width`, tabs jump to the next `tab_width` stop.
#[derive(Debug, Clone)]
pub struct MonospaceShaper {
    pub cell_width: f32,
    pub line_height: f32,
    pub tab_width: usize,
}

impl Default for MonospaceShaper {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            line_height: 16.0,
            tab_width: TAB_WIDTH,
        }
    }
}

impl MonospaceShaper {
    pub fn new(cell_width: f32, line_height: f32) -> Self {
        Self {
            cell_width,
            line_height,
            tab_width: TAB_WIDTH,
        }
    }
}

impl TextShaper for MonospaceShaper {
    fn shape(&self, line: &str) -> ShapedLine {
        let mut offsets = Vec::with_capacity(line.chars().count() + 1);
        let mut xs = Vec::with_capacity(offsets.capacity());
        let mut cells = 0usize;
        for (idx, ch) in line.char_indices() {
            offsets.push(idx);
            xs.push(cells as f32 * self.cell_width);
            cells += if ch == '\t' {
                let tab = self.tab_width.max(1);
                tab - cells % tab
            } else {
                ch.width().unwrap_or(0)
            };
        }
        offsets.push(line.len());
        xs.push(cells as f32 * self.cell_width);
        ShapedLine::new(offsets, xs)
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}
