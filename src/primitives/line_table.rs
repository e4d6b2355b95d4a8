//! Line-offset table and offset/position conversion.
//!
//! Byte offsets are the authoritative coordinate everywhere in this crate;
//! line numbers and columns are derived from them on demand. The table is
//! rebuilt wholly whenever the document text is replaced — there is no
//! incremental edit support.

use std::ops::Range;

use memchr::memchr2;
use serde::{Deserialize, Serialize};

/// A `(line, column)` pair, both 0-based and byte-valued.
/// Presentation layers add 1 for display.
///
/// Ordering is lexicographic: first by line, then by column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

impl TextPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Start offsets of every line of a text, plus an end sentinel.
///
/// Invariants:
/// - offsets are strictly increasing, `offsets[0] == 0`, and the last
///   entry equals the text length;
/// - `offsets[i + 1] - offsets[i]` is the length of line `i` including
///   its terminator;
/// - a non-empty text has `line_count() + 1` entries; the empty text has
///   zero lines and the single entry `[0]`.
///
/// Line terminators are `\n`, `\r\n`, and bare `\r`. A text ending in a
/// terminator has no trailing empty line: the sentinel is only appended
/// when the text does not already end at a line start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTable {
    offsets: Vec<usize>,
}

impl Default for LineTable {
    fn default() -> Self {
        Self { offsets: vec![0] }
    }
}

impl LineTable {
    /// Build the table with a single scan over the text.
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut offsets = Vec::with_capacity(bytes.len() / 32 + 2);
        offsets.push(0);
        let mut i = 0;
        while let Some(rel) = memchr2(b'\n', b'\r', &bytes[i..]) {
            let mut j = i + rel;
            if bytes[j] == b'\r' && bytes.get(j + 1) == Some(&b'\n') {
                j += 1;
            }
            offsets.push(j + 1);
            i = j + 1;
        }
        if *offsets.last().unwrap_or(&0) != text.len() {
            offsets.push(text.len());
        }
        tracing::trace!(lines = offsets.len() - 1, bytes = text.len(), "line table built");
        Self { offsets }
    }

    /// Number of lines in the text. Zero for the empty text.
    pub fn line_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// The raw offset table, `line_count() + 1` entries.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Offset of the end sentinel (the text length).
    pub fn end_offset(&self) -> usize {
        *self.offsets.last().unwrap_or(&0)
    }

    /// Start offset of a line. Panics on an out-of-range line, like
    /// indexing; use [`Self::line_range`] via `line_count` checks first.
    pub fn line_start(&self, line: usize) -> usize {
        self.offsets[line]
    }

    /// Byte range of a line including its terminator.
    pub fn line_range(&self, line: usize) -> Range<usize> {
        self.offsets[line]..self.offsets[line + 1]
    }

    /// The text of a line with its terminator stripped.
    pub fn line_text<'t>(&self, text: &'t str, line: usize) -> &'t str {
        text[self.line_range(line)].trim_end_matches(['\r', '\n'])
    }

    /// Convert a document offset to a `(line, column)` position by binary
    /// search. `None` when the offset is past the end of the text or the
    /// text is empty. The end-of-text offset maps to the end of the last
    /// line.
    pub fn position_of_offset(&self, offset: usize) -> Option<TextPosition> {
        if self.line_count() == 0 || offset > self.end_offset() {
            return None;
        }
        let starts = &self.offsets[..self.line_count()];
        let line = starts.partition_point(|&s| s <= offset) - 1;
        Some(TextPosition::new(line, offset - starts[line]))
    }

    /// Convert a `(line, column)` position back to a document offset.
    /// `None` when the line does not exist or the column lies past the
    /// line's full length (terminator included).
    pub fn offset_of_position(&self, position: TextPosition) -> Option<usize> {
        if position.line >= self.line_count() {
            return None;
        }
        let range = self.line_range(position.line);
        if position.column > range.end - range.start {
            return None;
        }
        Some(range.start + position.column)
    }
}

/// Count line breaks inside `range` and report the absolute offset of the
/// last line start found, if any.
///
/// A break is attributed to the byte that completes its terminator (the
/// `\n` of a `\r\n` pair), so counting over contiguous ranges never counts
/// a split pair twice. Searchers use this to advance a running line
/// counter from one match to the next instead of recomputing the line
/// number from scratch — O(matches + text) amortized.
pub fn count_line_breaks(text: &str, range: Range<usize>) -> (usize, Option<usize>) {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut last_start = None;
    let mut k = range.start;
    while k < range.end {
        let Some(rel) = memchr2(b'\n', b'\r', &bytes[k..range.end]) else {
            break;
        };
        let j = k + rel;
        if bytes[j] == b'\r' && bytes.get(j + 1) == Some(&b'\n') {
            // The break belongs to the '\n'; if it falls outside the
            // range, the next contiguous range will count it.
            k = j + 1;
            continue;
        }
        count += 1;
        last_start = Some(j + 1);
        k = j + 1;
    }
    (count, last_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_zero_lines() {
        let table = LineTable::new("");
        assert_eq!(table.line_count(), 0);
        assert_eq!(table.offsets(), &[0]);
        assert_eq!(table.position_of_offset(0), None);
    }

    #[test]
    fn test_single_line_no_terminator() {
        let table = LineTable::new("abc");
        assert_eq!(table.line_count(), 1);
        assert_eq!(table.offsets(), &[0, 3]);
        assert_eq!(table.line_text("abc", 0), "abc");
    }

    #[test]
    fn test_trailing_newline_has_no_phantom_line() {
        let table = LineTable::new("abc\n");
        assert_eq!(table.line_count(), 1);
        assert_eq!(table.offsets(), &[0, 4]);
    }

    #[test]
    fn test_mixed_terminators() {
        let text = "a\nbb\r\nccc\rd";
        let table = LineTable::new(text);
        assert_eq!(table.offsets(), &[0, 2, 6, 10, 11]);
        assert_eq!(table.line_count(), 4);
        assert_eq!(table.line_text(text, 0), "a");
        assert_eq!(table.line_text(text, 1), "bb");
        assert_eq!(table.line_text(text, 2), "ccc");
        assert_eq!(table.line_text(text, 3), "d");
    }

    #[test]
    fn test_position_of_offset() {
        let text = "ab\ncd";
        let table = LineTable::new(text);
        assert_eq!(table.position_of_offset(0), Some(TextPosition::new(0, 0)));
        assert_eq!(table.position_of_offset(2), Some(TextPosition::new(0, 2)));
        assert_eq!(table.position_of_offset(3), Some(TextPosition::new(1, 0)));
        // End-of-text offset belongs to the last line.
        assert_eq!(table.position_of_offset(5), Some(TextPosition::new(1, 2)));
        assert_eq!(table.position_of_offset(6), None);
    }

    #[test]
    fn test_offset_of_position_round_trip() {
        let text = "ab\r\ncd\ne";
        let table = LineTable::new(text);
        for offset in 0..=text.len() {
            let pos = table.position_of_offset(offset).unwrap();
            assert_eq!(table.offset_of_position(pos), Some(offset), "offset {offset}");
        }
    }

    #[test]
    fn test_offset_of_position_rejects_bad_input() {
        let table = LineTable::new("ab\ncd");
        assert_eq!(table.offset_of_position(TextPosition::new(2, 0)), None);
        assert_eq!(table.offset_of_position(TextPosition::new(0, 4)), None);
        // Column equal to the full line length (terminator included) is
        // accepted; it is the next line's start offset.
        assert_eq!(table.offset_of_position(TextPosition::new(0, 3)), Some(3));
    }

    #[test]
    fn test_count_line_breaks_basic() {
        let text = "a\nb\nc";
        assert_eq!(count_line_breaks(text, 0..text.len()), (2, Some(4)));
        assert_eq!(count_line_breaks(text, 0..1), (0, None));
        assert_eq!(count_line_breaks(text, 0..2), (1, Some(2)));
    }

    #[test]
    fn test_count_line_breaks_split_crlf_pair() {
        let text = "a\r\nb";
        // Range ends between '\r' and '\n': the break is not yet counted.
        assert_eq!(count_line_breaks(text, 0..2), (0, None));
        // The adjacent range starting at the '\n' counts it exactly once.
        assert_eq!(count_line_breaks(text, 2..4), (1, Some(3)));
        // And the whole range counts it once too.
        assert_eq!(count_line_breaks(text, 0..4), (1, Some(3)));
    }

    #[test]
    fn test_count_line_breaks_matches_line_table() {
        let text = "one\r\ntwo\rthree\nfour";
        let table = LineTable::new(text);
        let (count, last) = count_line_breaks(text, 0..text.len());
        assert_eq!(count, table.line_count() - 1);
        assert_eq!(last, Some(table.line_start(table.line_count() - 1)));
    }
}
