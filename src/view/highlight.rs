//! Syntax highlighter contract.
//!
//! Implementations are injected by the embedder. They must be
//! deterministic and side-effect-free: the viewer caches per-line token
//! lists and only re-asks when the line's cache is invalidated.

use ratatui::style::Color;

/// A colored token.
///
/// Tokens returned by [`Highlighter::highlight_line`] use offsets local
/// to that line's text; tokens returned by
/// [`Highlighter::highlight_blocks`] use document-global byte offsets.
/// `kind` is a free-form tag (for example `"TAG"` or `"comment"`) passed
/// through to the embedder untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlighterToken {
    pub color: Color,
    pub kind: String,
    pub start: usize,
    pub end: usize,
}

impl HighlighterToken {
    pub fn new(color: Color, kind: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            color,
            kind: kind.into(),
            start,
            end,
        }
    }
}

pub trait Highlighter {
    /// Tokenize one line. `active_block` is the multi-line block (from
    /// [`Self::highlight_blocks`]) that is open at the start of this
    /// line, if any; a block-aware highlighter colors the whole line
    /// accordingly until the block's closing syntax.
    fn highlight_line(
        &self,
        line_text: &str,
        active_block: Option<&HighlighterToken>,
    ) -> Vec<HighlighterToken>;

    /// Scan the whole document for constructs that can span lines
    /// (block comments, here-docs, fenced strings). Called only when the
    /// document or highlighter changes, never per frame.
    fn highlight_blocks(&self, text: &str) -> Vec<HighlighterToken>;
}
