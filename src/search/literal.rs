//! Literal substring strategy.
//!
//! Repeated substring find advancing from the end of the previous match,
//! with the line number carried incrementally between matches. Case
//! folding is per-char ASCII lowercase: it preserves byte lengths, so
//! offsets computed on the folded text are valid in the original
//! (full Unicode folding can change byte lengths and skew columns).

use std::borrow::Cow;

use crate::error::SearchError;
use crate::primitives::word_boundary::is_whole_word;
use crate::search::occurrence::Occurrence;
use crate::search::{fragment_at, LineCounter, SearchOption, SearchOptions, TextSearcher};

#[derive(Debug, Default)]
pub struct LiteralSearcher {
    options: SearchOptions,
}

impl LiteralSearcher {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ascii_fold(s: &str) -> String {
    s.chars().map(|ch| ch.to_ascii_lowercase()).collect()
}

impl TextSearcher for LiteralSearcher {
    /// Literal queries have no syntax to violate; only the empty query
    /// is rejected, since it can never match anything.
    fn is_valid_query(&self, query: &str) -> bool {
        !query.is_empty()
    }

    fn search<'t>(
        &'t self,
        text: &'t str,
        query: &str,
    ) -> Result<Box<dyn Iterator<Item = Occurrence> + 't>, SearchError> {
        if query.is_empty() {
            return Err(SearchError::InvalidQuery {
                query: String::new(),
                reason: "empty query".to_string(),
            });
        }
        let case_sensitive = self.options.case_sensitive();
        let (haystack, needle) = if case_sensitive {
            (Cow::Borrowed(text), query.to_string())
        } else {
            (Cow::Owned(ascii_fold(text)), ascii_fold(query))
        };
        Ok(Box::new(LiteralMatches {
            text,
            haystack,
            needle,
            word_wise: self.options.word_wise(),
            pos: 0,
            counter: LineCounter::default(),
        }))
    }

    fn supported_options(&self) -> &'static [SearchOption] {
        &[SearchOption::CaseSensitive, SearchOption::WordWise]
    }

    fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut SearchOptions {
        &mut self.options
    }
}

struct LiteralMatches<'t> {
    /// The original text; occurrences report slices of this.
    text: &'t str,
    /// The text actually scanned (folded when case-insensitive; same
    /// byte layout as `text`).
    haystack: Cow<'t, str>,
    needle: String,
    word_wise: bool,
    pos: usize,
    counter: LineCounter,
}

impl Iterator for LiteralMatches<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        loop {
            let rel = self.haystack[self.pos..].find(&self.needle)?;
            let start = self.pos + rel;
            let end = start + self.needle.len();
            // Occurrences within one scan never overlap.
            self.pos = end;
            if self.word_wise && !is_whole_word(self.text, start, end) {
                continue;
            }
            let (line, line_start) = self.counter.advance_to(self.text, start);
            return Some(Occurrence {
                text: self.text[start..end].to_string(),
                line,
                column: start - line_start,
                fragment: vec![fragment_at(self.text, line_start, line)],
                hit: None,
            });
        }
    }
}
