//! Wildcard (glob) strategy.
//!
//! The pattern is translated to a regular expression and matched in
//! multiline mode, so `*` never crosses a line boundary. Translation
//! rules:
//!
//! - `?` — any single character
//! - `*` — any run of characters (greedy, within a line)
//! - `#` — a single digit
//! - `[...]` — character class passed through verbatim; a leading `[!`
//!   becomes a negated class `[^`
//! - anything else is escaped literally
//!
//! After each match, trailing line terminators are trimmed from the
//! reported span; the scan advances past the trimmed span and always by
//! at least one character, so zero-width matches cannot loop. The
//! `regex` crate guarantees linear-time matching, which bounds
//! pathological user patterns without changing match results.

use regex::{Regex, RegexBuilder};

use crate::error::SearchError;
use crate::primitives::word_boundary::is_whole_word;
use crate::search::occurrence::Occurrence;
use crate::search::{fragment_at, LineCounter, SearchOption, SearchOptions, TextSearcher};

#[derive(Debug, Default)]
pub struct WildcardSearcher {
    options: SearchOptions,
}

impl WildcardSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        RegexBuilder::new(&translate(pattern))
            .multi_line(true)
            .case_insensitive(!self.options.case_sensitive())
            .build()
    }
}

/// Translate a wildcard pattern to a regular expression.
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '?' => out.push('.'),
            '*' => out.push_str(".*"),
            '#' => out.push_str("[0-9]"),
            '[' => {
                out.push('[');
                if chars.peek() == Some(&'!') {
                    chars.next();
                    out.push('^');
                }
                // Class body passes through verbatim up to and including
                // the closing bracket; an unterminated class is left
                // as-is and rejected by the regex compiler.
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == ']' {
                        break;
                    }
                }
            }
            _ => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
            }
        }
    }
    out
}

impl TextSearcher for WildcardSearcher {
    fn is_valid_query(&self, query: &str) -> bool {
        self.compile(query).is_ok()
    }

    fn search<'t>(
        &'t self,
        text: &'t str,
        query: &str,
    ) -> Result<Box<dyn Iterator<Item = Occurrence> + 't>, SearchError> {
        let regex = self
            .compile(query)
            .map_err(|err| SearchError::InvalidQuery {
                query: query.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Box::new(WildcardMatches {
            text,
            regex,
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

struct WildcardMatches<'t> {
    text: &'t str,
    regex: Regex,
    word_wise: bool,
    pos: usize,
    counter: LineCounter,
}

impl Iterator for WildcardMatches<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        loop {
            if self.pos > self.text.len() {
                return None;
            }
            let found = self.regex.find_at(self.text, self.pos)?;
            let start = found.start();
            let mut end = found.end();
            // Trim trailing line terminators from the reported span.
            while end > start && matches!(self.text.as_bytes()[end - 1], b'\n' | b'\r') {
                end -= 1;
            }
            if end == start {
                // Zero-length after trimming: skip, forcing progress by
                // one character.
                match self.text[start..].chars().next() {
                    Some(ch) => self.pos = start + ch.len_utf8(),
                    None => return None,
                }
                continue;
            }
            // Advance past the trimmed match.
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
