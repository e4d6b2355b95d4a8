//! Bridge to an external query engine.
//!
//! The crate does not implement a structured query language itself; an
//! embedder injects a [`QueryEngine`] and this strategy adapts it to the
//! [`TextSearcher`] contract. The engine owns parsing and evaluation;
//! the bridge owns option plumbing, validation, and occurrence ordering.

use std::any::Any;
use std::rc::Rc;

use crate::error::{QueryParseError, SearchError};
use crate::search::occurrence::Occurrence;
use crate::search::{SearchOption, SearchOptions, TextSearcher};

/// An opaque parsed query produced by a [`QueryEngine`].
///
/// The representation belongs entirely to the engine that produced it;
/// the bridge only carries it between `parse` and `occurrences`.
pub struct ParsedQuery {
    repr: Box<dyn Any>,
}

impl ParsedQuery {
    pub fn new<T: Any>(repr: T) -> Self {
        Self {
            repr: Box::new(repr),
        }
    }

    /// Downcast back to the engine's concrete representation.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.repr.downcast_ref()
    }
}

impl std::fmt::Debug for ParsedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedQuery").finish_non_exhaustive()
    }
}

/// The searchable fields of a document handed to the engine. `content`
/// carries the text body; `path` and `tags` let the engine answer
/// field-scoped queries.
#[derive(Debug, Clone, Default)]
pub struct QueryDocument<'t> {
    pub content: &'t str,
    pub path: Option<&'t str>,
    pub tags: &'t [String],
}

impl<'t> QueryDocument<'t> {
    pub fn from_content(content: &'t str) -> Self {
        Self {
            content,
            path: None,
            tags: &[],
        }
    }
}

/// External query engine collaborator.
pub trait QueryEngine {
    /// Parse a query string, honoring the given options.
    fn parse(&self, query: &str, options: &SearchOptions) -> Result<ParsedQuery, QueryParseError>;

    /// Evaluate a parsed query against a document. Occurrences must be
    /// in ascending `(line, column)` order over the content field.
    fn occurrences(&self, query: &ParsedQuery, document: &QueryDocument<'_>) -> Vec<Occurrence>;
}

pub struct QuerySearcher {
    engine: Rc<dyn QueryEngine>,
    options: SearchOptions,
}

impl QuerySearcher {
    pub fn new(engine: Rc<dyn QueryEngine>) -> Self {
        Self {
            engine,
            options: SearchOptions::default(),
        }
    }
}

impl std::fmt::Debug for QuerySearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySearcher")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl TextSearcher for QuerySearcher {
    fn is_valid_query(&self, query: &str) -> bool {
        self.engine.parse(query, &self.options).is_ok()
    }

    fn search<'t>(
        &'t self,
        text: &'t str,
        query: &str,
    ) -> Result<Box<dyn Iterator<Item = Occurrence> + 't>, SearchError> {
        let parsed = self
            .engine
            .parse(query, &self.options)
            .map_err(|err| SearchError::InvalidQuery {
                query: query.to_string(),
                reason: err.0,
            })?;
        let document = QueryDocument::from_content(text);
        let occurrences = self.engine.occurrences(&parsed, &document);
        Ok(Box::new(occurrences.into_iter()))
    }

    fn supported_options(&self) -> &'static [SearchOption] {
        &[SearchOption::CaseSensitive]
    }

    fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut SearchOptions {
        &mut self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::fragment_at;
    use crate::search::LineCounter;

    /// Minimal engine: a query is a bare word, evaluated as a
    /// case-sensitivity-aware substring scan of the content field.
    struct WordEngine;

    impl QueryEngine for WordEngine {
        fn parse(
            &self,
            query: &str,
            options: &SearchOptions,
        ) -> Result<ParsedQuery, QueryParseError> {
            if query.is_empty() || query.contains(char::is_whitespace) {
                return Err(QueryParseError("expected a single word".to_string()));
            }
            let needle = if options.case_sensitive() {
                query.to_string()
            } else {
                query.to_ascii_lowercase()
            };
            Ok(ParsedQuery::new(needle))
        }

        fn occurrences(&self, query: &ParsedQuery, document: &QueryDocument<'_>) -> Vec<Occurrence> {
            let needle: &String = query.downcast_ref().unwrap();
            let text = document.content;
            let mut counter = LineCounter::default();
            let mut out = Vec::new();
            let mut pos = 0;
            while let Some(rel) = text[pos..].find(needle.as_str()) {
                let start = pos + rel;
                pos = start + needle.len();
                let (line, line_start) = counter.advance_to(text, start);
                out.push(Occurrence {
                    text: needle.clone(),
                    line,
                    column: start - line_start,
                    fragment: vec![fragment_at(text, line_start, line)],
                    hit: None,
                });
            }
            out
        }
    }

    #[test]
    fn test_validity_follows_parse() {
        let searcher = QuerySearcher::new(Rc::new(WordEngine));
        assert!(searcher.is_valid_query("fn"));
        assert!(!searcher.is_valid_query(""));
        assert!(!searcher.is_valid_query("two words"));
    }

    #[test]
    fn test_parse_failure_maps_to_invalid_query() {
        let searcher = QuerySearcher::new(Rc::new(WordEngine));
        match searcher.search("text", "two words") {
            Err(SearchError::InvalidQuery { query, reason }) => {
                assert_eq!(query, "two words");
                assert_eq!(reason, "expected a single word");
            }
            Ok(_) => panic!("expected InvalidQuery"),
        };
    }

    #[test]
    fn test_occurrences_come_from_engine() {
        let searcher = QuerySearcher::new(Rc::new(WordEngine));
        let occs: Vec<Occurrence> = searcher
            .search("fn main\nfn test", "fn")
            .unwrap()
            .collect();
        assert_eq!(occs.len(), 2);
        assert_eq!((occs[0].line, occs[0].column), (0, 0));
        assert_eq!((occs[1].line, occs[1].column), (1, 0));
        assert_eq!(occs[1].fragment[0].text, "fn test");
    }

    #[test]
    fn test_only_case_sensitivity_supported() {
        let searcher = QuerySearcher::new(Rc::new(WordEngine));
        assert_eq!(
            searcher.supported_options(),
            &[SearchOption::CaseSensitive]
        );
    }
}
