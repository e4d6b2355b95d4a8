//! The text searcher family: a common capability trait, a small
//! enumerated option surface, and the closed set of strategies.
//!
//! All strategies scan an in-memory text and lazily produce
//! [`Occurrence`]s in ascending `(line, column)` order, never
//! overlapping within one scan. Queries are validated up front with
//! [`TextSearcher::is_valid_query`]; invoking [`TextSearcher::search`]
//! with an invalid query fails fast with
//! [`SearchError::InvalidQuery`].

pub mod literal;
pub mod occurrence;
pub mod query;
pub mod wildcard;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use occurrence::Occurrence;

pub use literal::LiteralSearcher;
pub use query::{ParsedQuery, QueryDocument, QueryEngine, QuerySearcher};
pub use wildcard::WildcardSearcher;

/// The option surface a strategy can expose. A closed set — strategies
/// advertise the subset they support via
/// [`TextSearcher::supported_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchOption {
    CaseSensitive,
    WordWise,
}

/// Option values with a revision counter.
///
/// The revision increases monotonically on every effective change; a
/// live-search consumer polls it to decide whether its current results
/// are stale and the scan must be re-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    case_sensitive: bool,
    word_wise: bool,
    #[serde(skip)]
    revision: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            word_wise: false,
            revision: 0,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, option: SearchOption) -> bool {
        match option {
            SearchOption::CaseSensitive => self.case_sensitive,
            SearchOption::WordWise => self.word_wise,
        }
    }

    pub fn set(&mut self, option: SearchOption, value: bool) {
        let slot = match option {
            SearchOption::CaseSensitive => &mut self.case_sensitive,
            SearchOption::WordWise => &mut self.word_wise,
        };
        if *slot != value {
            *slot = value;
            self.revision += 1;
            tracing::trace!(?option, value, revision = self.revision, "search option changed");
        }
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn word_wise(&self) -> bool {
        self.word_wise
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Capability contract shared by all searcher strategies.
pub trait TextSearcher {
    /// Strategy-specific syntax check. Never panics; used for live
    /// validation feedback while the user types.
    fn is_valid_query(&self, query: &str) -> bool;

    /// Scan `text` and lazily produce occurrences in ascending
    /// `(line, column)` order. Restartable: every call starts a fresh,
    /// side-effect-free scan. Fails fast with
    /// [`SearchError::InvalidQuery`] when the query does not validate.
    fn search<'t>(
        &'t self,
        text: &'t str,
        query: &str,
    ) -> Result<Box<dyn Iterator<Item = Occurrence> + 't>, SearchError>;

    /// The options this strategy honors.
    fn supported_options(&self) -> &'static [SearchOption];

    fn options(&self) -> &SearchOptions;

    fn options_mut(&mut self) -> &mut SearchOptions;
}

/// The closed set of searcher strategies.
#[derive(Debug)]
pub enum Searcher {
    Literal(LiteralSearcher),
    Wildcard(WildcardSearcher),
    Query(QuerySearcher),
}

impl Searcher {
    pub fn literal() -> Self {
        Self::Literal(LiteralSearcher::new())
    }

    pub fn wildcard() -> Self {
        Self::Wildcard(WildcardSearcher::new())
    }

    pub fn query(engine: std::rc::Rc<dyn QueryEngine>) -> Self {
        Self::Query(QuerySearcher::new(engine))
    }
}

impl TextSearcher for Searcher {
    fn is_valid_query(&self, query: &str) -> bool {
        match self {
            Self::Literal(s) => s.is_valid_query(query),
            Self::Wildcard(s) => s.is_valid_query(query),
            Self::Query(s) => s.is_valid_query(query),
        }
    }

    fn search<'t>(
        &'t self,
        text: &'t str,
        query: &str,
    ) -> Result<Box<dyn Iterator<Item = Occurrence> + 't>, SearchError> {
        match self {
            Self::Literal(s) => s.search(text, query),
            Self::Wildcard(s) => s.search(text, query),
            Self::Query(s) => s.search(text, query),
        }
    }

    fn supported_options(&self) -> &'static [SearchOption] {
        match self {
            Self::Literal(s) => s.supported_options(),
            Self::Wildcard(s) => s.supported_options(),
            Self::Query(s) => s.supported_options(),
        }
    }

    fn options(&self) -> &SearchOptions {
        match self {
            Self::Literal(s) => s.options(),
            Self::Wildcard(s) => s.options(),
            Self::Query(s) => s.options(),
        }
    }

    fn options_mut(&mut self) -> &mut SearchOptions {
        match self {
            Self::Literal(s) => s.options_mut(),
            Self::Wildcard(s) => s.options_mut(),
            Self::Query(s) => s.options_mut(),
        }
    }
}

/// Running line counter shared by the scanning strategies.
///
/// Matches arrive left-to-right, so the line number of each match is the
/// previous one plus the breaks between the two match starts; the scan
/// never re-reads text behind the last counted offset.
#[derive(Debug, Clone, Default)]
pub(crate) struct LineCounter {
    line: usize,
    line_start: usize,
    scan_from: usize,
}

impl LineCounter {
    /// Advance to `offset` (monotonically non-decreasing across calls)
    /// and return the line index and line start offset containing it.
    pub(crate) fn advance_to(&mut self, text: &str, offset: usize) -> (usize, usize) {
        debug_assert!(offset >= self.scan_from);
        let (breaks, last_start) =
            crate::primitives::line_table::count_line_breaks(text, self.scan_from..offset);
        self.line += breaks;
        if let Some(start) = last_start {
            self.line_start = start;
        }
        self.scan_from = offset;
        (self.line, self.line_start)
    }
}

/// The matched line as occurrence context: from `line_start` to the next
/// terminator, terminator excluded.
pub(crate) fn fragment_at(text: &str, line_start: usize, line: usize) -> occurrence::FragmentLine {
    let rest = &text[line_start..];
    let end = memchr::memchr2(b'\n', b'\r', rest.as_bytes()).unwrap_or(rest.len());
    occurrence::FragmentLine {
        text: rest[..end].to_string(),
        line,
    }
}
