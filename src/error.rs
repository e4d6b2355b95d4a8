//! Typed errors for the search and viewer surfaces.
//!
//! Data-shaped failures (a query that does not parse, an offset past the
//! end of the document) are recovered locally by the components: queries
//! are gated through `is_valid_query`, positions are clamped or reported
//! as `None`. The errors here signal caller bugs — invoking `search` with
//! a query that was never validated, or driving the viewer before any
//! document was loaded.

use thiserror::Error;

/// Errors from the search strategy family.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// `search` was invoked with a query that fails the strategy's
    /// syntax validation. Callers are expected to gate on
    /// `is_valid_query` first.
    #[error("invalid search query `{query}`: {reason}")]
    InvalidQuery { query: String, reason: String },
}

/// Errors from the viewer model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViewerError {
    /// An operation that needs a document was called before `set_text`.
    #[error("no document loaded; call set_text first")]
    NoDocument,
}

/// Failure reported by a [`crate::search::query::QueryEngine`] when a
/// query string does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("query parse error: {0}")]
pub struct QueryParseError(pub String);
