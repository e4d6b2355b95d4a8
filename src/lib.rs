//! Incremental source-code search and viewing engine.
//!
//! The crate has two halves that share one coordinate vocabulary (byte
//! offsets, 0-based line/column positions):
//!
//! - [`search`]: pluggable text-matching strategies (literal, wildcard,
//!   query-engine bridge) that scan in-memory text and lazily produce
//!   ordered [`search::occurrence::Occurrence`]s.
//! - [`view`]: a large-document viewer model that keeps a line-offset
//!   table, per-line lazily computed shaping and highlighting caches, and
//!   answers render and hit-test queries in time proportional to the
//!   visible viewport, not the document.
//!
//! Everything is single-threaded and synchronous by contract: callers
//! serialize mutation and rendering on one logical thread, and occurrence
//! iterators are side-effect-free so they may be consumed anywhere as long
//! as the underlying text is not concurrently replaced.

pub mod error;
pub mod primitives;
pub mod search;
pub mod view;

pub use error::{QueryParseError, SearchError, ViewerError};
pub use primitives::line_table::{LineTable, TextPosition};
pub use search::occurrence::{FragmentLine, HitId, Occurrence, SearchHit, SearchHitSet};
pub use search::{SearchOption, SearchOptions, Searcher, TextSearcher};
pub use view::highlight::{Highlighter, HighlighterToken};
pub use view::shaping::{MonospaceShaper, ShapedLine, TextShaper};
pub use view::span_layer::{ColorSpan, ColorSpanLayer, LayerChanges};
pub use view::viewer::{LayerId, RenderFrame, TextHitInfo, TextViewerModel, ViewportSize};
