//! The occurrence value type and the search-hit arena.

use crate::primitives::line_table::TextPosition;

/// One line of surrounding context for an occurrence, terminator
/// stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentLine {
    pub text: String,
    pub line: usize,
}

/// A single match of a search query within a text. Immutable after
/// creation; line and column are 0-based (presentation adds 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// The matched text.
    pub text: String,
    /// 0-based line of the match start.
    pub line: usize,
    /// 0-based byte column of the match start within its line.
    pub column: usize,
    /// Surrounding context, ordered by line index.
    pub fragment: Vec<FragmentLine>,
    /// Back-reference into a [`SearchHitSet`], when the occurrence was
    /// produced on behalf of a grouped hit (e.g. a file result).
    pub hit: Option<HitId>,
}

impl Occurrence {
    pub fn position(&self) -> TextPosition {
        TextPosition::new(self.line, self.column)
    }
}

/// Index into a [`SearchHitSet`]. Stable for the lifetime of the set;
/// hits are never removed individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitId(usize);

/// A grouped search result an occurrence can point back to, e.g. one
/// searched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub label: String,
    pub occurrence_count: usize,
}

/// Dense arena of [`SearchHit`]s addressed by [`HitId`]. Replaces object
/// back-references so occurrences stay plain values.
#[derive(Debug, Clone, Default)]
pub struct SearchHitSet {
    hits: Vec<SearchHit>,
}

impl SearchHitSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>) -> HitId {
        self.hits.push(SearchHit {
            label: label.into(),
            occurrence_count: 0,
        });
        HitId(self.hits.len() - 1)
    }

    pub fn get(&self, id: HitId) -> Option<&SearchHit> {
        self.hits.get(id.0)
    }

    /// Bump the occurrence count of a hit as its occurrences stream in.
    pub fn record_occurrence(&mut self, id: HitId) {
        if let Some(hit) = self.hits.get_mut(id.0) {
            hit.occurrence_count += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HitId, &SearchHit)> {
        self.hits.iter().enumerate().map(|(i, h)| (HitId(i), h))
    }
}
