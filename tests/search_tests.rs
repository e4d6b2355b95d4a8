//! Behavior tests for the searcher strategies through the public API.

use std::rc::Rc;

use srclens::search::query::{ParsedQuery, QueryDocument, QueryEngine};
use srclens::{
    Occurrence, QueryParseError, SearchError, SearchHitSet, SearchOption, SearchOptions,
    Searcher, TextSearcher,
};

fn collect(searcher: &Searcher, text: &str, query: &str) -> Vec<Occurrence> {
    searcher.search(text, query).unwrap().collect()
}

#[test]
fn literal_finds_all_occurrences_in_order() {
    let searcher = Searcher::literal();
    let occs = collect(&searcher, "the cat sat on the mat", "at");
    assert_eq!(occs.len(), 3);
    let positions: Vec<(usize, usize)> = occs.iter().map(|o| (o.line, o.column)).collect();
    assert_eq!(positions, vec![(0, 5), (0, 9), (0, 20)]);
    for pair in occs.windows(2) {
        assert!(pair[0].position() < pair[1].position());
    }
}

#[test]
fn literal_scan_is_restartable() {
    let searcher = Searcher::literal();
    let first = collect(&searcher, "aba aba", "aba");
    let second = collect(&searcher, "aba aba", "aba");
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn literal_word_wise_filters_substrings() {
    let mut searcher = Searcher::literal();
    searcher.options_mut().set(SearchOption::WordWise, true);
    let occs = collect(&searcher, "cats category cat", "cat");
    assert_eq!(occs.len(), 1);
    assert_eq!(occs[0].column, 14);
}

#[test]
fn literal_case_insensitive_reports_original_text() {
    let mut searcher = Searcher::literal();
    searcher
        .options_mut()
        .set(SearchOption::CaseSensitive, false);
    let occs = collect(&searcher, "Cat cat CAT", "cat");
    let texts: Vec<&str> = occs.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(texts, vec!["Cat", "cat", "CAT"]);
}

#[test]
fn occurrence_fragment_is_the_matched_line() {
    let searcher = Searcher::literal();
    let occs = collect(&searcher, "first\nsecond match\r\nthird", "match");
    assert_eq!(occs.len(), 1);
    assert_eq!(occs[0].line, 1);
    assert_eq!(occs[0].fragment.len(), 1);
    assert_eq!(occs[0].fragment[0].text, "second match");
    assert_eq!(occs[0].fragment[0].line, 1);
}

#[test]
fn wildcard_matches_glob_patterns() {
    let searcher = Searcher::wildcard();
    let texts: Vec<String> = collect(&searcher, "log1.txt log22.txt notes.md", "log#.txt")
        .into_iter()
        .map(|o| o.text)
        .collect();
    assert_eq!(texts, vec!["log1.txt"]);
}

#[test]
fn wildcard_rejects_bad_class_before_scanning() {
    let searcher = Searcher::wildcard();
    assert!(!searcher.is_valid_query("[oops"));
    match searcher.search("text", "[oops") {
        Err(SearchError::InvalidQuery { query, .. }) => assert_eq!(query, "[oops"),
        Ok(_) => panic!("expected InvalidQuery"),
    };
}

#[test]
fn wildcard_star_never_spans_lines() {
    let searcher = Searcher::wildcard();
    let occs = collect(&searcher, "start\nmiddle\nend", "s*");
    // One match per line beginning with an 's'; '*' stops at the break.
    let texts: Vec<String> = occs.into_iter().map(|o| o.text).collect();
    assert_eq!(texts, vec!["start"]);
}

#[test]
fn options_revision_signals_staleness() {
    let mut searcher = Searcher::wildcard();
    let seen = searcher.options().revision();
    searcher
        .options_mut()
        .set(SearchOption::CaseSensitive, false);
    assert!(searcher.options().revision() > seen);
    // Setting the same value again is not a change.
    let seen = searcher.options().revision();
    searcher
        .options_mut()
        .set(SearchOption::CaseSensitive, false);
    assert_eq!(searcher.options().revision(), seen);
}

#[test]
fn hit_set_links_occurrences_to_hits() {
    let mut hits = SearchHitSet::new();
    let id = hits.insert("src/main.rs");
    let searcher = Searcher::literal();
    let occs: Vec<Occurrence> = collect(&searcher, "fn a\nfn b", "fn")
        .into_iter()
        .map(|occ| {
            hits.record_occurrence(id);
            Occurrence {
                hit: Some(id),
                ..occ
            }
        })
        .collect();
    assert_eq!(occs.len(), 2);
    let hit = hits.get(id).unwrap();
    assert_eq!(hit.label, "src/main.rs");
    assert_eq!(hit.occurrence_count, 2);
    assert!(occs.iter().all(|o| o.hit == Some(id)));
}

/// Engine that understands `field:value` queries over path and tags.
struct FieldEngine;

enum FieldQuery {
    Path(String),
    Tag(String),
}

impl QueryEngine for FieldEngine {
    fn parse(&self, query: &str, _options: &SearchOptions) -> Result<ParsedQuery, QueryParseError> {
        match query.split_once(':') {
            Some(("path", value)) => Ok(ParsedQuery::new(FieldQuery::Path(value.to_string()))),
            Some(("tag", value)) => Ok(ParsedQuery::new(FieldQuery::Tag(value.to_string()))),
            _ => Err(QueryParseError(format!("unknown field in `{query}`"))),
        }
    }

    fn occurrences(&self, query: &ParsedQuery, document: &QueryDocument<'_>) -> Vec<Occurrence> {
        let matched = match query.downcast_ref::<FieldQuery>() {
            Some(FieldQuery::Path(p)) => document.path == Some(p.as_str()),
            Some(FieldQuery::Tag(t)) => document.tags.contains(t),
            None => false,
        };
        if matched {
            vec![Occurrence {
                text: document.content.lines().next().unwrap_or("").to_string(),
                line: 0,
                column: 0,
                fragment: Vec::new(),
                hit: None,
            }]
        } else {
            Vec::new()
        }
    }
}

#[test]
fn query_strategy_delegates_to_the_engine() {
    let searcher = Searcher::query(Rc::new(FieldEngine));
    assert!(searcher.is_valid_query("path:src/lib.rs"));
    assert!(searcher.is_valid_query("tag:todo"));
    assert!(!searcher.is_valid_query("plain words"));
    // The bundled document only carries content, so a path query finds
    // nothing.
    let occs: Vec<Occurrence> = searcher
        .search("fn main() {}", "path:src/lib.rs")
        .unwrap()
        .collect();
    assert!(occs.is_empty());
    assert_eq!(
        searcher.supported_options(),
        &[SearchOption::CaseSensitive]
    );
}
