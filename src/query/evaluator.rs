use crate::index::store::StoreHandle;
use crate::index::types::{display_order, Record};
use crate::query::mode::{normalize_query, QueryState, SearchMode};
use crate::utils::query_terms;
use memchr::memmem;
use roaring::RoaringBitmap;

/// Below this many characters a substring query matches everything
pub const SUBSTRING_MIN_LEN: usize = 3;

/// Set of record ids satisfying a query. Unordered.
pub type MatchSet = RoaringBitmap;

/// Evaluates queries against a loaded archive
pub struct QueryEvaluator<'a> {
    store: &'a StoreHandle,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(store: &'a StoreHandle) -> Self {
        Self { store }
    }

    pub fn evaluate_state(&self, state: &QueryState) -> MatchSet {
        self.evaluate(&state.text, state.mode)
    }

    /// Return the ids of every record matching `query` under `mode`.
    ///
    /// An empty query matches every record in either mode. The result is
    /// always a subset of the store's id universe.
    pub fn evaluate(&self, query: &str, mode: SearchMode) -> MatchSet {
        let query = normalize_query(query);
        if query.is_empty() {
            return self.match_all();
        }

        let matched = match mode {
            SearchMode::Token => self.evaluate_tokens(&query),
            SearchMode::Substring => self.evaluate_substring(&query),
        };

        tracing::trace!(query = %query, ?mode, matched = matched.len(), "evaluated query");
        matched
    }

    fn match_all(&self) -> MatchSet {
        self.store.ids().clone()
    }

    fn evaluate_tokens(&self, query: &str) -> MatchSet {
        let terms = query_terms(query);
        if terms.is_empty() {
            return self.match_all();
        }

        // An unseen term contributes an empty set, so the AND is empty
        let mut postings = Vec::with_capacity(terms.len());
        for term in terms {
            match self.store.postings(term) {
                Some(p) => postings.push(p),
                None => return MatchSet::new(),
            }
        }

        // Smallest first keeps the running intersection small
        postings.sort_by_key(|p| p.len());

        let mut result = self.store.ids() & postings[0];
        for p in &postings[1..] {
            if result.is_empty() {
                break;
            }
            result &= *p;
        }
        result
    }

    fn evaluate_substring(&self, query: &str) -> MatchSet {
        if query.chars().count() < SUBSTRING_MIN_LEN {
            return self.match_all();
        }

        let finder = memmem::Finder::new(query.as_bytes());
        self.store
            .full_text_entries()
            .filter(|(id, blob)| self.store.contains(*id) && finder.find(blob.as_bytes()).is_some())
            .map(|(id, _)| id)
            .collect()
    }
}

/// Resolve a match set into records in list display order
pub fn sorted_matches<'s>(store: &'s StoreHandle, matches: &MatchSet) -> Vec<&'s Record> {
    let mut records: Vec<&Record> = matches.iter().filter_map(|id| store.get(id)).collect();
    records.sort_by(|a, b| display_order(a, b));
    records
}
