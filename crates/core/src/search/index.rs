//! Candidate selection for search queries.
//!
//! An index only narrows which documents get scanned. Every candidate is
//! still checked against its full text, so `Scan` and `Terms` return the
//! same hits.

use std::collections::{BTreeMap, BTreeSet};

use crate::PolicyRef;
use crate::config::IndexMode;

/// Search index selected at startup.
#[derive(Debug)]
pub enum Index {
    /// No in-memory state; every query scans the whole cache.
    Scan,
    /// Inverted index of folded alphanumeric terms.
    Terms(TermIndex),
}

impl Index {
    pub fn new(mode: IndexMode) -> Self {
        match mode {
            IndexMode::Scan => Index::Scan,
            IndexMode::Terms => Index::Terms(TermIndex::default()),
        }
    }

    pub fn mode(&self) -> IndexMode {
        match self {
            Index::Scan => IndexMode::Scan,
            Index::Terms(_) => IndexMode::Terms,
        }
    }

    pub fn add(&mut self, reference: &PolicyRef, text: &str) {
        if let Index::Terms(terms) = self {
            terms.add(reference, text);
        }
    }

    pub fn remove(&mut self, reference: &PolicyRef) {
        if let Index::Terms(terms) = self {
            terms.remove(reference);
        }
    }

    pub fn remove_category(&mut self, category: &str) {
        if let Index::Terms(terms) = self {
            terms.remove_where(|r| r.category == category);
        }
    }

    pub fn clear(&mut self) {
        if let Index::Terms(terms) = self {
            *terms = TermIndex::default();
        }
    }

    /// References that may contain `query`, or `None` when every document must be scanned.
    pub fn query(&self, query: &str) -> Option<BTreeSet<PolicyRef>> {
        match self {
            Index::Scan => None,
            Index::Terms(terms) => terms.query(query),
        }
    }
}

/// Inverted index: folded term to the references containing it.
#[derive(Debug, Default)]
pub struct TermIndex {
    postings: BTreeMap<String, BTreeSet<PolicyRef>>,
}

/// Maximal alphanumeric runs of the lowercased text.
///
/// Lowercasing is per character so a query run and the same run inside a
/// longer word always fold alike.
fn terms(text: &str) -> Vec<String> {
    text.chars()
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl TermIndex {
    /// Index `text` under `reference`, replacing anything indexed for it before.
    pub fn add(&mut self, reference: &PolicyRef, text: &str) {
        self.remove(reference);
        for term in terms(text) {
            self.postings.entry(term).or_default().insert(reference.clone());
        }
    }

    pub fn remove(&mut self, reference: &PolicyRef) {
        self.remove_where(|r| r == reference);
    }

    fn remove_where(&mut self, pred: impl Fn(&PolicyRef) -> bool) {
        self.postings.retain(|_, refs| {
            refs.retain(|r| !pred(r));
            !refs.is_empty()
        });
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Candidate references for a substring query.
    ///
    /// Each alphanumeric run of the query must appear inside some indexed
    /// term of a matching document (query runs at the edges may be partial
    /// words), so the intersection over runs is a superset of the true hits.
    /// Returns `None` when the query has no alphanumeric run to narrow by.
    pub fn query(&self, query: &str) -> Option<BTreeSet<PolicyRef>> {
        let mut candidates: Option<BTreeSet<PolicyRef>> = None;

        for part in terms(query) {
            let refs: BTreeSet<PolicyRef> = self
                .postings
                .iter()
                .filter(|(term, _)| term.contains(part.as_str()))
                .flat_map(|(_, refs)| refs.iter().cloned())
                .collect();

            let narrowed = match candidates {
                None => refs,
                Some(acc) => acc.intersection(&refs).cloned().collect(),
            };
            let done = narrowed.is_empty();
            candidates = Some(narrowed);
            if done {
                break;
            }
        }

        candidates
    }
}
