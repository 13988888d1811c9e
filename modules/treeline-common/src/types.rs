//! Shared data model for queries, crawl locations and ranked results.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use oxrdf::{Literal, Triple};

use crate::score::Score;

/// Expected literal values supplied by the query, indexed two ways.
/// The predicate index takes precedence over the datatype index when a
/// statement matches both.
#[derive(Debug, Clone, Default)]
pub struct ExpectedValues {
    /// Datatype IRI → expected literal strings.
    pub by_datatype: HashMap<String, Vec<String>>,
    /// Predicate IRI → expected literal strings.
    pub by_predicate: HashMap<String, Vec<String>>,
}

impl ExpectedValues {
    pub fn is_empty(&self) -> bool {
        self.by_datatype.values().all(Vec::is_empty)
            && self.by_predicate.values().all(Vec::is_empty)
    }
}

/// Relation-type IRI → literal values, accumulated along the path of
/// relations that led to a location.
pub type RelationValues = HashMap<String, Vec<Literal>>;

/// A crawlable URL plus the relation values inherited from the pages that
/// linked to it. Identity is the URL string.
#[derive(Debug, Clone)]
pub struct Location {
    pub url: String,
    pub values: RelationValues,
}

impl Location {
    pub fn bare(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            values: RelationValues::new(),
        }
    }
}

/// One ranked entity. Immutable once created; eviction from the top-N is
/// the only thing that ever happens to it.
#[derive(Debug, Clone)]
pub struct RankedSubject {
    pub subject: String,
    pub score: Score,
    /// The statements that contributed to the score.
    pub matching_statements: Vec<Triple>,
    /// Everything the page said about the subject.
    pub statements: Vec<Triple>,
}

/// Best first, ties broken by ascending subject IRI for determinism.
pub fn compare_ranked(a: &RankedSubject, b: &RankedSubject) -> Ordering {
    b.score
        .cmp_ranking(&a.score)
        .then_with(|| a.subject.cmp(&b.subject))
}

/// One snapshot of the crawl's progress. Replaced wholesale on every
/// processed page, so a caller holding an older snapshot never observes a
/// later mutation.
#[derive(Debug, Clone, Default)]
pub struct ResultSnapshot {
    /// Subjects already evaluated (dedup across pages).
    pub subjects: HashSet<String>,
    /// Every further location discovered so far, visited or not.
    pub known_locations: HashSet<String>,
    /// Current top-N, best first.
    pub ranked: Vec<RankedSubject>,
}
