// Trait abstractions for the scoring and normalization collaborators.
//
// The crawler only ever talks to these traits; the strategies in this crate
// are the stock implementations, and tests plug in their own.

use async_trait::async_trait;
use oxrdf::Triple;

use treeline_common::types::RelationValues;
use treeline_common::{Score, TreelineError};

use crate::request::ScoreRequest;

/// Scores one statement against the query's expected values.
///
/// `None` means this scorer cannot judge the statement;
/// `f64::NEG_INFINITY` means the statement is disqualifying.
#[async_trait]
pub trait StatementScorer: Send + Sync {
    /// Cheap applicability check, evaluated before `score`.
    fn suitable(&self, request: &ScoreRequest<'_>) -> bool;

    async fn score(&self, request: &ScoreRequest<'_>) -> Result<Option<f64>, TreelineError>;
}

/// Scores a location's accumulated relation values against the expected
/// relation values. Drives the crawl frontier's ordering.
#[async_trait]
pub trait RelationScorer: Send + Sync {
    async fn score(
        &self,
        values: &RelationValues,
        expected: &RelationValues,
    ) -> Result<Score, TreelineError>;
}

/// Turns a literal into comparable tokens. Failure means "not normalizable";
/// callers fall back to the raw value.
#[async_trait]
pub trait LiteralNormalizer: Send + Sync {
    async fn normalize(&self, statement: &Triple) -> Result<Vec<String>, TreelineError>;

    /// Normalize raw query input the same way page literals are normalized.
    async fn normalize_raw(&self, value: &str) -> Result<Vec<String>, TreelineError>;
}
