//! Turns one fetched page into ranked subjects and newly discovered
//! locations, and folds page outcomes into the running result.

use std::collections::HashSet;
use std::sync::Arc;

use oxrdf::{Graph, Subject, Term, Triple};
use tracing::{debug, warn};

use treeline_common::types::{ExpectedValues, Location, RankedSubject, ResultSnapshot};
use treeline_common::{compare_ranked, Score, TreelineError};
use treeline_score::{LiteralNormalizer, ScoreRequest, ScorerSequence};

use crate::metadata::{group_by_subject, subject_key, PageMetadata};
use crate::path::{evaluate_path, RelationPath};

/// Everything one worker produced for one page. Handed back to the
/// coordinator by value; workers share nothing.
#[derive(Debug)]
pub struct PageOutcome {
    pub url: String,
    /// Subjects that ranked on this page.
    pub ranked: Vec<RankedSubject>,
    /// Every subject evaluated on this page, ranked or not.
    pub evaluated: Vec<String>,
    pub discovered: Vec<Location>,
    /// Path declaration found on this page, when none was cached yet.
    pub relation_path: Option<RelationPath>,
}

impl PageOutcome {
    /// Outcome for a page that could not be processed.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ranked: Vec::new(),
            evaluated: Vec::new(),
            discovered: Vec::new(),
            relation_path: None,
        }
    }
}

pub struct PageProcessor {
    scorers: Arc<ScorerSequence>,
    normalizer: Arc<dyn LiteralNormalizer>,
    expected: Arc<ExpectedValues>,
}

impl PageProcessor {
    pub fn new(
        scorers: Arc<ScorerSequence>,
        normalizer: Arc<dyn LiteralNormalizer>,
        expected: Arc<ExpectedValues>,
    ) -> Self {
        Self {
            scorers,
            normalizer,
            expected,
        }
    }

    /// Scores every subject on the page that has not been evaluated before.
    /// Returns the subjects that ranked plus every subject key touched.
    pub async fn score_subjects(
        &self,
        metadata: &PageMetadata,
        relation_path: Option<&RelationPath>,
        already_evaluated: &HashSet<String>,
    ) -> Result<(Vec<RankedSubject>, Vec<String>), TreelineError> {
        let mut data_graph = Graph::new();
        for statement in &metadata.data {
            data_graph.insert(statement);
        }

        let mut ranked = Vec::new();
        let mut evaluated = Vec::new();

        for (subject, statements) in group_by_subject(&metadata.data) {
            let key = subject_key(&subject);
            if already_evaluated.contains(&key) {
                continue;
            }
            evaluated.push(key.clone());

            let candidates = self.candidate_statements(
                &data_graph,
                metadata,
                relation_path,
                &subject,
                &statements,
            );

            let mut subject_score: Option<Score> = None;
            let mut matching = Vec::new();
            for statement in candidates {
                let Some(statement_score) = self.score_statement(&statement).await? else {
                    continue;
                };
                match &mut subject_score {
                    None => subject_score = Some(statement_score),
                    Some(score) => score.merge(&statement_score),
                }
                matching.push(statement);
            }

            let Some(score) = subject_score else { continue };
            if !score.is_fully_known() || score.is_disqualified() {
                continue;
            }

            debug!(subject = %key, score = ?score.dims(), "Subject ranked");
            ranked.push(RankedSubject {
                subject: key,
                score,
                matching_statements: matching,
                statements,
            });
        }

        Ok((ranked, evaluated))
    }

    /// Which of the subject's statements are worth scoring. With a cached
    /// path declaration the path decides; without one (or when evaluation
    /// fails) any statement the query's predicate or datatype index covers.
    fn candidate_statements(
        &self,
        data_graph: &Graph,
        metadata: &PageMetadata,
        relation_path: Option<&RelationPath>,
        subject: &Subject,
        statements: &[Triple],
    ) -> Vec<Triple> {
        if let Some(path) = relation_path {
            match evaluate_path(data_graph, &path.shape, subject, Some(&path.entry)) {
                Ok(terms) => return statements_for_terms(metadata, subject, &terms),
                Err(error) => {
                    warn!(url = %metadata.url, subject = %subject_key(subject), %error,
                        "Path evaluation failed, falling back to predicate matching");
                }
            }
        }

        statements
            .iter()
            .filter(|s| self.matches_expectations(s))
            .cloned()
            .collect()
    }

    fn matches_expectations(&self, statement: &Triple) -> bool {
        if self
            .expected
            .by_predicate
            .get(statement.predicate.as_str())
            .is_some_and(|values| !values.is_empty())
        {
            return true;
        }
        match &statement.object {
            Term::Literal(literal) => self
                .expected
                .by_datatype
                .contains_key(literal.datatype().as_str()),
            _ => false,
        }
    }

    /// One statement's score vector, or `None` when the statement should
    /// not contribute: every scorer abstained, or one disqualified it.
    async fn score_statement(&self, statement: &Triple) -> Result<Option<Score>, TreelineError> {
        let mut request = ScoreRequest::new(statement, &self.expected);
        match self.normalizer.normalize(statement).await {
            Ok(tokens) => request = request.with_normalized(tokens),
            // Not normalizable; scorers see the raw value
            Err(_) => {}
        }

        let score: Score = self.scorers.score(&request).await?.into();
        if score.has_invalid_dimension() {
            return Err(TreelineError::Score(format!(
                "scorer produced NaN for statement {statement}"
            )));
        }
        if score.dims().iter().all(Option::is_none) || score.is_disqualified() {
            return Ok(None);
        }
        Ok(Some(score))
    }
}

/// Maps path-evaluation results back to originating statements: for each
/// term, the first data statement carrying it as object, preferring the
/// subject under evaluation.
fn statements_for_terms(metadata: &PageMetadata, subject: &Subject, terms: &[Term]) -> Vec<Triple> {
    let mut seen: HashSet<Triple> = HashSet::new();
    let mut out = Vec::new();
    for term in terms {
        let statement = metadata
            .data
            .iter()
            .find(|s| &s.subject == subject && &s.object == term)
            .or_else(|| metadata.data.iter().find(|s| &s.object == term));
        if let Some(statement) = statement {
            if seen.insert(statement.clone()) {
                out.push(statement.clone());
            }
        }
    }
    out
}

/// Folds one page outcome into the previous snapshot. Subjects already
/// known to an earlier snapshot never re-rank; the merged ranking is
/// re-sorted and truncated to the result limit.
pub fn fold_outcome(
    previous: &ResultSnapshot,
    outcome: &PageOutcome,
    limit: usize,
) -> ResultSnapshot {
    let mut next = previous.clone();

    for location in &outcome.discovered {
        next.known_locations.insert(location.url.clone());
    }

    for ranked in &outcome.ranked {
        if !previous.subjects.contains(&ranked.subject) {
            next.ranked.push(ranked.clone());
        }
    }
    for subject in &outcome.evaluated {
        next.subjects.insert(subject.clone());
    }

    next.ranked.sort_by(compare_ranked);
    next.ranked.truncate(limit);
    next
}
