//! Runs a fixed, ordered list of statement scorers and collects their
//! answers into one score vector, one dimension per scorer. A scorer that
//! is not suitable for a statement still occupies its slot (as unknown), so
//! dimensions always line up across statements.

use std::sync::Arc;

use treeline_common::{ScoreValue, TreelineError};

use crate::request::ScoreRequest;
use crate::strategies::{BigramScorer, SubstringScorer};
use crate::traits::StatementScorer;

pub struct ScorerSequence {
    scorers: Vec<Arc<dyn StatementScorer>>,
}

impl ScorerSequence {
    pub fn new(scorers: Vec<Arc<dyn StatementScorer>>) -> Self {
        Self { scorers }
    }

    /// The stock typeahead configuration: substring matching decides,
    /// bigram overlap breaks ties.
    pub fn typeahead_defaults() -> Self {
        Self::new(vec![
            Arc::new(SubstringScorer::new(1)),
            Arc::new(BigramScorer),
        ])
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }

    pub async fn score(&self, request: &ScoreRequest<'_>) -> Result<ScoreValue, TreelineError> {
        let mut dims = Vec::with_capacity(self.scorers.len());
        for scorer in &self.scorers {
            if scorer.suitable(request) {
                dims.push(scorer.score(request).await?);
            } else {
                dims.push(None);
            }
        }
        Ok(ScoreValue::Vector(dims))
    }
}
