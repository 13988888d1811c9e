//! Literal length as a score, for rankings where shorter (or longer)
//! labels should surface first.

use async_trait::async_trait;
use oxrdf::Term;

use treeline_common::TreelineError;

use crate::request::ScoreRequest;
use crate::traits::StatementScorer;

pub struct StringLengthScorer {
    /// When set, shorter literals rank better.
    pub ascending: bool,
}

impl StringLengthScorer {
    pub fn new(ascending: bool) -> Self {
        Self { ascending }
    }
}

#[async_trait]
impl StatementScorer for StringLengthScorer {
    fn suitable(&self, request: &ScoreRequest<'_>) -> bool {
        request.has_string_literal()
    }

    async fn score(&self, request: &ScoreRequest<'_>) -> Result<Option<f64>, TreelineError> {
        // The raw literal, not the normalized tokens: the user sees the raw
        // label
        let Term::Literal(literal) = &request.statement.object else {
            return Ok(None);
        };

        let mut score = literal.value().chars().count() as f64;
        if self.ascending {
            score = -score;
        }
        Ok(Some(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode, Triple};
    use treeline_common::types::ExpectedValues;

    fn statement(object: &str) -> Triple {
        Triple::new(
            NamedNode::new_unchecked("http://ex.org/s"),
            NamedNode::new_unchecked("http://ex.org/value"),
            Literal::new_simple_literal(object),
        )
    }

    #[tokio::test]
    async fn descending_scores_raw_length() {
        let expected = ExpectedValues::default();
        let stmt = statement("paris");
        let request = ScoreRequest::new(&stmt, &expected);
        assert_eq!(
            StringLengthScorer::new(false).score(&request).await.unwrap(),
            Some(5.0)
        );
    }

    #[tokio::test]
    async fn ascending_negates_so_shorter_wins() {
        let expected = ExpectedValues::default();
        let stmt = statement("paris");
        let request = ScoreRequest::new(&stmt, &expected);
        assert_eq!(
            StringLengthScorer::new(true).score(&request).await.unwrap(),
            Some(-5.0)
        );
    }
}
