//! Common prefix ratio: the best shared-prefix length between a found value
//! and an expected value, relative to the shorter of the two.

use async_trait::async_trait;

use treeline_common::TreelineError;

use crate::request::ScoreRequest;
use crate::traits::StatementScorer;

pub struct CommonPrefixScorer;

fn prefix_ratio(found: &str, expected: &str) -> Option<f64> {
    let found: Vec<char> = found.chars().collect();
    let expected: Vec<char> = expected.chars().collect();
    let min_length = found.len().min(expected.len());
    if min_length == 0 {
        return None;
    }

    let shared = found
        .iter()
        .zip(&expected)
        .take_while(|(a, b)| a == b)
        .count();
    Some(shared as f64 / min_length as f64)
}

#[async_trait]
impl StatementScorer for CommonPrefixScorer {
    fn suitable(&self, request: &ScoreRequest<'_>) -> bool {
        request.has_string_literal()
    }

    async fn score(&self, request: &ScoreRequest<'_>) -> Result<Option<f64>, TreelineError> {
        if !request.is_literal() {
            return Ok(None);
        }

        // Any literal yields a valid score; the best pair wins
        let mut score: f64 = 0.0;
        for found in request.found_values() {
            for expected in request.expected_values() {
                if let Some(ratio) = prefix_ratio(&found, expected) {
                    score = score.max(ratio);
                }
            }
        }

        Ok(Some(score))
    }
}
