//! Exact-match counting with a bounded prefix tolerance: every expected
//! token must occur among the found tokens, where up to
//! `max_prefix_tolerance` of those occurrences may be prefix matches
//! instead of exact ones. Anything unaccounted for disqualifies the
//! statement.

use async_trait::async_trait;

use treeline_common::TreelineError;

use crate::request::ScoreRequest;
use crate::traits::StatementScorer;

pub struct ExactPrefixScorer {
    pub max_prefix_tolerance: usize,
}

impl ExactPrefixScorer {
    pub fn new(max_prefix_tolerance: usize) -> Self {
        Self {
            max_prefix_tolerance,
        }
    }
}

#[async_trait]
impl StatementScorer for ExactPrefixScorer {
    fn suitable(&self, request: &ScoreRequest<'_>) -> bool {
        request.has_string_literal()
    }

    async fn score(&self, request: &ScoreRequest<'_>) -> Result<Option<f64>, TreelineError> {
        if !request.is_literal() {
            return Ok(None);
        }

        let found_values = request.found_values();
        let expected_values = request.expected_values();

        // Expected tokens with multiplicity, in first-appearance order so
        // prefix tolerance is consumed deterministically
        let mut expected_tokens: Vec<(&str, usize)> = Vec::new();
        for token in expected_values {
            match expected_tokens.iter_mut().find(|(t, _)| *t == token.as_str()) {
                Some((_, count)) => *count += 1,
                None => expected_tokens.push((token.as_str(), 1)),
            }
        }

        let mut score: Option<f64> = None;
        let mut prefix_tolerance = 0usize;

        for (expected_token, expected_count) in expected_tokens {
            let mut count = 0usize;
            for found in &found_values {
                if found.as_str() == expected_token {
                    count += 1;
                } else if prefix_tolerance < self.max_prefix_tolerance
                    && found.starts_with(expected_token)
                {
                    prefix_tolerance += 1;
                    count += 1;
                }
            }

            if count >= expected_count {
                // Credit how many matches we were looking for, not how many
                // were actually found
                score = Some(score.unwrap_or(0.0) + expected_count as f64);
            }
        }

        if score != Some(expected_values.len() as f64) {
            // Not every expected token is accounted for
            score = Some(f64::NEG_INFINITY);
        }

        Ok(score)
    }
}
