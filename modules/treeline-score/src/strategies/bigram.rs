//! Bigram overlap: how many character bigrams of the expected values occur
//! in the found values, counted as a multiset intersection.

use std::collections::HashMap;

use async_trait::async_trait;

use treeline_common::TreelineError;

use crate::request::ScoreRequest;
use crate::traits::StatementScorer;

pub struct BigramScorer;

fn bigrams(value: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = value.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

#[async_trait]
impl StatementScorer for BigramScorer {
    fn suitable(&self, request: &ScoreRequest<'_>) -> bool {
        request.has_string_literal()
    }

    async fn score(&self, request: &ScoreRequest<'_>) -> Result<Option<f64>, TreelineError> {
        if !request.is_literal() {
            return Ok(None);
        }

        let mut expected_bigrams: HashMap<(char, char), u32> = HashMap::new();
        for expected in request.expected_values() {
            for bigram in bigrams(expected) {
                *expected_bigrams.entry(bigram).or_insert(0) += 1;
            }
        }

        let mut intersection = 0u32;
        for found in request.found_values() {
            for bigram in bigrams(&found) {
                if let Some(count) = expected_bigrams.get_mut(&bigram) {
                    if *count > 0 {
                        *count -= 1;
                        intersection += 1;
                    }
                }
            }
        }

        Ok(Some(f64::from(intersection)))
    }
}
