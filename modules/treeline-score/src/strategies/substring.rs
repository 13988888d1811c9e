//! Substring matching against a literal's tokens.
//!
//! Every expected value must be found in the literal, without overlapping
//! character ranges: first as prefixes of literal tokens (longest expected
//! values first), then as interior substrings of tokens that already have a
//! prefix match. Prefix matches score `|v| + |v|/|token|`; interior matches
//! score `|v|/i` for match position `i`. A literal left with partially-used
//! tokens beyond `max_prefix_tolerance` looks like something nobody is in
//! the middle of typing, and disqualifies.

use async_trait::async_trait;

use treeline_common::TreelineError;

use crate::matching::{chars_of, find_match, mark_used};
use crate::request::ScoreRequest;
use crate::traits::StatementScorer;

pub struct SubstringScorer {
    pub max_prefix_tolerance: usize,
}

impl SubstringScorer {
    pub fn new(max_prefix_tolerance: usize) -> Self {
        Self {
            max_prefix_tolerance,
        }
    }
}

#[async_trait]
impl StatementScorer for SubstringScorer {
    fn suitable(&self, request: &ScoreRequest<'_>) -> bool {
        request.has_string_literal()
    }

    async fn score(&self, request: &ScoreRequest<'_>) -> Result<Option<f64>, TreelineError> {
        if !request.is_literal() {
            return Ok(None);
        }

        let literal_values: Vec<Vec<char>> =
            request.found_values().iter().map(|v| chars_of(v)).collect();
        let mut input_values: Vec<Vec<char>> = request
            .expected_values()
            .iter()
            .map(|v| chars_of(v))
            .collect();

        if literal_values.is_empty() || input_values.is_empty() {
            // Nothing to work with
            return Ok(Some(f64::NEG_INFINITY));
        }

        // Longest inputs first; these are the most specific
        input_values.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut score = 0.0f64;
        let mut matched_literals = vec![false; literal_values.len()];
        let mut matched_inputs = vec![false; input_values.len()];
        let mut used: Vec<Vec<bool>> = literal_values.iter().map(|v| vec![false; v.len()]).collect();

        // Phase 1: inputs that are prefixes of literal tokens
        for (input_idx, input) in input_values.iter().enumerate() {
            for (literal_idx, literal) in literal_values.iter().enumerate() {
                if matched_literals[literal_idx] {
                    // A longer input already claimed this token's prefix
                    continue;
                }
                if literal.len() >= input.len() && literal[..input.len()] == input[..] {
                    score += input.len() as f64 + input.len() as f64 / literal.len() as f64;
                    matched_inputs[input_idx] = true;
                    matched_literals[literal_idx] = true;
                    mark_used(&mut used[literal_idx], 0, input.len());
                    break;
                }
            }
        }

        // Phase 2: remaining inputs as interior substrings of tokens that
        // already have a prefix match, on unused characters only
        for (input_idx, input) in input_values.iter().enumerate() {
            if matched_inputs[input_idx] {
                continue;
            }
            let mut found = false;
            for (literal_idx, literal) in literal_values.iter().enumerate() {
                if !matched_literals[literal_idx] {
                    continue;
                }
                if let Some(index) = find_match(input, literal, &used[literal_idx]) {
                    score += input.len() as f64 / index as f64;
                    mark_used(&mut used[literal_idx], index, input.len());
                    found = true;
                    break;
                }
            }
            if !found {
                // This input value remains unmatched
                return Ok(Some(f64::NEG_INFINITY));
            }
        }

        // Phase 3: every partially-used token is a word the user would
        // still have to finish typing
        let mut prefix_matches = 0usize;
        for (literal_idx, literal) in literal_values.iter().enumerate() {
            let characters_used = used[literal_idx].iter().filter(|u| **u).count();
            if characters_used == 0 || characters_used == literal.len() {
                continue;
            }

            prefix_matches += 1;
            if prefix_matches > self.max_prefix_tolerance {
                return Ok(Some(f64::NEG_INFINITY));
            }
        }

        Ok(Some(score))
    }
}
