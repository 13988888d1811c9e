//! Scores a location's advertised relation values against what the query
//! is looking for. This is what orders the crawl frontier: a page whose
//! relation covers "par" is worth fetching before one covering "x" when the
//! user typed "paris".

use std::collections::HashSet;

use async_trait::async_trait;
use oxrdf::Literal;

use treeline_common::types::RelationValues;
use treeline_common::vocab::tree;
use treeline_common::{Score, ScoreValue, TreelineError};

use crate::matching::{chars_of, find_match, mark_used};
use crate::traits::RelationScorer;

/// Every relation value must occur in an expected value: as a prefix
/// (scored `|t| + |t|/|x|`, so prefix matches always outweigh interior
/// ones), or as an interior substring of an expected value that already has
/// a prefix match (scored `|t| / (|x| + i)`, favoring matches in short
/// values). An unmatched relation value zeroes the whole score.
pub struct SubstringRelationScorer;

fn literal_strings(values: Option<&Vec<Literal>>) -> Vec<String> {
    values
        .map(|literals| literals.iter().map(|l| l.value().to_string()).collect())
        .unwrap_or_default()
}

fn overlap_score(tree_values: Vec<String>, expected_values: Vec<String>) -> f64 {
    let mut tree_values: Vec<Vec<char>> = tree_values.iter().map(|v| chars_of(v)).collect();
    let expected_values: Vec<Vec<char>> = expected_values.iter().map(|v| chars_of(v)).collect();

    // Longest relation values first; these are the most specific
    tree_values.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut score = 0.0f64;
    let mut matched_tree = vec![false; tree_values.len()];
    let mut matched_expected = vec![false; expected_values.len()];
    let mut used: Vec<Vec<bool>> = expected_values.iter().map(|v| vec![false; v.len()]).collect();

    // Phase 1: relation values that are prefixes of expected values
    for (tree_idx, tree_value) in tree_values.iter().enumerate() {
        for (expected_idx, expected) in expected_values.iter().enumerate() {
            if matched_expected[expected_idx] {
                // A longer relation value already claimed this prefix
                continue;
            }
            if expected.len() >= tree_value.len() && expected[..tree_value.len()] == tree_value[..] {
                score += tree_value.len() as f64 + tree_value.len() as f64 / expected.len() as f64;
                matched_tree[tree_idx] = true;
                matched_expected[expected_idx] = true;
                mark_used(&mut used[expected_idx], 0, tree_value.len());
                break;
            }
        }
    }

    // Phase 2: remaining relation values as interior substrings, on unused
    // characters of expected values that already have a prefix match
    for (tree_idx, tree_value) in tree_values.iter().enumerate() {
        if matched_tree[tree_idx] {
            continue;
        }
        let mut found = false;
        for (expected_idx, expected) in expected_values.iter().enumerate() {
            if !matched_expected[expected_idx] {
                continue;
            }
            if let Some(index) = find_match(tree_value, expected, &used[expected_idx]) {
                score += tree_value.len() as f64 / (expected.len() + index) as f64;
                mark_used(&mut used[expected_idx], index, tree_value.len());
                found = true;
                break;
            }
        }
        if !found {
            // None of the expected values matched
            return 0.0;
        }
    }

    score
}

#[async_trait]
impl RelationScorer for SubstringRelationScorer {
    async fn score(
        &self,
        values: &RelationValues,
        expected: &RelationValues,
    ) -> Result<Score, TreelineError> {
        let prefix_type = tree::PREFIX_RELATION.as_str();
        let substring_type = tree::SUBSTRING_RELATION.as_str();

        let mut score: Option<f64> = None;

        if expected.contains_key(prefix_type) && values.contains_key(prefix_type) {
            score = Some(overlap_score(
                literal_strings(values.get(prefix_type)),
                literal_strings(expected.get(prefix_type)),
            ));
        }

        if expected.contains_key(substring_type)
            && (values.contains_key(substring_type) || values.contains_key(prefix_type))
        {
            let mut found = literal_strings(values.get(prefix_type));
            found.extend(literal_strings(values.get(substring_type)));

            let mut seen = HashSet::new();
            let unique_expected: Vec<String> = literal_strings(expected.get(substring_type))
                .into_iter()
                .filter(|v| seen.insert(v.clone()))
                .collect();

            score = Some(overlap_score(found, unique_expected));
        }

        Ok(ScoreValue::Scalar(score).into())
    }
}
