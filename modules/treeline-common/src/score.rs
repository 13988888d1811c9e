//! The score model shared by the frontier and the final ranking.
//!
//! A score is an ordered vector of optional dimensions. `None` means a
//! scorer could not judge that dimension; `f64::INFINITY` is the best
//! possible value and `f64::NEG_INFINITY` disqualifies whatever carries it.
//! A disqualifying dimension never survives into a ranked result.

use std::cmp::Ordering;

use serde::Serialize;

/// A single collaborator response: either one scalar or a full vector.
/// Scalars are coerced into one-element vectors before merging.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreValue {
    Scalar(Option<f64>),
    Vector(Vec<Option<f64>>),
}

impl From<ScoreValue> for Score {
    fn from(value: ScoreValue) -> Self {
        match value {
            ScoreValue::Scalar(dim) => Score::from_dims(vec![dim]),
            ScoreValue::Vector(dims) => Score::from_dims(dims),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Score {
    dims: Vec<Option<f64>>,
}

impl Score {
    pub fn new() -> Self {
        Self { dims: Vec::new() }
    }

    pub fn from_dims(dims: Vec<Option<f64>>) -> Self {
        Self { dims }
    }

    pub fn dims(&self) -> &[Option<f64>] {
        &self.dims
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Ranking order. `Greater` means `self` ranks better than `other`.
    ///
    /// A score with more dimensions always ranks better: the missing
    /// trailing dimensions are unknown, not zero. Otherwise dimensions are
    /// compared in fixed order; an unknown on either side ties that
    /// dimension, and the first dimension where both sides are known and
    /// differ decides. Exact ties are broken by identifier at the call
    /// sites.
    pub fn cmp_ranking(&self, other: &Score) -> Ordering {
        match self.dims.len().cmp(&other.dims.len()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        for (a, b) in self.dims.iter().zip(&other.dims) {
            if let (Some(a), Some(b)) = (a, b) {
                match a.partial_cmp(b) {
                    Some(Ordering::Equal) | None => continue,
                    Some(ord) => return ord,
                }
            }
        }

        Ordering::Equal
    }

    /// Fold one statement's score into this running score.
    ///
    /// Dimensions combine left to right. An unknown incoming dimension is
    /// skipped, with the index advancing on both sides. An unknown current
    /// dimension takes the incoming value unconditionally. The first strict
    /// improvement sets a ratchet: from then on every incoming value is
    /// taken regardless of comparison. Before the ratchet, a dimension where
    /// the current value is strictly better stops the merge and the
    /// remaining dimensions keep their current values.
    pub fn merge(&mut self, incoming: &Score) {
        let mut improved = false;
        for (i, new) in incoming.dims.iter().enumerate() {
            let Some(new) = *new else { continue };

            if i >= self.dims.len() {
                // Trailing dimensions we did not have yet are unknown
                self.dims.resize(i, None);
                self.dims.push(Some(new));
                continue;
            }

            match self.dims[i] {
                None => self.dims[i] = Some(new),
                Some(current) => {
                    if new > current || improved {
                        improved = true;
                        self.dims[i] = Some(new);
                    } else if current > new {
                        break;
                    }
                }
            }
        }
    }

    /// Sum of the known dimensions, used for frontier pruning.
    pub fn sum(&self) -> f64 {
        self.dims.iter().flatten().sum()
    }

    /// Any disqualifying dimension?
    pub fn is_disqualified(&self) -> bool {
        self.dims.iter().flatten().any(|d| *d == f64::NEG_INFINITY)
    }

    /// No unknown dimensions? Required before a subject may be ranked.
    pub fn is_fully_known(&self) -> bool {
        self.dims.iter().all(Option::is_some)
    }

    /// Any dimension produced by a broken scorer? NaN cannot be ordered and
    /// must not enter the frontier or the ranking.
    pub fn has_invalid_dimension(&self) -> bool {
        self.dims.iter().flatten().any(|d| d.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(dims: &[Option<f64>]) -> Score {
        Score::from_dims(dims.to_vec())
    }

    #[test]
    fn longer_score_always_ranks_better() {
        let short = score(&[Some(5.0)]);
        let long = score(&[Some(1.0), Some(1.0)]);
        assert_eq!(long.cmp_ranking(&short), Ordering::Greater);
        assert_eq!(short.cmp_ranking(&long), Ordering::Less);
    }

    #[test]
    fn compare_is_antisymmetric() {
        let cases = [
            (score(&[Some(1.0), Some(2.0)]), score(&[Some(1.0), Some(3.0)])),
            (score(&[None, Some(2.0)]), score(&[Some(1.0), Some(2.0)])),
            (score(&[Some(4.0)]), score(&[Some(4.0)])),
        ];
        for (a, b) in &cases {
            assert_eq!(a.cmp_ranking(b), b.cmp_ranking(a).reverse());
        }
    }

    #[test]
    fn compare_is_transitive() {
        let a = score(&[Some(3.0), Some(1.0)]);
        let b = score(&[Some(2.0), Some(9.0)]);
        let c = score(&[Some(1.0), Some(9.0)]);
        assert_eq!(a.cmp_ranking(&b), Ordering::Greater);
        assert_eq!(b.cmp_ranking(&c), Ordering::Greater);
        assert_eq!(a.cmp_ranking(&c), Ordering::Greater);
    }

    #[test]
    fn unknown_dimensions_tie_and_comparison_moves_on() {
        let a = score(&[None, Some(2.0)]);
        let b = score(&[Some(100.0), Some(3.0)]);
        // First dimension is unknown on one side, so the second decides
        assert_eq!(a.cmp_ranking(&b), Ordering::Less);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut a = score(&[Some(1.0), Some(2.0), None]);
        let original = a.clone();
        a.merge(&original.clone());
        assert_eq!(a, original);
    }

    #[test]
    fn merge_fills_unknown_current_dimensions() {
        let mut a = score(&[None, Some(2.0)]);
        a.merge(&score(&[Some(1.0), Some(1.0)]));
        // Unknown filled in; second dimension not an improvement and no
        // ratchet was set by filling an unknown
        assert_eq!(a, score(&[Some(1.0), Some(2.0)]));
    }

    #[test]
    fn merge_ratchet_overwrites_everything_after_first_improvement() {
        let mut a = score(&[Some(1.0), Some(9.0), Some(9.0)]);
        a.merge(&score(&[Some(2.0), Some(1.0), Some(1.0)]));
        assert_eq!(a, score(&[Some(2.0), Some(1.0), Some(1.0)]));
    }

    #[test]
    fn merge_stops_when_current_is_better_before_any_improvement() {
        let mut a = score(&[Some(5.0), Some(1.0)]);
        a.merge(&score(&[Some(4.0), Some(9.0)]));
        assert_eq!(a, score(&[Some(5.0), Some(1.0)]));
    }

    #[test]
    fn merge_skips_unknown_incoming_without_desyncing_dimensions() {
        // The skipped unknown must not shift later incoming values onto
        // earlier dimensions
        let mut a = score(&[Some(1.0), Some(1.0), Some(1.0)]);
        a.merge(&score(&[None, Some(3.0), None]));
        assert_eq!(a, score(&[Some(1.0), Some(3.0), Some(1.0)]));
    }

    #[test]
    fn merge_extends_with_trailing_incoming_dimensions() {
        let mut a = score(&[Some(1.0)]);
        a.merge(&score(&[Some(1.0), Some(4.0)]));
        assert_eq!(a, score(&[Some(1.0), Some(4.0)]));
    }

    #[test]
    fn scalar_coerces_to_single_dimension() {
        let s: Score = ScoreValue::Scalar(Some(2.5)).into();
        assert_eq!(s, score(&[Some(2.5)]));
    }

    #[test]
    fn disqualification_and_sums() {
        assert!(score(&[Some(1.0), Some(f64::NEG_INFINITY)]).is_disqualified());
        assert!(!score(&[Some(1.0), None]).is_disqualified());
        assert!(!score(&[Some(1.0), None]).is_fully_known());
        assert_eq!(score(&[Some(1.0), None, Some(2.0)]).sum(), 3.0);
    }
}
