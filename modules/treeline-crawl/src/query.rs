//! The consumer-facing entry point: validate a query, wire up the
//! collaborators and hand back a running [`Crawl`].

use std::sync::Arc;

use oxrdf::Literal;
use tracing::info;
use url::Url;

use treeline_common::types::{ExpectedValues, Location, RelationValues};
use treeline_common::vocab::{rdf, tree, xsd};
use treeline_common::TreelineError;
use treeline_score::{LiteralNormalizer, RelationScorer, ScorerSequence};

use crate::crawl::Crawl;
use crate::fetch::Dereferencer;
use crate::processor::PageProcessor;

pub struct QueryArgs {
    /// Entry pages of the collection. Never pruned.
    pub seeds: Vec<Location>,
    pub expected: ExpectedValues,
    /// How many ranked subjects a snapshot holds at most.
    pub result_limit: usize,
    /// Concurrent page fetches.
    pub max_in_flight: usize,
}

pub struct Collaborators {
    pub dereferencer: Arc<dyn Dereferencer>,
    pub scorers: Arc<ScorerSequence>,
    pub relation_scorer: Arc<dyn RelationScorer>,
    pub normalizer: Arc<dyn LiteralNormalizer>,
}

/// Validates the query and starts a crawl over its seeds. Validation
/// failures surface here, before any request is made.
pub async fn start_query(
    args: QueryArgs,
    collaborators: Collaborators,
) -> Result<Crawl, TreelineError> {
    if args.seeds.is_empty() {
        return Err(TreelineError::Query("a query needs at least one seed URL".to_string()));
    }
    for seed in &args.seeds {
        Url::parse(&seed.url).map_err(|e| {
            TreelineError::Query(format!("invalid seed URL {}: {e}", seed.url))
        })?;
    }
    if args.expected.is_empty() {
        return Err(TreelineError::Query(
            "a query needs at least one expected value".to_string(),
        ));
    }
    if args.result_limit == 0 {
        return Err(TreelineError::Query("result limit must be at least 1".to_string()));
    }
    if args.max_in_flight == 0 {
        return Err(TreelineError::Query(
            "max in-flight requests must be at least 1".to_string(),
        ));
    }

    let expected_relation_values = gather_expected_relation_values(&args.expected);
    let processor = Arc::new(PageProcessor::new(
        collaborators.scorers,
        collaborators.normalizer,
        Arc::new(args.expected),
    ));

    let mut crawl = Crawl::new(
        collaborators.dereferencer,
        collaborators.relation_scorer,
        processor,
        expected_relation_values,
        args.result_limit,
        args.max_in_flight,
    );
    for seed in &args.seeds {
        crawl.enqueue_seed(seed).await?;
    }

    info!(
        seeds = args.seeds.len(),
        limit = args.result_limit,
        max_in_flight = args.max_in_flight,
        "Query started"
    );
    Ok(crawl)
}

/// What the query expects relation values to cover. String-valued
/// expectations, whether indexed by datatype or by predicate, become the
/// substring-relation values a location's advertisement is compared against.
fn gather_expected_relation_values(expected: &ExpectedValues) -> RelationValues {
    let mut literals: Vec<Literal> = Vec::new();

    for datatype in [xsd::STRING.as_str(), rdf::LANG_STRING.as_str()] {
        if let Some(values) = expected.by_datatype.get(datatype) {
            literals.extend(values.iter().map(Literal::new_simple_literal));
        }
    }
    for values in expected.by_predicate.values() {
        literals.extend(values.iter().map(Literal::new_simple_literal));
    }

    let mut map = RelationValues::new();
    if !literals.is_empty() {
        map.insert(tree::SUBSTRING_RELATION.as_str().to_string(), literals);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use treeline_score::{NfkdNormalizer, SubstringRelationScorer};

    use crate::testing::FixtureDereferencer;

    fn collaborators() -> Collaborators {
        Collaborators {
            dereferencer: Arc::new(FixtureDereferencer::new()),
            scorers: Arc::new(ScorerSequence::typeahead_defaults()),
            relation_scorer: Arc::new(SubstringRelationScorer),
            normalizer: Arc::new(NfkdNormalizer::new()),
        }
    }

    fn expected(values: &[&str]) -> ExpectedValues {
        let mut expected = ExpectedValues::default();
        expected.by_datatype.insert(
            xsd::STRING.as_str().to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        expected
    }

    #[tokio::test]
    async fn queries_without_seeds_are_rejected() {
        let args = QueryArgs {
            seeds: Vec::new(),
            expected: expected(&["paris"]),
            result_limit: 10,
            max_in_flight: 4,
        };
        let err = start_query(args, collaborators())
            .await
            .err()
            .expect("validation must fail");
        assert!(matches!(err, TreelineError::Query(_)));
    }

    #[tokio::test]
    async fn unparseable_seed_urls_are_rejected() {
        let args = QueryArgs {
            seeds: vec![Location::bare("not a url")],
            expected: expected(&["paris"]),
            result_limit: 10,
            max_in_flight: 4,
        };
        let err = start_query(args, collaborators())
            .await
            .err()
            .expect("validation must fail");
        assert!(matches!(err, TreelineError::Query(_)));
    }

    #[tokio::test]
    async fn queries_without_expected_values_are_rejected() {
        let args = QueryArgs {
            seeds: vec![Location::bare("http://ex.org/page1")],
            expected: ExpectedValues::default(),
            result_limit: 10,
            max_in_flight: 4,
        };
        let err = start_query(args, collaborators())
            .await
            .err()
            .expect("validation must fail");
        assert!(matches!(err, TreelineError::Query(_)));
    }

    #[tokio::test]
    async fn zero_limits_are_rejected() {
        let args = QueryArgs {
            seeds: vec![Location::bare("http://ex.org/page1")],
            expected: expected(&["paris"]),
            result_limit: 0,
            max_in_flight: 4,
        };
        assert!(start_query(args, collaborators()).await.is_err());

        let args = QueryArgs {
            seeds: vec![Location::bare("http://ex.org/page1")],
            expected: expected(&["paris"]),
            result_limit: 10,
            max_in_flight: 0,
        };
        assert!(start_query(args, collaborators()).await.is_err());
    }

    #[test]
    fn relation_values_gather_string_and_predicate_expectations() {
        let mut expected = expected(&["paris"]);
        expected
            .by_predicate
            .insert("http://ex.org/name".to_string(), vec!["lyon".to_string()]);

        let gathered = gather_expected_relation_values(&expected);
        let values = &gathered[tree::SUBSTRING_RELATION.as_str()];
        let mut strings: Vec<&str> = values.iter().map(|l| l.value()).collect();
        strings.sort();
        assert_eq!(strings, vec!["lyon", "paris"]);
    }
}
