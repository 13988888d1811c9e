use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use treeline_common::types::{ExpectedValues, Location, ResultSnapshot};
use treeline_common::vocab::{rdf, xsd};
use treeline_crawl::fetch::HttpDereferencer;
use treeline_crawl::query::{start_query, Collaborators, QueryArgs};
use treeline_score::{LiteralNormalizer, NfkdNormalizer, ScorerSequence, SubstringRelationScorer};

/// Typeahead search over TREE hypermedia collections.
#[derive(Parser, Debug)]
#[command(name = "treeline", version)]
struct Cli {
    /// Seed URL of the collection view to search.
    url: String,

    /// Search values, matched against the collection's string literals.
    #[arg(required = true)]
    values: Vec<String>,

    /// Maximum number of ranked results per snapshot.
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Maximum number of concurrent page fetches.
    #[arg(long, default_value_t = 8)]
    max_in_flight: usize,

    /// Print every intermediate snapshot instead of only the final one.
    #[arg(long)]
    verbose_results: bool,

    /// Emit results as JSON lines.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("treeline=info".parse()?))
        .init();

    let cli = Cli::parse();
    info!(url = cli.url.as_str(), "Treeline starting...");

    let normalizer = Arc::new(NfkdNormalizer::new());

    // Query values get the same normalization as page literals, so "Genève"
    // and "geneve" search identically. Raw values that cannot be normalized
    // are used as-is.
    let mut values: Vec<String> = Vec::new();
    for raw in &cli.values {
        match normalizer.normalize_raw(raw).await {
            Ok(tokens) if !tokens.is_empty() => values.extend(tokens),
            _ => values.push(raw.clone()),
        }
    }
    info!(values = ?values, "Normalized query values");

    let mut expected = ExpectedValues::default();
    expected
        .by_datatype
        .insert(xsd::STRING.as_str().to_string(), values.clone());
    expected
        .by_datatype
        .insert(rdf::LANG_STRING.as_str().to_string(), values);

    let args = QueryArgs {
        seeds: vec![Location::bare(&cli.url)],
        expected,
        result_limit: cli.limit,
        max_in_flight: cli.max_in_flight,
    };
    let collaborators = Collaborators {
        dereferencer: Arc::new(HttpDereferencer::new()?),
        scorers: Arc::new(ScorerSequence::typeahead_defaults()),
        relation_scorer: Arc::new(SubstringRelationScorer),
        normalizer,
    };

    let started = Instant::now();
    let mut crawl = start_query(args, collaborators).await?;

    let mut pages = 0usize;
    while let Some(snapshot) = crawl.next().await? {
        pages += 1;
        if cli.verbose_results {
            print_snapshot(&snapshot, started, cli.json);
        }
    }

    print_snapshot(crawl.latest(), started, cli.json);
    info!(
        pages,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Crawl finished"
    );
    Ok(())
}

fn print_snapshot(snapshot: &ResultSnapshot, started: Instant, json: bool) {
    if json {
        let ranked: Vec<_> = snapshot
            .ranked
            .iter()
            .map(|r| {
                serde_json::json!({
                    "subject": r.subject,
                    "score": r.score,
                    "matches": r.matching_statements.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                })
            })
            .collect();
        let line = serde_json::json!({
            "elapsed_ms": started.elapsed().as_millis() as u64,
            "evaluated": snapshot.subjects.len(),
            "results": ranked,
        });
        println!("{line}");
        return;
    }

    println!(
        "--- {} results after {}ms ({} subjects evaluated) ---",
        snapshot.ranked.len(),
        started.elapsed().as_millis(),
        snapshot.subjects.len()
    );
    for (i, result) in snapshot.ranked.iter().enumerate() {
        println!("{:>3}. {}  {:?}", i + 1, result.subject, result.score.dims());
        for statement in &result.matching_statements {
            println!("       {statement} .");
        }
    }
}
