//! The crawl coordinator.
//!
//! One task owns all mutable crawl state: the frontier, the visited set,
//! the relation-path cache and the running result. Page workers run in a
//! `JoinSet`, receive clones of the shared collaborators, and hand their
//! findings back by value. The only signal flowing the other way is a
//! `watch` channel carrying the close flag.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use treeline_common::types::{Location, RelationValues, ResultSnapshot};
use treeline_common::TreelineError;
use treeline_score::RelationScorer;

use crate::fetch::Dereferencer;
use crate::frontier::{Frontier, FrontierEntry};
use crate::metadata::{discover_locations, extract_page};
use crate::path::RelationPath;
use crate::processor::{fold_outcome, PageOutcome, PageProcessor};

pub struct Crawl {
    dereferencer: Arc<dyn Dereferencer>,
    relation_scorer: Arc<dyn RelationScorer>,
    processor: Arc<PageProcessor>,
    frontier: Frontier,
    expected_relation_values: RelationValues,
    in_flight: JoinSet<Result<PageOutcome, TreelineError>>,
    latest: ResultSnapshot,
    pending: VecDeque<ResultSnapshot>,
    /// Write-once: the first page that carries a path declaration wins.
    relation_path: Option<Arc<RelationPath>>,
    result_limit: usize,
    max_in_flight: usize,
    close_tx: watch::Sender<bool>,
    close_rx: watch::Receiver<bool>,
    closed: bool,
}

impl Crawl {
    pub(crate) fn new(
        dereferencer: Arc<dyn Dereferencer>,
        relation_scorer: Arc<dyn RelationScorer>,
        processor: Arc<PageProcessor>,
        expected_relation_values: RelationValues,
        result_limit: usize,
        max_in_flight: usize,
    ) -> Self {
        let (close_tx, close_rx) = watch::channel(false);
        Self {
            dereferencer,
            relation_scorer,
            processor,
            frontier: Frontier::new(),
            expected_relation_values,
            in_flight: JoinSet::new(),
            latest: ResultSnapshot::default(),
            pending: VecDeque::new(),
            relation_path: None,
            result_limit,
            max_in_flight,
            close_tx,
            close_rx,
            closed: false,
        }
    }

    /// The next result snapshot, one per processed page. `None` once the
    /// frontier is exhausted or the crawl has been closed and every pending
    /// snapshot has been handed out.
    pub async fn next(&mut self) -> Result<Option<ResultSnapshot>, TreelineError> {
        loop {
            if let Some(snapshot) = self.pending.pop_front() {
                return Ok(Some(snapshot));
            }
            if self.closed {
                return Ok(None);
            }

            self.schedule();
            if self.in_flight.is_empty() {
                info!(
                    visited = self.frontier.visited_count(),
                    ranked = self.latest.ranked.len(),
                    "Crawl exhausted the frontier"
                );
                self.closed = true;
                continue;
            }

            match self.in_flight.join_next().await {
                Some(Ok(Ok(outcome))) => self.absorb(outcome).await?,
                Some(Ok(Err(error))) => return Err(error),
                Some(Err(join_error)) => warn!(%join_error, "Page worker panicked"),
                None => {}
            }
        }
    }

    /// Stops the crawl early. No new fetches start; workers that already
    /// fetched skip scoring. Snapshots produced before the close stay
    /// readable through `next`.
    pub fn close(&mut self) {
        if !self.closed {
            debug!("Crawl closed by consumer");
            self.closed = true;
            let _ = self.close_tx.send(true);
        }
    }

    pub fn latest(&self) -> &ResultSnapshot {
        &self.latest
    }

    /// Seeds bypass pruning: the caller asked for them explicitly.
    pub(crate) async fn enqueue_seed(&mut self, location: &Location) -> Result<(), TreelineError> {
        let score = self.score_location(location).await?;
        self.frontier.push(FrontierEntry {
            score,
            location: location.clone(),
        });
        Ok(())
    }

    fn schedule(&mut self) {
        while self.in_flight.len() < self.max_in_flight {
            let Some(entry) = self.frontier.pop() else { break };
            debug!(url = %entry.location.url, score = ?entry.score.dims(), "Fetching page");
            self.in_flight.spawn(fetch_and_process(
                Arc::clone(&self.dereferencer),
                Arc::clone(&self.processor),
                entry,
                self.relation_path.clone(),
                Arc::new(self.latest.subjects.clone()),
                self.close_rx.clone(),
            ));
        }
    }

    async fn absorb(&mut self, mut outcome: PageOutcome) -> Result<(), TreelineError> {
        if self.relation_path.is_none() {
            if let Some(path) = outcome.relation_path.take() {
                info!(url = %outcome.url, "Caching the collection's path declaration");
                self.relation_path = Some(Arc::new(path));
            }
        }

        for location in &outcome.discovered {
            self.enqueue(location).await?;
        }

        self.latest = fold_outcome(&self.latest, &outcome, self.result_limit);
        debug!(
            url = %outcome.url,
            ranked = self.latest.ranked.len(),
            frontier_exhausted = self.frontier.is_exhausted(),
            "Absorbed page outcome"
        );
        self.pending.push_back(self.latest.clone());
        Ok(())
    }

    /// A location that advertises relation values must look promising to be
    /// worth a request; one without any is always followed.
    async fn enqueue(&mut self, location: &Location) -> Result<(), TreelineError> {
        let score = self.score_location(location).await?;
        if !location.values.is_empty() && score.sum() <= 0.0 {
            debug!(url = %location.url, "Pruned unpromising location");
            return Ok(());
        }
        self.frontier.push(FrontierEntry {
            score,
            location: location.clone(),
        });
        Ok(())
    }

    async fn score_location(&self, location: &Location) -> Result<treeline_common::Score, TreelineError> {
        let score = self
            .relation_scorer
            .score(&location.values, &self.expected_relation_values)
            .await?;
        if score.has_invalid_dimension() {
            return Err(TreelineError::Score(format!(
                "relation scorer produced NaN for {}",
                location.url
            )));
        }
        Ok(score)
    }
}

/// One page worker. Collaborator failures are logged and yield an empty
/// outcome; only scoring bugs propagate as errors.
async fn fetch_and_process(
    dereferencer: Arc<dyn Dereferencer>,
    processor: Arc<PageProcessor>,
    entry: FrontierEntry,
    relation_path: Option<Arc<RelationPath>>,
    already_evaluated: Arc<HashSet<String>>,
    closed: watch::Receiver<bool>,
) -> Result<PageOutcome, TreelineError> {
    let Location { url, values } = entry.location;

    let statements = match dereferencer.dereference(&url).await {
        Ok(statements) => statements,
        Err(error) => {
            warn!(%url, %error, "Dereference failed, skipping page");
            return Ok(PageOutcome::empty(url));
        }
    };

    let mut metadata = extract_page(&url, &statements);
    let discovered = discover_locations(&metadata, &values);

    let (ranked, evaluated) = if *closed.borrow() {
        // Closed while fetching; skip the expensive part
        (Vec::new(), Vec::new())
    } else {
        let page_path = relation_path.as_deref().or(metadata.relation_path.as_ref());
        processor
            .score_subjects(&metadata, page_path, &already_evaluated)
            .await?
    };

    let discovered_path = match &relation_path {
        None => metadata.relation_path.take(),
        Some(_) => None,
    };

    Ok(PageOutcome {
        url,
        ranked,
        evaluated,
        discovered,
        relation_path: discovered_path,
    })
}
