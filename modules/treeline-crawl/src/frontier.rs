//! The crawl frontier: a best-first priority queue of locations with a
//! visited set. A URL can be queued twice (reached over two relations) but
//! is only ever handed out once.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use treeline_common::types::Location;
use treeline_common::Score;

#[derive(Debug)]
pub struct FrontierEntry {
    pub score: Score,
    pub location: Location,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    /// Better score first; equal scores pop in ascending URL order so a
    /// crawl is deterministic.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp_ranking(&other.score)
            .then_with(|| other.location.url.cmp(&self.location.url))
    }
}

#[derive(Debug, Default)]
pub struct Frontier {
    queue: BinaryHeap<FrontierEntry>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a location unless it has already been visited. Duplicates in
    /// the queue are fine; `pop` filters them.
    pub fn push(&mut self, entry: FrontierEntry) {
        if !self.visited.contains(&entry.location.url) {
            self.queue.push(entry);
        }
    }

    /// Hands out the best unvisited location and marks it visited.
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.queue.pop() {
            if self.visited.insert(entry.location.url.clone()) {
                return Some(entry);
            }
        }
        None
    }

    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
