//! Test doubles shared by unit and integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use oxrdf::Triple;

use treeline_common::TreelineError;

use crate::fetch::Dereferencer;

/// Serves pre-parsed pages from memory and records the fetch order.
#[derive(Default)]
pub struct FixtureDereferencer {
    pages: HashMap<String, Vec<Triple>>,
    fetched: Mutex<Vec<String>>,
}

impl FixtureDereferencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a page, parsing the Turtle body against the page URL.
    pub fn with_turtle(mut self, url: &str, turtle: &str) -> Self {
        let statements = oxttl::TurtleParser::new()
            .with_base_iri(url)
            .expect("fixture URL is a valid IRI")
            .for_reader(turtle.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .expect("fixture turtle parses");
        self.pages.insert(url.to_string(), statements);
        self
    }

    /// URLs dereferenced so far, in request order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("fetch log lock").clone()
    }
}

#[async_trait]
impl Dereferencer for FixtureDereferencer {
    async fn dereference(&self, url: &str) -> Result<Vec<Triple>, TreelineError> {
        self.fetched
            .lock()
            .expect("fetch log lock")
            .push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| TreelineError::Fetch(format!("no fixture registered for {url}")))
    }
}
