//! Page dereferencing: URL in, parsed statements out.

use std::time::Duration;

use async_trait::async_trait;
use oxrdf::Triple;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use treeline_common::TreelineError;

#[async_trait]
pub trait Dereferencer: Send + Sync {
    async fn dereference(&self, url: &str) -> Result<Vec<Triple>, TreelineError>;
}

/// Fetches pages over HTTP and parses them as Turtle or N-Triples,
/// resolving relative IRIs against the request URL.
pub struct HttpDereferencer {
    client: reqwest::Client,
}

impl HttpDereferencer {
    pub fn new() -> Result<Self, TreelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("treeline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TreelineError::Fetch(format!("building http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Dereferencer for HttpDereferencer {
    async fn dereference(&self, url: &str) -> Result<Vec<Triple>, TreelineError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/turtle, application/n-triples")
            .send()
            .await
            .map_err(|e| TreelineError::Fetch(format!("{url}: {e}")))?
            .error_for_status()
            .map_err(|e| TreelineError::Fetch(format!("{url}: {e}")))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_default();

        let body = response
            .bytes()
            .await
            .map_err(|e| TreelineError::Fetch(format!("{url}: {e}")))?;

        let statements = match content_type.as_str() {
            "application/n-triples" => parse_ntriples(url, &body)?,
            _ => parse_turtle(url, &body)?,
        };

        debug!(url, statements = statements.len(), "Dereferenced page");
        Ok(statements)
    }
}

fn parse_turtle(url: &str, body: &[u8]) -> Result<Vec<Triple>, TreelineError> {
    let parser = oxttl::TurtleParser::new()
        .with_base_iri(url)
        .map_err(|e| TreelineError::Fetch(format!("{url}: invalid base IRI: {e}")))?;
    parser
        .for_reader(body)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TreelineError::Fetch(format!("{url}: {e}")))
}

fn parse_ntriples(url: &str, body: &[u8]) -> Result<Vec<Triple>, TreelineError> {
    oxttl::NTriplesParser::new()
        .for_reader(body)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TreelineError::Fetch(format!("{url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turtle_bodies_resolve_relative_iris_against_the_page_url() {
        let statements =
            parse_turtle("http://ex.org/page1", b"<s> <http://ex.org/p> <o> .").unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].predicate.as_str(), "http://ex.org/p");
    }

    #[test]
    fn malformed_bodies_surface_as_fetch_errors() {
        let err = parse_turtle("http://ex.org/page1", b"this is not turtle").unwrap_err();
        assert!(matches!(err, TreelineError::Fetch(_)));
    }
}
