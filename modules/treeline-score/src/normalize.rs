//! NFKD literal normalization: lowercase, strip diacritics and punctuation,
//! split on separators.

use async_trait::async_trait;
use oxrdf::{Term, Triple};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use treeline_common::vocab::{rdf, xsd};
use treeline_common::TreelineError;

use crate::traits::LiteralNormalizer;

pub struct NfkdNormalizer {
    filter: Regex,
    whitespace: Regex,
}

impl NfkdNormalizer {
    pub fn new() -> Self {
        Self {
            filter: Regex::new(r"[^\p{L}\p{N}\p{Z}]").expect("static regex"),
            whitespace: Regex::new(r"\p{Z}").expect("static regex"),
        }
    }

    fn tokens(&self, value: &str) -> Vec<String> {
        let folded: String = value.trim().to_lowercase().nfkd().collect();
        let cleaned = self.filter.replace_all(&folded, "");
        self.whitespace
            .split(&cleaned)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for NfkdNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LiteralNormalizer for NfkdNormalizer {
    async fn normalize(&self, statement: &Triple) -> Result<Vec<String>, TreelineError> {
        match &statement.object {
            Term::Literal(literal)
                if literal.datatype() == xsd::STRING || literal.datatype() == rdf::LANG_STRING =>
            {
                Ok(self.tokens(literal.value()))
            }
            _ => Err(TreelineError::Normalize(
                "object is not a string literal".to_string(),
            )),
        }
    }

    async fn normalize_raw(&self, value: &str) -> Result<Vec<String>, TreelineError> {
        Ok(self.tokens(value))
    }
}
