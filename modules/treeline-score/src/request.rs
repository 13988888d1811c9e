//! The unit of work handed to statement scorers.

use oxrdf::{Term, Triple};

use treeline_common::types::ExpectedValues;
use treeline_common::vocab::{rdf, xsd};

/// One statement plus the query context it is scored against.
#[derive(Debug)]
pub struct ScoreRequest<'a> {
    pub statement: &'a Triple,
    /// Normalized tokens for the statement's literal, when normalization
    /// succeeded. Scorers prefer these over the raw object value.
    pub normalized: Option<Vec<String>>,
    pub expected: &'a ExpectedValues,
}

impl<'a> ScoreRequest<'a> {
    pub fn new(statement: &'a Triple, expected: &'a ExpectedValues) -> Self {
        Self {
            statement,
            normalized: None,
            expected,
        }
    }

    pub fn with_normalized(mut self, normalized: Vec<String>) -> Self {
        self.normalized = Some(normalized);
        self
    }

    /// The values a scorer should look at: normalized tokens when present,
    /// otherwise the raw object text.
    pub fn found_values(&self) -> Vec<String> {
        match &self.normalized {
            Some(tokens) => tokens.clone(),
            None => vec![term_text(&self.statement.object).to_string()],
        }
    }

    /// The expected values this statement is compared against. The
    /// predicate index takes precedence over the literal-datatype index.
    pub fn expected_values(&self) -> &'a [String] {
        let by_predicate = self
            .expected
            .by_predicate
            .get(self.statement.predicate.as_str())
            .filter(|values| !values.is_empty());
        if let Some(values) = by_predicate {
            return values;
        }

        if let Term::Literal(literal) = &self.statement.object {
            if let Some(values) = self.expected.by_datatype.get(literal.datatype().as_str()) {
                return values;
            }
        }

        &[]
    }

    /// Is the object a plain string or language-tagged literal?
    pub fn has_string_literal(&self) -> bool {
        match &self.statement.object {
            Term::Literal(literal) => {
                let datatype = literal.datatype();
                datatype == xsd::STRING || datatype == rdf::LANG_STRING
            }
            _ => false,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.statement.object, Term::Literal(_))
    }
}

/// Lexical text of a term, without quoting or brackets.
pub fn term_text(term: &Term) -> &str {
    match term {
        Term::NamedNode(node) => node.as_str(),
        Term::BlankNode(node) => node.as_str(),
        Term::Literal(literal) => literal.value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode};
    use std::collections::HashMap;

    fn statement(predicate: &str, object: Literal) -> Triple {
        Triple::new(
            NamedNode::new_unchecked("http://ex.org/s"),
            NamedNode::new_unchecked(predicate),
            object,
        )
    }

    #[test]
    fn predicate_values_take_precedence_over_datatype_values() {
        let mut expected = ExpectedValues::default();
        expected.by_datatype.insert(
            "http://www.w3.org/2001/XMLSchema#string".to_string(),
            vec!["by-datatype".to_string()],
        );
        expected.by_predicate.insert(
            "http://ex.org/value".to_string(),
            vec!["by-predicate".to_string()],
        );

        let stmt = statement("http://ex.org/value", Literal::new_simple_literal("x"));
        let request = ScoreRequest::new(&stmt, &expected);
        assert_eq!(request.expected_values(), ["by-predicate".to_string()]);
    }

    #[test]
    fn empty_predicate_entry_falls_back_to_datatype() {
        let mut expected = ExpectedValues::default();
        expected
            .by_predicate
            .insert("http://ex.org/value".to_string(), Vec::new());
        expected.by_datatype.insert(
            "http://www.w3.org/2001/XMLSchema#string".to_string(),
            vec!["by-datatype".to_string()],
        );

        let stmt = statement("http://ex.org/value", Literal::new_simple_literal("x"));
        let request = ScoreRequest::new(&stmt, &expected);
        assert_eq!(request.expected_values(), ["by-datatype".to_string()]);
    }

    #[test]
    fn found_values_prefer_normalized_tokens() {
        let expected = ExpectedValues {
            by_datatype: HashMap::new(),
            by_predicate: HashMap::new(),
        };
        let stmt = statement("http://ex.org/value", Literal::new_simple_literal("Paris"));
        let raw = ScoreRequest::new(&stmt, &expected);
        assert_eq!(raw.found_values(), vec!["Paris".to_string()]);

        let normalized =
            ScoreRequest::new(&stmt, &expected).with_normalized(vec!["paris".to_string()]);
        assert_eq!(normalized.found_values(), vec!["paris".to_string()]);
    }

    #[test]
    fn language_tagged_literals_count_as_string_literals() {
        let expected = ExpectedValues::default();
        let stmt = statement(
            "http://ex.org/value",
            Literal::new_language_tagged_literal_unchecked("paris", "fr"),
        );
        let request = ScoreRequest::new(&stmt, &expected);
        assert!(request.has_string_literal());
    }
}
