//! TREE hypermedia metadata: which relations a page advertises, which
//! further pages they point at, and which statements are left over as
//! scorable page data.

use std::collections::{HashMap, HashSet};

use oxrdf::{Graph, Literal, NamedNode, Subject, Triple};
use tracing::debug;

use treeline_common::types::{Location, RelationValues};
use treeline_common::vocab::tree;

use crate::path::{discover_relation_path, RelationPath};

const TREE_NS: &str = "https://w3id.org/tree#";
const SHACL_NS: &str = "http://www.w3.org/ns/shacl#";

/// One `tree:relation` found on a page.
#[derive(Debug, Clone)]
pub struct TreeRelation {
    pub relation_types: Vec<NamedNode>,
    /// Target page URLs (`tree:node`).
    pub nodes: Vec<String>,
    /// Advertised values (`tree:value`).
    pub values: Vec<Literal>,
}

/// Everything a page yields before scoring: its relations, the path
/// declaration it carries (if any), and the residual data statements.
#[derive(Debug)]
pub struct PageMetadata {
    pub url: String,
    pub relations: Vec<TreeRelation>,
    pub relation_path: Option<RelationPath>,
    /// Statements that are neither relation metadata nor shape grammar.
    pub data: Vec<Triple>,
}

/// Splits a fetched page into relations, path declaration and data.
pub fn extract_page(url: &str, statements: &[Triple]) -> PageMetadata {
    let mut graph = Graph::new();
    for statement in statements {
        graph.insert(statement);
    }

    let relation_ids: Vec<Subject> = graph
        .iter()
        .filter(|t| t.predicate == tree::RELATION)
        .filter_map(|t| match t.object {
            oxrdf::TermRef::NamedNode(n) => Some(Subject::NamedNode(n.into_owned())),
            oxrdf::TermRef::BlankNode(b) => Some(Subject::BlankNode(b.into_owned())),
            oxrdf::TermRef::Literal(_) => None,
        })
        .collect();

    let mut relations = Vec::with_capacity(relation_ids.len());
    for id in &relation_ids {
        let mut relation = TreeRelation {
            relation_types: Vec::new(),
            nodes: Vec::new(),
            values: Vec::new(),
        };
        for triple in graph.triples_for_subject(id) {
            if triple.predicate == treeline_common::vocab::rdf::TYPE {
                if let oxrdf::TermRef::NamedNode(n) = triple.object {
                    relation.relation_types.push(n.into_owned());
                }
            } else if triple.predicate == tree::NODE {
                if let oxrdf::TermRef::NamedNode(n) = triple.object {
                    relation.nodes.push(n.as_str().to_string());
                }
            } else if triple.predicate == tree::VALUE {
                if let oxrdf::TermRef::Literal(l) = triple.object {
                    relation.values.push(l.into_owned());
                }
            }
        }
        relations.push(relation);
    }

    let relation_path = discover_relation_path(statements);
    let shape: HashSet<&Triple> = match &relation_path {
        Some(path) => statements
            .iter()
            .filter(|t| path.shape.contains(*t))
            .collect(),
        None => HashSet::new(),
    };
    let relation_subjects: HashSet<&Subject> = relation_ids.iter().collect();

    let data: Vec<Triple> = statements
        .iter()
        .filter(|t| !shape.contains(t))
        .filter(|t| !relation_subjects.contains(&t.subject))
        .filter(|t| {
            !t.predicate.as_str().starts_with(TREE_NS)
                && !t.predicate.as_str().starts_with(SHACL_NS)
        })
        .cloned()
        .collect();

    debug!(
        url,
        relations = relations.len(),
        data_statements = data.len(),
        has_path = relation_path.is_some(),
        "Extracted page metadata"
    );

    PageMetadata {
        url: url.to_string(),
        relations,
        relation_path,
        data,
    }
}

/// Turns a page's relations into crawlable locations. A target inherits the
/// values accumulated on the way to this page; values the page advertises
/// for the same relation type replace the inherited ones.
pub fn discover_locations(metadata: &PageMetadata, inherited: &RelationValues) -> Vec<Location> {
    let mut per_url: HashMap<String, RelationValues> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for relation in &metadata.relations {
        for node in &relation.nodes {
            if node == &metadata.url {
                continue;
            }
            if !per_url.contains_key(node) {
                order.push(node.clone());
            }
            let values = per_url.entry(node.clone()).or_default();
            for relation_type in &relation.relation_types {
                values.insert(relation_type.as_str().to_string(), relation.values.clone());
            }
        }
    }

    order
        .into_iter()
        .map(|url| {
            let own = per_url.remove(&url).unwrap_or_default();
            let mut values = inherited.clone();
            values.extend(own);
            Location { url, values }
        })
        .collect()
}

/// Groups data statements by subject, preserving first-seen subject order.
pub fn group_by_subject(data: &[Triple]) -> Vec<(Subject, Vec<Triple>)> {
    let mut order: Vec<Subject> = Vec::new();
    let mut groups: HashMap<Subject, Vec<Triple>> = HashMap::new();
    for statement in data {
        let entry = groups.entry(statement.subject.clone()).or_default();
        if entry.is_empty() {
            order.push(statement.subject.clone());
        }
        entry.push(statement.clone());
    }
    order
        .into_iter()
        .map(|s| {
            let statements = groups.remove(&s).unwrap_or_default();
            (s, statements)
        })
        .collect()
}

/// Stable string key for a subject, used for dedup across pages.
pub fn subject_key(subject: &Subject) -> String {
    match subject {
        Subject::NamedNode(n) => n.as_str().to_string(),
        Subject::BlankNode(b) => format!("_:{}", b.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(turtle: &str) -> Vec<Triple> {
        oxttl::TurtleParser::new()
            .for_reader(turtle.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .expect("valid turtle fixture")
    }

    const PAGE: &str = r#"
        @prefix tree: <https://w3id.org/tree#> .
        @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
        <http://ex.org/page1> tree:relation [
            rdf:type tree:SubstringRelation ;
            tree:node <http://ex.org/page2> ;
            tree:value "par"
        ] .
        <http://ex.org/s> <http://ex.org/name> "paris" .
    "#;

    #[test]
    fn relations_and_data_are_separated() {
        let statements = parse(PAGE);
        let metadata = extract_page("http://ex.org/page1", &statements);

        assert_eq!(metadata.relations.len(), 1);
        let relation = &metadata.relations[0];
        assert_eq!(relation.nodes, vec!["http://ex.org/page2"]);
        assert_eq!(relation.values[0].value(), "par");
        assert_eq!(
            relation.relation_types[0].as_str(),
            tree::SUBSTRING_RELATION.as_str()
        );

        assert_eq!(metadata.data.len(), 1);
        assert_eq!(metadata.data[0].predicate.as_str(), "http://ex.org/name");
    }

    #[test]
    fn locations_carry_relation_values_per_type() {
        let statements = parse(PAGE);
        let metadata = extract_page("http://ex.org/page1", &statements);
        let locations = discover_locations(&metadata, &RelationValues::new());

        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].url, "http://ex.org/page2");
        let values = &locations[0].values[tree::SUBSTRING_RELATION.as_str()];
        assert_eq!(values[0].value(), "par");
    }

    #[test]
    fn child_values_override_inherited_ones_per_type() {
        let statements = parse(PAGE);
        let metadata = extract_page("http://ex.org/page1", &statements);

        let mut inherited = RelationValues::new();
        inherited.insert(
            tree::SUBSTRING_RELATION.as_str().to_string(),
            vec![Literal::new_simple_literal("p")],
        );
        inherited.insert(
            tree::PREFIX_RELATION.as_str().to_string(),
            vec![Literal::new_simple_literal("kept")],
        );

        let locations = discover_locations(&metadata, &inherited);
        let values = &locations[0].values;
        assert_eq!(values[tree::SUBSTRING_RELATION.as_str()][0].value(), "par");
        assert_eq!(values[tree::PREFIX_RELATION.as_str()][0].value(), "kept");
    }

    #[test]
    fn self_links_are_not_locations() {
        let statements = parse(
            r#"@prefix tree: <https://w3id.org/tree#> .
               <http://ex.org/page1> tree:relation [ tree:node <http://ex.org/page1> ] ."#,
        );
        let metadata = extract_page("http://ex.org/page1", &statements);
        assert!(discover_locations(&metadata, &RelationValues::new()).is_empty());
    }

    #[test]
    fn shape_statements_do_not_leak_into_data() {
        let statements = parse(
            r#"@prefix tree: <https://w3id.org/tree#> .
               @prefix sh: <http://www.w3.org/ns/shacl#> .
               <http://ex.org/page1> tree:relation <http://ex.org/r1> .
               <http://ex.org/r1> tree:path [ sh:alternativePath ( <http://ex.org/name> ) ] .
               <http://ex.org/s> <http://ex.org/name> "paris" ."#,
        );
        let metadata = extract_page("http://ex.org/page1", &statements);
        assert!(metadata.relation_path.is_some());
        assert_eq!(metadata.data.len(), 1);
        assert_eq!(metadata.data[0].subject, Subject::NamedNode(
            oxrdf::NamedNode::new_unchecked("http://ex.org/s".to_string()),
        ));
    }

    #[test]
    fn grouping_preserves_subject_order() {
        let statements = parse(
            r#"<http://ex.org/a> <http://ex.org/p> "1" .
               <http://ex.org/b> <http://ex.org/p> "2" .
               <http://ex.org/a> <http://ex.org/q> "3" ."#,
        );
        let groups = group_by_subject(&statements);
        assert_eq!(groups.len(), 2);
        assert_eq!(subject_key(&groups[0].0), "http://ex.org/a");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(subject_key(&groups[1].0), "http://ex.org/b");
    }
}
