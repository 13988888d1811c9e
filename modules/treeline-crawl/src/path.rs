//! SHACL property-path evaluation over a page's data graph.
//!
//! The supported subset: predicate paths, sequence paths (RDF lists),
//! `sh:alternativePath` and `sh:inversePath`, nested arbitrarily. The path
//! declaration itself lives in a shape graph lifted from the page; data
//! traversal happens against the page's data graph.

use std::collections::HashSet;

use oxrdf::{Graph, Subject, Term, TermRef, Triple};

use treeline_common::vocab::{rdf, sh, tree};
use treeline_common::TreelineError;

/// Recursion bound for shape traversal. A well-formed path declaration is
/// shallow; hitting this means the shape graph is cyclic.
pub const MAX_PATH_DEPTH: usize = 64;

/// A path declaration captured from a page: the subject carrying the
/// `sh:path`/`tree:path` statement plus the closure of shape statements
/// reachable from it. Cached once per crawl and reused on every later page.
#[derive(Debug, Clone)]
pub struct RelationPath {
    pub entry: Subject,
    pub shape: Graph,
}

/// Lifts the first path declaration out of a page, if the page carries one.
/// The shape graph is the closure of statements reachable from the
/// declaration's object, so list cells and nested alternatives come along.
pub fn discover_relation_path(statements: &[Triple]) -> Option<RelationPath> {
    let declaration = statements.iter().find(|t| {
        t.predicate.as_ref() == tree::PATH || t.predicate.as_ref() == sh::PATH
    })?;

    let mut shape = Graph::new();
    shape.insert(declaration);

    let mut queue = vec![declaration.object.clone()];
    let mut seen: HashSet<Term> = HashSet::new();
    while let Some(term) = queue.pop() {
        if !seen.insert(term.clone()) {
            continue;
        }
        for statement in statements {
            if Term::from(statement.subject.clone()) == term {
                shape.insert(statement);
                queue.push(statement.object.clone());
            }
        }
    }

    Some(RelationPath {
        entry: declaration.subject.clone(),
        shape,
    })
}

/// One intermediate evaluation state: where we are in the shape graph and
/// the set of data terms reached so far.
struct PathMapping {
    shape_term: Term,
    data_terms: Vec<Term>,
}

/// Evaluates the declared path starting from `start` and returns every term
/// reachable over it. When `path_entry` is given only that declaration is
/// used; otherwise the first `sh:path`/`tree:path` statement in the shape
/// graph is.
pub fn evaluate_path(
    data: &Graph,
    shape: &Graph,
    start: &Subject,
    path_entry: Option<&Subject>,
) -> Result<Vec<Term>, TreelineError> {
    let path_root = match path_entry {
        Some(entry) => first_declared_path(shape, Some(entry)),
        None => first_declared_path(shape, None),
    };
    let Some(path_root) = path_root else {
        return Err(TreelineError::Path(
            "no sh:path or tree:path declaration in the shape graph".to_string(),
        ));
    };

    let mapping = PathMapping {
        shape_term: path_root,
        data_terms: vec![Term::from(start.clone())],
    };

    let mut results = Vec::new();
    for resolved in process_path(data, shape, mapping, false, false, 0)? {
        results.extend(resolved.data_terms);
    }
    Ok(results)
}

fn first_declared_path(shape: &Graph, entry: Option<&Subject>) -> Option<Term> {
    match entry {
        Some(entry) => shape
            .objects_for_subject_predicate(entry, sh::PATH)
            .next()
            .or_else(|| shape.objects_for_subject_predicate(entry, tree::PATH).next())
            .map(|t| t.into_owned()),
        None => shape
            .iter()
            .find(|t| t.predicate == sh::PATH || t.predicate == tree::PATH)
            .map(|t| t.object.into_owned()),
    }
}

/// Walks one shape position. `inverted` flips predicate traversal;
/// `alternative` marks that we are inside an `sh:alternativePath` list, where
/// list tails union with heads instead of composing after them.
fn process_path(
    data: &Graph,
    shape: &Graph,
    mapping: PathMapping,
    inverted: bool,
    alternative: bool,
    depth: usize,
) -> Result<Vec<PathMapping>, TreelineError> {
    if depth >= MAX_PATH_DEPTH {
        return Err(TreelineError::Path(format!(
            "path shape exceeds depth {MAX_PATH_DEPTH}; the shape graph is cyclic"
        )));
    }

    let subject = subject_of(&mapping.shape_term);
    let shape_triples: Vec<Triple> = match &subject {
        Some(s) => shape
            .triples_for_subject(s)
            .map(|t| t.into_owned())
            .collect(),
        None => Vec::new(),
    };

    let mut results = Vec::new();
    let mut recognized = false;
    for statement in &shape_triples {
        let predicate = statement.predicate.as_ref();
        if predicate == sh::INVERSE_PATH {
            recognized = true;
            let next = PathMapping {
                shape_term: statement.object.clone(),
                data_terms: mapping.data_terms.clone(),
            };
            results.extend(process_path(data, shape, next, !inverted, false, depth + 1)?);
        } else if predicate == sh::ALTERNATIVE_PATH {
            recognized = true;
            let next = PathMapping {
                shape_term: statement.object.clone(),
                data_terms: mapping.data_terms.clone(),
            };
            results.extend(process_path(data, shape, next, inverted, true, depth + 1)?);
        } else if predicate == rdf::FIRST {
            recognized = true;
            results.extend(process_sequence(
                data,
                shape,
                &mapping,
                &statement.object,
                inverted,
                alternative,
                depth + 1,
            )?);
        }
    }

    if !recognized {
        // Leaf position: a plain predicate path
        return Ok(vec![predicate_path(data, &mapping, inverted)?]);
    }
    Ok(results)
}

/// A list cell: evaluate the head, then the tail. Inside an alternative
/// list the tail restarts from the cell's input terms and the results
/// union; in a sequence the tail composes onto each head result.
fn process_sequence(
    data: &Graph,
    shape: &Graph,
    mapping: &PathMapping,
    head: &Term,
    inverted: bool,
    alternative: bool,
    depth: usize,
) -> Result<Vec<PathMapping>, TreelineError> {
    let head_mapping = PathMapping {
        shape_term: head.clone(),
        data_terms: mapping.data_terms.clone(),
    };
    // The alternative flag never crosses into a head: a sequence nested
    // inside an alternative still composes internally
    let head_results = process_path(data, shape, head_mapping, inverted, false, depth)?;

    let rest = subject_of(&mapping.shape_term)
        .and_then(|s| {
            shape
                .objects_for_subject_predicate(&s, rdf::REST)
                .next()
                .map(|t| t.into_owned())
        })
        .filter(|t| t.as_ref() != TermRef::NamedNode(rdf::NIL));

    let Some(rest) = rest else {
        return Ok(head_results);
    };

    let mut results = Vec::new();
    if alternative {
        results.extend(head_results);
        let tail_mapping = PathMapping {
            shape_term: rest,
            data_terms: mapping.data_terms.clone(),
        };
        results.extend(process_path(data, shape, tail_mapping, inverted, true, depth)?);
    } else {
        for head_result in head_results {
            let tail_mapping = PathMapping {
                shape_term: rest.clone(),
                data_terms: head_result.data_terms,
            };
            results.extend(process_path(data, shape, tail_mapping, inverted, false, depth)?);
        }
    }
    Ok(results)
}

/// Follows one predicate through the data graph, forward or inverted.
fn predicate_path(
    data: &Graph,
    mapping: &PathMapping,
    inverted: bool,
) -> Result<PathMapping, TreelineError> {
    let Term::NamedNode(predicate) = &mapping.shape_term else {
        return Err(TreelineError::Path(format!(
            "path position {} is not a usable predicate",
            mapping.shape_term
        )));
    };

    let mut data_terms = Vec::new();
    for term in &mapping.data_terms {
        if inverted {
            for subject in data.subjects_for_predicate_object(predicate, term) {
                data_terms.push(Term::from(subject.into_owned()));
            }
        } else if let Some(subject) = subject_of(term) {
            for object in data.objects_for_subject_predicate(&subject, predicate) {
                data_terms.push(object.into_owned());
            }
        }
        // A literal cannot be a subject; forward traversal just drops it
    }

    Ok(PathMapping {
        shape_term: mapping.shape_term.clone(),
        data_terms,
    })
}

fn subject_of(term: &Term) -> Option<Subject> {
    match term {
        Term::NamedNode(n) => Some(Subject::NamedNode(n.clone())),
        Term::BlankNode(b) => Some(Subject::BlankNode(b.clone())),
        Term::Literal(_) => None,
    }
}
