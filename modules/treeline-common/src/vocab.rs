//! IRI constants for the vocabularies the crawler understands.

use oxrdf::NamedNodeRef;

/// TREE hypermedia vocabulary.
pub mod tree {
    use super::NamedNodeRef;

    pub const PATH: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://w3id.org/tree#path");
    pub const NODE: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://w3id.org/tree#node");
    pub const VALUE: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://w3id.org/tree#value");
    pub const RELATION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://w3id.org/tree#relation");
    pub const SUBSTRING_RELATION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://w3id.org/tree#SubstringRelation");
    pub const PREFIX_RELATION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://w3id.org/tree#PrefixRelation");
}

/// The SHACL property-path subset the path evaluator interprets.
pub mod sh {
    use super::NamedNodeRef;

    pub const PATH: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#path");
    pub const INVERSE_PATH: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#inversePath");
    pub const ALTERNATIVE_PATH: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#alternativePath");
}

pub use oxrdf::vocab::rdf;
pub use oxrdf::vocab::xsd;
