//! Error type for ontology construction and queries.

use super::TermId;

/// Errors that can occur when building or querying the ontology.
///
/// The variants fall into two groups.  Construction errors
/// ([`Io`](OntologyError::Io), [`InvalidObo`](OntologyError::InvalidObo),
/// [`InvalidTermId`](OntologyError::InvalidTermId),
/// [`DanglingParent`](OntologyError::DanglingParent),
/// [`CycleDetected`](OntologyError::CycleDetected),
/// [`NoUniqueRoot`](OntologyError::NoUniqueRoot)) are fatal; the graph cannot
/// be used and callers should abort.  Query errors
/// ([`UnknownTerm`](OntologyError::UnknownTerm),
/// [`ObsoleteTerm`](OntologyError::ObsoleteTerm),
/// [`UntalliedTerm`](OntologyError::UntalliedTerm)) are per-data-point and
/// callers may skip or flag the offending record.
#[derive(thiserror::Error, Debug)]
pub enum OntologyError {
    /// Problem reading the term definition file.
    #[error("problem reading term definitions: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed term identifier, e.g. missing `HP:` prefix.
    #[error("invalid term identifier: {0:?}")]
    InvalidTermId(String),
    /// Malformed stanza in the term definition file.
    #[error("invalid term definition input: {0}")]
    InvalidObo(String),
    /// A term references a parent that is not a usable term.
    #[error("term {term} references undefined or obsolete parent {parent}")]
    DanglingParent {
        /// The term carrying the reference.
        term: TermId,
        /// The referenced parent.
        parent: TermId,
    },
    /// The parent links contain a cycle, so no ancestor closure exists.
    #[error("cycle in parent links involving term {0}")]
    CycleDetected(TermId),
    /// The ontology does not contain exactly one term without parents.
    #[error("expected exactly one root term, found {0:?}")]
    NoUniqueRoot(Vec<TermId>),
    /// The identifier does not resolve to any term in the graph.
    #[error("unknown term: {0}")]
    UnknownTerm(TermId),
    /// The identifier resolves to an obsolete term without replacement.
    #[error("term {0} is obsolete and has no replacement")]
    ObsoleteTerm(TermId),
    /// The term has never been tallied, so its information content is
    /// undefined (the frequency ratio is zero).
    #[error("term {0} has a zero usage count, information content is undefined")]
    UntalliedTerm(TermId),
}
