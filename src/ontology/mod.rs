//! The HPO term graph with cohort usage counters.
//!
//! The graph is built once from a term definition file (see [`obo`]), then
//! populated with usage counts from a cohort of per-person term sets via
//! [`Ontology::tally_cohort`], and finally queried read-only for counts and
//! information content (see [`similarity`]).

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

pub mod error;
pub mod obo;
pub mod similarity;

pub use error::OntologyError;

/// Identifier of an HPO term, e.g. `HP:0000118`.
///
/// Internally stored as the numeric part of the identifier.  Use
/// [`str::parse`] to construct one from its text form:
///
/// ```text
/// let term_id: TermId = "HP:0000118".parse()?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(u32);

impl std::str::FromStr for TermId {
    type Err = OntologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("HP:")
            .ok_or_else(|| OntologyError::InvalidTermId(s.to_string()))?;
        if digits.len() != 7 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OntologyError::InvalidTermId(s.to_string()));
        }
        digits
            .parse()
            .map(Self)
            .map_err(|_| OntologyError::InvalidTermId(s.to_string()))
    }
}

impl std::fmt::Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HP:{:07}", self.0)
    }
}

/// A single term of the ontology.
///
/// Terms are owned by the [`Ontology`]; the usage count is only mutated
/// through [`Ontology::tally_cohort`].
#[derive(Debug, Clone)]
pub struct Term {
    /// Canonical identifier.
    id: TermId,
    /// Human-readable name.
    name: String,
    /// Identifiers of the direct `is_a` parents; empty only for the root.
    parents: IndexSet<TermId>,
    /// Number of cohort members whose ancestor closure contains this term.
    count: u64,
    /// Whether the term is marked obsolete.
    obsolete: bool,
}

impl Term {
    /// The canonical identifier.
    pub fn id(&self) -> TermId {
        self.id
    }

    /// The human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The direct parent identifiers.
    pub fn parents(&self) -> &IndexSet<TermId> {
        &self.parents
    }

    /// The current usage count.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether the term is obsolete.
    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }
}

/// The directed acyclic graph of HPO terms.
///
/// Edges point from child to parent (`is_a`).  A term may have multiple
/// parents, so ancestor sets are computed as unions over all parent paths.
/// The structure is immutable after construction; only the usage counters
/// change, and only through [`Ontology::tally_cohort`] /
/// [`Ontology::reset_counts`].
#[derive(Debug, Clone)]
pub struct Ontology {
    /// All terms by canonical identifier, obsolete ones included.
    terms: IndexMap<TermId, Term>,
    /// Flat map from alternate/obsolete identifier to canonical identifier.
    alias: HashMap<TermId, TermId>,
    /// The unique term without parents.
    root: TermId,
    /// Memoized ancestor closure (including the term itself) per live term.
    ancestors: HashMap<TermId, IndexSet<TermId>>,
}

impl Ontology {
    /// Assemble the graph from fully resolved terms and the flat alias map.
    ///
    /// Determines the root and computes all ancestor closures; fails if there
    /// is no unique root or the parent links contain a cycle.
    pub(crate) fn new(
        terms: IndexMap<TermId, Term>,
        alias: HashMap<TermId, TermId>,
    ) -> Result<Self, OntologyError> {
        let roots = terms
            .values()
            .filter(|term| !term.obsolete && term.parents.is_empty())
            .map(|term| term.id)
            .collect::<Vec<_>>();
        if roots.len() != 1 {
            return Err(OntologyError::NoUniqueRoot(roots));
        }
        let root = roots[0];

        let mut result = Self {
            terms,
            alias,
            root,
            ancestors: HashMap::new(),
        };
        result.build_ancestor_closures()?;
        Ok(result)
    }

    /// Compute the ancestor closure of every live term.
    ///
    /// Uses a visited set so traversal terminates on any input; a term that
    /// is reached again while its own closure is still being computed means
    /// the parent links contain a cycle, which is a fatal construction error.
    fn build_ancestor_closures(&mut self) -> Result<(), OntologyError> {
        let mut closures = HashMap::with_capacity(self.terms.len());
        let live = self
            .terms
            .values()
            .filter(|term| !term.obsolete)
            .map(|term| term.id)
            .collect::<Vec<_>>();
        let mut in_progress = IndexSet::new();
        for term_id in live {
            self.closure_of(term_id, &mut closures, &mut in_progress)?;
        }
        self.ancestors = closures;
        Ok(())
    }

    /// Compute the closure of `term_id` into `closures`, recursing into
    /// parents first so their closures can be unioned in.
    fn closure_of(
        &self,
        term_id: TermId,
        closures: &mut HashMap<TermId, IndexSet<TermId>>,
        in_progress: &mut IndexSet<TermId>,
    ) -> Result<(), OntologyError> {
        if closures.contains_key(&term_id) {
            return Ok(());
        }
        if !in_progress.insert(term_id) {
            return Err(OntologyError::CycleDetected(term_id));
        }

        let mut closure = IndexSet::new();
        closure.insert(term_id);
        let parents = self
            .terms
            .get(&term_id)
            .expect("closures are only computed for known terms")
            .parents
            .clone();
        for parent in parents {
            self.closure_of(parent, closures, in_progress)?;
            let parent_closure = closures
                .get(&parent)
                .expect("parent closure was just computed");
            closure.extend(parent_closure.iter().copied());
        }

        in_progress.swap_remove(&term_id);
        closures.insert(term_id, closure);
        Ok(())
    }

    /// Normalize an identifier through the alias map and check that it names
    /// a usable term.
    ///
    /// Returns the canonical identifier, or [`OntologyError::UnknownTerm`] if
    /// the normalized identifier is absent from the graph, or
    /// [`OntologyError::ObsoleteTerm`] if it names an obsolete term without
    /// replacement.
    pub fn canonical_id(&self, term_id: TermId) -> Result<TermId, OntologyError> {
        let canonical = self.alias.get(&term_id).copied().unwrap_or(term_id);
        match self.terms.get(&canonical) {
            None => Err(OntologyError::UnknownTerm(term_id)),
            Some(term) if term.obsolete => Err(OntologyError::ObsoleteTerm(canonical)),
            Some(_) => Ok(canonical),
        }
    }

    /// Access a term record, normalizing the identifier first.
    pub fn term(&self, term_id: TermId) -> Result<&Term, OntologyError> {
        let canonical = self.canonical_id(term_id)?;
        Ok(self
            .terms
            .get(&canonical)
            .expect("canonical identifiers resolve to existing terms"))
    }

    /// The current usage count of a term, 0 if it was never tallied.
    pub fn term_count(&self, term_id: TermId) -> Result<u64, OntologyError> {
        self.term(term_id).map(|term| term.count)
    }

    /// The ancestor closure of a term: the term itself plus every term
    /// reachable by following parent links up to the root.
    pub fn ancestors_of(&self, term_id: TermId) -> Result<&IndexSet<TermId>, OntologyError> {
        let canonical = self.canonical_id(term_id)?;
        Ok(self
            .ancestors
            .get(&canonical)
            .expect("every live term has a memoized closure"))
    }

    /// The root term identifier.
    pub fn root(&self) -> TermId {
        self.root
    }

    /// The number of cohort members tallied so far.
    ///
    /// Every member's ancestor closure contains the root, so this is simply
    /// the root's usage count.
    pub fn cohort_size(&self) -> u64 {
        self.terms
            .get(&self.root)
            .expect("root is a known term")
            .count
    }

    /// Iterate over the live (non-obsolete) terms of the graph.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.values().filter(|term| !term.obsolete)
    }

    /// Iterate over the identifiers of obsolete terms.
    pub fn obsolete_terms(&self) -> impl Iterator<Item = TermId> + '_ {
        self.terms
            .values()
            .filter(|term| term.obsolete)
            .map(|term| term.id)
    }

    /// The flat map from alternate/obsolete identifiers to canonical ones.
    pub fn aliases(&self) -> &HashMap<TermId, TermId> {
        &self.alias
    }

    /// Tally term usage over a cohort of per-person term sets.
    ///
    /// For each person the union of the ancestor closures of all asserted
    /// terms is computed first, so a person contributes at most +1 to any
    /// single term's count: shared ancestors of two asserted terms, a term
    /// asserted alongside one of its own ancestors, and diamond-shaped parent
    /// paths are all counted once.
    ///
    /// Identifiers that do not resolve to a usable term are skipped with a
    /// warning; persons whose resolved term set is empty are not counted.
    /// Returns the number of members tallied.  Calling this repeatedly
    /// accumulates counts (for incremental cohorts); use
    /// [`Ontology::reset_counts`] to start over.
    pub fn tally_cohort(&mut self, cohort: &IndexMap<String, Vec<TermId>>) -> usize {
        let mut num_tallied = 0;
        for (person, term_ids) in cohort {
            let mut closure_union: IndexSet<TermId> = IndexSet::new();
            for &term_id in term_ids {
                match self.ancestors_of(term_id) {
                    Ok(closure) => closure_union.extend(closure.iter().copied()),
                    Err(e) => {
                        tracing::warn!("skipping term {} of {}: {}", term_id, person, e);
                    }
                }
            }
            if closure_union.is_empty() {
                tracing::warn!("person {} has no usable terms, not tallied", person);
                continue;
            }
            for term_id in closure_union {
                let term = self
                    .terms
                    .get_mut(&term_id)
                    .expect("closures only contain known terms");
                term.count += 1;
            }
            num_tallied += 1;
        }
        num_tallied
    }

    /// Reset all usage counts to zero.
    pub fn reset_counts(&mut self) {
        for term in self.terms.values_mut() {
            term.count = 0;
        }
    }
}
