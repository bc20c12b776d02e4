//! Loading of `hp.obo`-style term definition files.
//!
//! Only the fields needed to obtain the term graph are interpreted: `id`,
//! `name`, `is_a`, `alt_id`, `is_obsolete`, and `replaced_by`.  Everything
//! else (definitions, synonyms, xrefs, `[Typedef]` stanzas) is skipped.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};

use super::{Ontology, OntologyError, Term, TermId};

/// One `[Term]` stanza as read from the file, before link resolution.
#[derive(Debug, Default)]
struct Stanza {
    id: Option<TermId>,
    name: Option<String>,
    parents: Vec<TermId>,
    alt_ids: Vec<TermId>,
    obsolete: bool,
    replaced_by: Option<TermId>,
}

/// Load an ontology from a term definition file (transparently gzipped if
/// the path ends in `.gz`).
pub fn load<P: AsRef<Path>>(path: P) -> Result<Ontology, OntologyError> {
    tracing::debug!("loading term definitions from {:?}", path.as_ref());
    let reader = crate::common::io::open_read_maybe_gz(path)?;
    from_reader(reader)
}

/// Load an ontology from a reader over term definition text.
pub fn from_reader<R: BufRead>(reader: R) -> Result<Ontology, OntologyError> {
    let stanzas = parse_stanzas(reader)?;
    build(stanzas)
}

/// Split the input into `[Term]` stanzas and collect the relevant fields.
fn parse_stanzas<R: BufRead>(reader: R) -> Result<Vec<Stanza>, OntologyError> {
    let mut stanzas = Vec::new();
    let mut current: Option<Stanza> = None;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line == "[Term]" {
            if let Some(stanza) = current.take() {
                stanzas.push(stanza);
            }
            current = Some(Stanza::default());
        } else if line.starts_with('[') {
            // some other stanza kind, e.g. [Typedef]
            if let Some(stanza) = current.take() {
                stanzas.push(stanza);
            }
        } else if let Some(stanza) = current.as_mut() {
            if let Some((key, value)) = line.split_once(':') {
                apply_field(stanza, key, value.trim())?;
            }
        }
    }
    if let Some(stanza) = current.take() {
        stanzas.push(stanza);
    }
    Ok(stanzas)
}

/// Interpret a single `key: value` line of a `[Term]` stanza.
fn apply_field(stanza: &mut Stanza, key: &str, value: &str) -> Result<(), OntologyError> {
    match key {
        "id" => stanza.id = Some(value.parse()?),
        "name" => stanza.name = Some(value.to_string()),
        "is_a" => {
            // strip the trailing `! human-readable name` comment
            let target = value.split('!').next().unwrap_or_default().trim();
            stanza.parents.push(target.parse()?);
        }
        "alt_id" => stanza.alt_ids.push(value.parse()?),
        "is_obsolete" => stanza.obsolete = value == "true",
        "replaced_by" => stanza.replaced_by = Some(value.parse()?),
        _ => (),
    }
    Ok(())
}

/// Assemble the graph: record terms, flatten the alias map, resolve parent
/// links, and hand over to [`Ontology::new`] for root detection and ancestor
/// closure computation.
fn build(stanzas: Vec<Stanza>) -> Result<Ontology, OntologyError> {
    let mut terms: IndexMap<TermId, Term> = IndexMap::with_capacity(stanzas.len());
    let mut raw_parents: IndexMap<TermId, Vec<TermId>> = IndexMap::with_capacity(stanzas.len());
    let mut alias: HashMap<TermId, TermId> = HashMap::new();

    for stanza in stanzas {
        let id = stanza
            .id
            .ok_or_else(|| OntologyError::InvalidObo("term stanza without id".to_string()))?;
        let name = stanza
            .name
            .ok_or_else(|| OntologyError::InvalidObo(format!("term {} has no name", id)))?;
        if terms.contains_key(&id) {
            return Err(OntologyError::InvalidObo(format!(
                "duplicate definition of term {}",
                id
            )));
        }

        for alt_id in stanza.alt_ids {
            alias.insert(alt_id, id);
        }
        if stanza.obsolete {
            // an obsolete term with a replacement becomes an alias for it
            if let Some(replacement) = stanza.replaced_by {
                alias.insert(id, replacement);
            }
        }

        raw_parents.insert(id, stanza.parents);
        terms.insert(
            id,
            Term {
                id,
                name,
                parents: IndexSet::new(),
                count: 0,
                obsolete: stanza.obsolete,
            },
        );
    }

    // Flatten replacement chains once so query-time normalization is a
    // single lookup.
    let alias = alias
        .keys()
        .map(|&start| (start, follow_chain(start, &alias)))
        .collect::<HashMap<_, _>>();

    // Resolve the parent links of live terms through the alias map; each
    // resolved parent must itself be a live term.
    for (id, parents) in raw_parents {
        if terms.get(&id).map(|term| term.obsolete).unwrap_or(true) {
            continue;
        }
        let mut resolved = IndexSet::new();
        for parent in parents {
            let canonical = alias.get(&parent).copied().unwrap_or(parent);
            match terms.get(&canonical) {
                Some(parent_term) if !parent_term.obsolete => {
                    resolved.insert(canonical);
                }
                _ => return Err(OntologyError::DanglingParent { term: id, parent }),
            }
        }
        terms
            .get_mut(&id)
            .expect("term was inserted in the first pass")
            .parents = resolved;
    }

    Ontology::new(terms, alias)
}

/// Follow an alias/replacement chain to its end, guarding against loops.
///
/// A loop leaves the chain at the last identifier before the repeat, which
/// then surfaces as an obsolete/unknown term at lookup time.
fn follow_chain(start: TermId, alias: &HashMap<TermId, TermId>) -> TermId {
    let mut seen = IndexSet::new();
    let mut current = start;
    while let Some(&next) = alias.get(&current) {
        if next == current || !seen.insert(current) {
            break;
        }
        current = next;
    }
    current
}
