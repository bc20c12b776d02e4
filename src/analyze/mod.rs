//! Implementation of the `analyze` sub commands.

use std::collections::HashMap;
use std::time::Instant;

use indexmap::IndexMap;

use crate::cohort;
use crate::ontology::{obo, Ontology, TermId};

pub mod gene_score;
pub mod pairwise;
pub mod term_ic;

/// Load the ontology and the cohort phenotypes, then tally the cohort.
///
/// Shared by all `analyze` sub commands; after this the graph structure and
/// counts are frozen and queries are read-only.
pub(crate) fn load_and_tally(
    path_hpo_obo: &str,
    path_phenotypes: &str,
    path_person_ids: Option<&str>,
) -> Result<(Ontology, IndexMap<String, Vec<TermId>>), anyhow::Error> {
    tracing::info!("loading ontology from {}...", path_hpo_obo);
    let before = Instant::now();
    let mut ontology = obo::load(path_hpo_obo)
        .map_err(|e| anyhow::anyhow!("error loading {}: {}", path_hpo_obo, e))?;
    tracing::info!(
        "...done loading {} terms in {:?}",
        ontology.terms().count(),
        before.elapsed()
    );

    let person_id_map = if let Some(path) = path_person_ids {
        cohort::person_ids::load_map(&path)
            .map_err(|e| anyhow::anyhow!("error loading {}: {}", path, e))?
    } else {
        HashMap::new()
    };
    let cohort = cohort::phenotypes::load_child_terms(&path_phenotypes, &person_id_map)
        .map_err(|e| anyhow::anyhow!("error loading {}: {}", path_phenotypes, e))?;
    tracing::info!("loaded phenotypes for {} probands", cohort.len());

    let num_tallied = ontology.tally_cohort(&cohort);
    tracing::info!("tallied {} cohort members", num_tallied);

    Ok((ontology, cohort))
}

/// Normalize identifiers and drop those that do not resolve to a usable
/// term, warning per dropped identifier.
pub(crate) fn resolve_usable(
    ontology: &Ontology,
    term_ids: &[TermId],
    label: &str,
) -> Vec<TermId> {
    term_ids
        .iter()
        .filter_map(|&term_id| match ontology.canonical_id(term_id) {
            Ok(canonical) => Some(canonical),
            Err(e) => {
                tracing::warn!("dropping term {} of {}: {}", term_id, label, e);
                None
            }
        })
        .collect()
}
