//! Loading of cohort tables.
//!
//! These are thin, column-indexed TSV readers that produce the plain
//! in-memory mappings consumed by the ontology engine: per-person phenotype
//! term sets, the person alternate-ID remapping, and gene-to-phenotype
//! assignments.

use crate::ontology::TermId;

/// Split a multi-term field into term identifiers.
///
/// Terms are joined with `delimiter`; a single `.` means that no terms were
/// recorded.
fn parse_term_field(value: &str, delimiter: char) -> Result<Vec<TermId>, anyhow::Error> {
    let value = value.trim();
    if value.is_empty() || value == "." {
        return Ok(Vec::new());
    }
    value
        .split(delimiter)
        .map(|s| {
            s.trim()
                .parse::<TermId>()
                .map_err(|e| anyhow::anyhow!("invalid term in field {:?}: {}", value, e))
        })
        .collect()
}

/// Code for reading the participant phenotype table.
pub mod phenotypes {
    use indexmap::IndexMap;
    use std::collections::HashMap;

    use crate::ontology::TermId;

    /// Data structure for representing an entry of the table.
    #[derive(Debug, Clone, serde::Deserialize)]
    pub struct Entry {
        /// Participant identifier.
        pub patient_id: String,
        /// HPO terms of the proband, `|`-joined, `.` if none recorded.
        pub child_hpo: String,
        /// HPO terms of the mother.
        pub maternal_hpo: String,
        /// HPO terms of the father.
        pub paternal_hpo: String,
    }

    /// Read the participant phenotype table using the `csv` crate via serde.
    ///
    /// # Errors
    ///
    /// In the case that the file could not be read.
    pub fn load_entries<P: AsRef<std::path::Path>>(path: &P) -> Result<Vec<Entry>, anyhow::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(path.as_ref())?;
        let mut entries = Vec::new();
        for result in rdr.deserialize() {
            let entry: Entry = result?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Read the table into a map from person identifier to the proband's
    /// term identifiers.
    ///
    /// Person identifiers found in `person_id_map` are replaced by their
    /// mapped study identifier first.  Participants without recorded proband
    /// terms are skipped.
    pub fn load_child_terms<P: AsRef<std::path::Path>>(
        path: &P,
        person_id_map: &HashMap<String, String>,
    ) -> Result<IndexMap<String, Vec<TermId>>, anyhow::Error> {
        let mut result = IndexMap::new();
        for entry in load_entries(path)? {
            let person_id = person_id_map
                .get(&entry.patient_id)
                .cloned()
                .unwrap_or(entry.patient_id);
            let term_ids = super::parse_term_field(&entry.child_hpo, '|')?;
            if term_ids.is_empty() {
                tracing::debug!("no proband terms recorded for {}", person_id);
                continue;
            }
            result.insert(person_id, term_ids);
        }
        Ok(result)
    }
}

/// Code for reading the person alternate-ID remapping table.
pub mod person_ids {
    use std::collections::HashMap;

    /// Read the two-column (study ID, submitted ID) table into a map from
    /// submitted identifier to study identifier.
    ///
    /// # Errors
    ///
    /// In the case that the file could not be read.
    pub fn load_map<P: AsRef<std::path::Path>>(
        path: &P,
    ) -> Result<HashMap<String, String>, anyhow::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_path(path.as_ref())?;
        let mut result = HashMap::new();
        for record in rdr.deserialize() {
            let (study_id, submitted_id): (String, String) = record?;
            result.insert(submitted_id, study_id);
        }
        Ok(result)
    }
}

/// Code for reading the gene-to-phenotype table.
pub mod gene_phenotypes {
    use indexmap::{IndexMap, IndexSet};

    use crate::ontology::TermId;

    /// Data structure for representing an entry of the table.
    #[derive(Debug, Clone, serde::Deserialize)]
    pub struct Entry {
        /// Gene symbol.
        #[serde(rename = "gencode_gene_name")]
        pub gene_symbol: String,
        /// Required allelic state.
        #[serde(rename = "Allelic_requirement")]
        pub allelic_requirement: String,
        /// Characteristic HPO terms, `;`-joined.
        #[serde(rename = "HPO_ids")]
        pub hpo_ids: String,
    }

    /// Read the gene-to-phenotype table using the `csv` crate via serde.
    ///
    /// # Errors
    ///
    /// In the case that the file could not be read.
    pub fn load_entries<P: AsRef<std::path::Path>>(path: &P) -> Result<Vec<Entry>, anyhow::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(path.as_ref())?;
        let mut entries = Vec::new();
        for result in rdr.deserialize() {
            let entry: Entry = result?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Read the table into a map from gene symbol to the union of its
    /// characteristic terms over all allelic requirements.
    pub fn load_gene_terms<P: AsRef<std::path::Path>>(
        path: &P,
    ) -> Result<IndexMap<String, Vec<TermId>>, anyhow::Error> {
        let mut sets: IndexMap<String, IndexSet<TermId>> = IndexMap::new();
        for entry in load_entries(path)? {
            let term_ids = super::parse_term_field(&entry.hpo_ids, ';')?;
            sets.entry(entry.gene_symbol)
                .or_default()
                .extend(term_ids);
        }
        Ok(sets
            .into_iter()
            .map(|(gene, terms)| (gene, terms.into_iter().collect()))
            .collect())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::ontology::TermId;

    fn t(s: &str) -> TermId {
        s.parse().expect("valid term id")
    }

    #[rstest::rstest]
    #[case(".", '|', 0)]
    #[case("", '|', 0)]
    #[case("HP:0000924", '|', 1)]
    #[case("HP:0000118|HP:0002011", '|', 2)]
    #[case("HP:0000707;HP:0002011", ';', 2)]
    #[case(" HP:0000707 ; HP:0002011 ", ';', 2)]
    fn parse_term_field(#[case] value: &str, #[case] delimiter: char, #[case] expected: usize) {
        let term_ids = super::parse_term_field(value, delimiter).unwrap();
        assert_eq!(term_ids.len(), expected);
    }

    #[test]
    fn parse_term_field_rejects_malformed() {
        assert!(super::parse_term_field("HP:0000924|bogus", '|').is_err());
    }

    #[test]
    fn person_ids_load_map() -> Result<(), anyhow::Error> {
        let map = super::person_ids::load_map(&"tests/data/alt_ids.tsv")?;

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("260128"), Some(&"person_03".to_string()));

        Ok(())
    }

    #[test]
    fn phenotypes_load_entries() -> Result<(), anyhow::Error> {
        let entries = super::phenotypes::load_entries(&"tests/data/phenotypes.tsv")?;

        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].patient_id, "person_01");
        assert_eq!(entries[1].child_hpo, "HP:0000118|HP:0002011");
        assert_eq!(entries[1].maternal_hpo, "HP:0000924");

        Ok(())
    }

    #[test]
    fn phenotypes_load_child_terms() -> Result<(), anyhow::Error> {
        let person_id_map = super::person_ids::load_map(&"tests/data/alt_ids.tsv")?;
        let cohort =
            super::phenotypes::load_child_terms(&"tests/data/phenotypes.tsv", &person_id_map)?;

        // person_04 has no proband terms and is skipped
        assert_eq!(cohort.len(), 3);
        assert_eq!(cohort["person_01"], vec![t("HP:0000924")]);
        assert_eq!(
            cohort["person_02"],
            vec![t("HP:0000118"), t("HP:0002011")]
        );
        // 260128 is remapped to the study identifier
        assert_eq!(
            cohort["person_03"],
            vec![t("HP:0000707"), t("HP:0002011")]
        );

        Ok(())
    }

    #[test]
    fn gene_phenotypes_load_gene_terms() -> Result<(), anyhow::Error> {
        let genes = super::gene_phenotypes::load_gene_terms(&"tests/data/genes.tsv")?;

        assert_eq!(genes.len(), 2);
        // union over both allelic requirements
        assert_eq!(
            genes["ARID1B"],
            vec![t("HP:0000707"), t("HP:0002011"), t("HP:0001250")]
        );
        assert_eq!(genes["MECP2"], vec![t("HP:0000924")]);

        Ok(())
    }
}
