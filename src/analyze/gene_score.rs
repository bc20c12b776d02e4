//! Implementation of the `analyze gene-score` sub command.

use std::io::Write;

use clap::Parser;
use rayon::prelude::*;
use tracing::info;

use crate::cohort;
use crate::common::io::open_write_maybe_gz;

/// Command line arguments for `analyze gene-score` sub command.
#[derive(Parser, Debug)]
#[command(about = "Score each proband's term set against candidate gene term sets", long_about = None)]
pub struct Args {
    /// Path to the HPO term definition file, plain or gzipped.
    #[arg(long, required = true)]
    pub path_hpo_obo: String,
    /// Path to the participant phenotype table.
    #[arg(long, required = true)]
    pub path_phenotypes: String,
    /// Path to the person alternate-ID remapping table.
    #[arg(long)]
    pub path_person_ids: Option<String>,
    /// Path to the gene-to-phenotype table.
    #[arg(long, required = true)]
    pub path_genes: String,
    /// Path to the output TSV file, plain or gzipped.
    #[arg(long, required = true)]
    pub path_output: String,
}

/// Main entry point for `analyze gene-score` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    info!("args_common = {:?}", &args_common);
    info!("args = {:?}", &args);

    let (ontology, cohort) = super::load_and_tally(
        &args.path_hpo_obo,
        &args.path_phenotypes,
        args.path_person_ids.as_deref(),
    )?;

    let genes = cohort::gene_phenotypes::load_gene_terms(&args.path_genes)
        .map_err(|e| anyhow::anyhow!("error loading {}: {}", args.path_genes, e))?;
    info!("loaded terms for {} genes", genes.len());

    let genes = genes
        .iter()
        .map(|(gene, term_ids)| {
            (
                gene.clone(),
                super::resolve_usable(&ontology, term_ids, gene),
            )
        })
        .collect::<Vec<_>>();
    let probands = cohort
        .iter()
        .map(|(person, term_ids)| {
            (
                person.clone(),
                super::resolve_usable(&ontology, term_ids, person),
            )
        })
        .collect::<Vec<_>>();

    // Counts are frozen now, the scoring queries are read-only.
    let rows = probands
        .par_iter()
        .map(|(person, proband_terms)| {
            genes
                .iter()
                .map(|(gene, gene_terms)| {
                    ontology
                        .similarity_score(proband_terms, gene_terms)
                        .map(|score| (person.clone(), gene.clone(), score))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut writer = open_write_maybe_gz(&args.path_output)?;
    writeln!(writer, "person_id\tgene\tsimilarity")?;
    for (person, gene, score) in rows.into_iter().flatten() {
        writeln!(writer, "{}\t{}\t{}", person, gene, score)?;
    }
    writer.flush()?;

    info!("wrote gene scores to {}", args.path_output);
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    #[test]
    fn run_smoke_test() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_output = tmp_dir.join("gene_scores.tsv");

        let args_common = crate::common::Args::default();
        let args = super::Args {
            path_hpo_obo: "tests/data/small.obo".to_string(),
            path_phenotypes: "tests/data/phenotypes.tsv".to_string(),
            path_person_ids: Some("tests/data/alt_ids.tsv".to_string()),
            path_genes: "tests/data/genes.tsv".to_string(),
            path_output: path_output.to_str().unwrap().to_string(),
        };
        super::run(&args_common, &args)?;

        let text = std::fs::read_to_string(&path_output)?;
        let lines = text.lines().collect::<Vec<_>>();

        // three probands times two genes plus the header
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "person_id\tgene\tsimilarity");
        assert!(lines.iter().all(|line| !line.ends_with('\t')));

        Ok(())
    }
}
