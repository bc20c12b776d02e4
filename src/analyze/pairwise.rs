//! Implementation of the `analyze pairwise` sub command.

use std::io::Write;

use clap::Parser;
use indexmap::IndexSet;
use itertools::Itertools;
use rayon::prelude::*;
use tracing::info;

use crate::common::io::open_write_maybe_gz;

/// Command line arguments for `analyze pairwise` sub command.
#[derive(Parser, Debug)]
#[command(about = "Compute the pairwise similarity matrix over the cohort's terms", long_about = None)]
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
    /// Path to the output TSV file, plain or gzipped.
    #[arg(long, required = true)]
    pub path_output: String,
    /// Number of threads to use for scoring (default is 1 thread per core).
    #[arg(long)]
    pub num_threads: Option<usize>,
}

/// Main entry point for `analyze pairwise` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    info!("args_common = {:?}", &args_common);
    info!("args = {:?}", &args);

    if let Some(num_threads) = args.num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()?;
    }

    let (ontology, cohort) = super::load_and_tally(
        &args.path_hpo_obo,
        &args.path_phenotypes,
        args.path_person_ids.as_deref(),
    )?;

    // Distinct canonical terms used in the cohort, sorted for stable output.
    let mut distinct = IndexSet::new();
    for (person, term_ids) in &cohort {
        distinct.extend(super::resolve_usable(&ontology, term_ids, person));
    }
    let terms = distinct.into_iter().sorted().collect::<Vec<_>>();

    let pairs = terms
        .iter()
        .copied()
        .combinations_with_replacement(2)
        .map(|pair| (pair[0], pair[1]))
        .collect::<Vec<_>>();
    info!(
        "computing {} pairwise scores over {} terms",
        pairs.len(),
        terms.len()
    );

    // Counts are frozen now, the scoring queries are read-only.
    let rows = pairs
        .par_iter()
        .map(|&(term_a, term_b)| {
            ontology
                .most_informative_ic(term_a, term_b)
                .map(|score| (term_a, term_b, score))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut writer = open_write_maybe_gz(&args.path_output)?;
    writeln!(writer, "term_a\tterm_b\tsimilarity")?;
    for (term_a, term_b, score) in rows {
        writeln!(writer, "{}\t{}\t{}", term_a, term_b, score)?;
    }
    writer.flush()?;

    info!("wrote pairwise matrix to {}", args.path_output);
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    #[test]
    fn run_smoke_test() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_output = tmp_dir.join("pairwise.tsv");

        let args_common = crate::common::Args::default();
        let args = super::Args {
            path_hpo_obo: "tests/data/small.obo".to_string(),
            path_phenotypes: "tests/data/phenotypes.tsv".to_string(),
            path_person_ids: Some("tests/data/alt_ids.tsv".to_string()),
            path_output: path_output.to_str().unwrap().to_string(),
            num_threads: None,
        };
        super::run(&args_common, &args)?;

        let text = std::fs::read_to_string(&path_output)?;
        let lines = text.lines().collect::<Vec<_>>();

        // four distinct cohort terms, ten unordered pairs plus the header
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "term_a\tterm_b\tsimilarity");
        // HP:0000707 vs HP:0000924 share only universally tallied ancestors
        assert!(lines
            .iter()
            .any(|line| *line == "HP:0000707\tHP:0000924\t0"));

        Ok(())
    }
}
