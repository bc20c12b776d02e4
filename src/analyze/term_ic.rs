//! Implementation of the `analyze term-ic` sub command.

use std::io::Write;

use clap::Parser;
use tracing::info;

use crate::common::io::open_write_maybe_gz;
use crate::ontology::OntologyError;

/// Command line arguments for `analyze term-ic` sub command.
#[derive(Parser, Debug)]
#[command(about = "Tally a cohort and write per-term usage counts and information content", long_about = None)]
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
}

/// Main entry point for `analyze term-ic` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    info!("args_common = {:?}", &args_common);
    info!("args = {:?}", &args);

    let (ontology, _cohort) = super::load_and_tally(
        &args.path_hpo_obo,
        &args.path_phenotypes,
        args.path_person_ids.as_deref(),
    )?;

    let mut writer = open_write_maybe_gz(&args.path_output)?;
    writeln!(writer, "term_id\tname\tcount\tinformation_content")?;
    for term in ontology.terms() {
        match ontology.information_content(term.id()) {
            Ok(ic) => writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                term.id(),
                term.name(),
                term.count(),
                ic
            )?,
            // terms outside every member's closure have no defined IC
            Err(OntologyError::UntalliedTerm(_)) => {
                writeln!(writer, "{}\t{}\t0\t", term.id(), term.name())?
            }
            Err(e) => return Err(e.into()),
        }
    }
    writer.flush()?;

    info!("wrote term table to {}", args.path_output);
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    #[test]
    fn run_smoke_test() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_output = tmp_dir.join("term_ic.tsv");

        let args_common = crate::common::Args::default();
        let args = super::Args {
            path_hpo_obo: "tests/data/small.obo".to_string(),
            path_phenotypes: "tests/data/phenotypes.tsv".to_string(),
            path_person_ids: Some("tests/data/alt_ids.tsv".to_string()),
            path_output: path_output.to_str().unwrap().to_string(),
        };
        super::run(&args_common, &args)?;

        let text = std::fs::read_to_string(&path_output)?;
        let lines = text.lines().collect::<Vec<_>>();

        // header plus one row per live term
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "term_id\tname\tcount\tinformation_content");
        assert_eq!(lines[1], "HP:0000001\tAll\t3\t0");
        assert!(lines[4].starts_with("HP:0000924\tAbnormality of the skeletal system\t1\t"));
        // untallied terms get an empty information content column
        assert_eq!(lines[7], "HP:0001250\tSeizure\t0\t");

        Ok(())
    }
}
