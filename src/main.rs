//! HPO similarity main executable

pub mod analyze;
pub mod cohort;
pub mod common;
pub mod ontology;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "HPO phenotype similarity analysis",
    long_about = "Quantify the similarity of HPO phenotype term sets by the information content of shared ancestor terms"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Analysis related commands.
    Analyze(Analyze),
}

/// Parsing of "analyze *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Analyze {
    /// The sub command to run
    #[command(subcommand)]
    command: AnalyzeCommands,
}

/// Enum supporting the parsing of "analyze *" sub commands.
#[derive(Debug, Subcommand)]
enum AnalyzeCommands {
    TermIc(analyze::term_ic::Args),
    Pairwise(analyze::pairwise::Args),
    GeneScore(analyze::gene_score::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        tracing::debug!("hpo-similarity v{}", common::VERSION);
        match &cli.command {
            Commands::Analyze(analyze) => match &analyze.command {
                AnalyzeCommands::TermIc(args) => analyze::term_ic::run(&cli.common, args)?,
                AnalyzeCommands::Pairwise(args) => analyze::pairwise::run(&cli.common, args)?,
                AnalyzeCommands::GeneScore(args) => analyze::gene_score::run(&cli.common, args)?,
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
