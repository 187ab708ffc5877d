//! Trains the morphological analyzer instance base from a morpheme lexicon.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use toad_core::Stage;
use toad_core::engine::TimblLearner;
use toad_trainer::OutputDir;
use toad_trainer::cli::{PipelineArgs, init_logging, load_config};
use toad_trainer::morgen::Morgen;
use tracing::info;

#[derive(Parser)]
#[command(name = "morgen")]
#[command(about = "Train a morphological analyzer from a 'word class...' lexicon")]
#[command(version)]
struct Cli {
    /// Morpheme lexicon
    input: PathBuf,

    /// Base name of the generated files
    #[arg(short = 'b', long = "base")]
    base: Option<String>,

    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Memory-based learner program
    #[arg(long, env = "TOAD_TIMBL", default_value = "timbl")]
    timbl: PathBuf,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = load_config(Stage::Morgen, cli.pipeline.config.as_deref())?;
    let out = OutputDir::create(cli.pipeline.outdir.as_deref())?;
    let learner = TimblLearner::new(&cli.timbl);
    let report = Morgen {
        config: &config,
        out: &out,
        learner: &learner,
    }
    .run(&cli.input, cli.base.as_deref(), cli.pipeline.line_policy())?;

    info!("{} instances stored in {}", report.instances, report.tree.display());
    Ok(())
}
