//! Generates a named-entity tagger from a `word<TAB>IOB` corpus.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use toad_core::Stage;
use toad_core::defaults::section;
use toad_core::engine::process::tagger_settings;
use toad_core::engine::{MbtGenerator, MbtTagger};
use toad_trainer::OutputDir;
use toad_trainer::cli::{PipelineArgs, init_logging, load_config};
use toad_trainer::taggen::{TaggerGen, TaggerInput, ner_kind};
use tracing::info;

#[derive(Parser)]
#[command(name = "nergen")]
#[command(about = "Generate a NER tagger with gazetteer features")]
#[command(version)]
struct Cli {
    /// 'word NER-tag' corpus
    input: PathBuf,

    /// Gazetteer index ('category file' per line)
    #[arg(short = 'g', long = "gazetteer")]
    gazetteer: PathBuf,

    /// Base name of the generated files
    #[arg(short = 'b', long = "base")]
    base: Option<String>,

    /// Pass -X to the tagger generator
    #[arg(short = 'X')]
    keep_x: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,

    /// POS tagger program
    #[arg(long, env = "TOAD_MBT", default_value = "mbt")]
    mbt: PathBuf,

    /// Tagger generator program
    #[arg(long, env = "TOAD_MBTG", default_value = "mbtg")]
    mbtg: PathBuf,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = load_config(Stage::Nergen, cli.pipeline.config.as_deref())?;
    let out = OutputDir::create(cli.pipeline.outdir.as_deref())?;
    let kind = ner_kind(&cli.gazetteer)?;
    let pos_tagger = MbtTagger::new(&cli.mbt, tagger_settings(&config, section::TAGGER)?);
    let generator = MbtGenerator::new(&cli.mbtg);

    let report = TaggerGen {
        kind: &kind,
        config: &config,
        out: &out,
        pos_tagger: &pos_tagger,
        generator: &generator,
    }
    .run(&TaggerInput {
        corpus: cli.input,
        base: cli.base,
        policy: cli.pipeline.line_policy(),
        max_invalid_tags: cli.pipeline.max_invalid_tags,
        keep_x: cli.keep_x,
    })?;

    info!("NER settings stored in {}", report.settings.display());
    Ok(())
}
