//! Trains the POS tagger and lemmatizer for frog from a tagged corpus.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use toad_core::Stage;
use toad_core::corpus::TagCheck;
use toad_core::engine::{LineTokenizer, MbtGenerator, TimblLearner, UctoTokenizer};
use toad_trainer::OutputDir;
use toad_trainer::cli::{PipelineArgs, init_logging, load_config};
use toad_trainer::froggen::{Froggen, FroggenInput, install_rules};
use tracing::info;

#[derive(Parser)]
#[command(name = "froggen")]
#[command(about = "Train a POS tagger and lemmatizer from a 'word lemma tag' corpus")]
#[command(version)]
struct Cli {
    /// Tagged corpus, one 'word lemma tag' per line
    #[arg(short = 'T', long = "corpus")]
    corpus: PathBuf,

    /// Extra 'word lemma tag' lines for the lemmatizer
    #[arg(short = 'l', long = "lemmas")]
    lemmas: Option<PathBuf>,

    /// Tokenizer rules to check the corpus words against
    #[arg(short = 't', long = "tokenizer")]
    tokenizer: Option<PathBuf>,

    /// File with the allowed POS tags, one per line
    #[arg(long)]
    valid_tags: Option<PathBuf>,

    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Memory-based learner program
    #[arg(long, env = "TOAD_TIMBL", default_value = "timbl")]
    timbl: PathBuf,

    /// Tagger generator program
    #[arg(long, env = "TOAD_MBTG", default_value = "mbtg")]
    mbtg: PathBuf,

    /// Tokenizer program
    #[arg(long, env = "TOAD_UCTO", default_value = "ucto")]
    ucto: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = load_config(Stage::Froggen, cli.pipeline.config.as_deref())?;
    let out = OutputDir::create(cli.pipeline.outdir.as_deref())?;
    let tag_check = match &cli.valid_tags {
        Some(path) => TagCheck::whitelist_from_file(path, cli.pipeline.max_invalid_tags)?,
        None => TagCheck::permissive(),
    };
    let rules = cli
        .tokenizer
        .as_deref()
        .map(|rules| install_rules(rules, &out))
        .transpose()?;
    let tokenizer = rules.as_ref().map(|rules| UctoTokenizer::new(&cli.ucto, rules));

    let input = FroggenInput {
        corpus: cli.corpus,
        extra_lemmas: cli.lemmas,
        tokenizer_rules: rules,
        policy: cli.pipeline.line_policy(),
        tag_check,
    };
    let froggen = Froggen {
        config,
        out,
        learner: Arc::new(TimblLearner::new(cli.timbl)),
        generator: Arc::new(MbtGenerator::new(cli.mbtg)),
    };
    let report = froggen
        .run(&input, tokenizer.as_ref().map(|t| t as &dyn LineTokenizer))
        .await?;

    info!(
        "{} tagged words, {} lemmatizer instances",
        report.tagged_words, report.lemma_instances
    );
    if report.tokenizer_warnings > 0 {
        info!("{} words are split by the tokenizer", report.tokenizer_warnings);
    }
    Ok(())
}
