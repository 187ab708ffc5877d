//! Writes morpheme window instances from a morpheme lexicon.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use toad_core::corpus::LinePolicy;
use toad_trainer::cli::init_logging;
use toad_trainer::generate::{ensure_distinct, make_mbma, open_output};
use tracing::info;

#[derive(Parser)]
#[command(name = "makembma")]
#[command(about = "Create morphological analyzer instances from a lexicon")]
#[command(version)]
struct Cli {
    /// 'word class...' lexicon
    #[arg(short = 'i', long = "input", default_value = "mbma.lex")]
    input: PathBuf,

    /// Instance file; stdout when absent
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Abort on malformed entries instead of skipping them
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    ensure_distinct(&cli.input, cli.output.as_deref())?;

    let policy = if cli.strict {
        LinePolicy::Strict
    } else {
        LinePolicy::Lenient
    };
    let file = File::open(&cli.input)
        .with_context(|| format!("could not open input file '{}'", cli.input.display()))?;
    let out = open_output(cli.output.as_deref())?;
    let lines = make_mbma(BufReader::new(file), &cli.input.display().to_string(), policy, out)?;
    info!("wrote {lines} instances");
    Ok(())
}
