//! Writes lemmatizer training instances from a sorted `word lemma tag`
//! lexicon, without training.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use toad_core::ParticleTable;
use toad_core::corpus::{CorpusReader, LinePolicy};
use toad_core::lemma::TagTranslations;
use toad_trainer::cli::init_logging;
use toad_trainer::generate::{ensure_distinct, make_mblem, open_output};
use tracing::info;

#[derive(Parser)]
#[command(name = "makemblem")]
#[command(about = "Create lemmatizer instances from a sorted lexicon")]
#[command(version)]
struct Cli {
    /// Sorted 'word lemma tag' lexicon
    #[arg(short = 'i', long = "input", default_value = "mblem.lex")]
    input: PathBuf,

    /// Instance file, '-' for stdout
    #[arg(short = 'o', long = "output", default_value = "mblem.data")]
    output: PathBuf,

    /// 'tag code' translations; without it tags are used as they are
    #[arg(short = 't', long = "translations")]
    translations: Option<PathBuf>,

    /// Particle table, e.g. "[WW(vd/be] [WW(vd/ge]"
    #[arg(long)]
    particles: Option<String>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    ensure_distinct(&cli.input, Some(cli.output.as_path()))?;

    let particles = match &cli.particles {
        Some(line) => ParticleTable::parse(line)?,
        None => ParticleTable::dutch(),
    };
    let translations = match &cli.translations {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("could not open translations file '{}'", path.display()))?;
            Some(TagTranslations::from_reader(BufReader::new(file), &path.display().to_string())?)
        }
        None => None,
    };
    match &cli.translations {
        Some(path) => info!(
            "creating {} from {} using translations from {}",
            cli.output.display(),
            cli.input.display(),
            path.display()
        ),
        None => info!(
            "creating {} from {} without tag translations",
            cli.output.display(),
            cli.input.display()
        ),
    }

    let lexicon = CorpusReader::open(&cli.input, 3, LinePolicy::Lenient)?;
    let out = open_output(Some(cli.output.as_path()))?;
    let stats = make_mblem(lexicon, &particles, translations.as_ref(), out)?;
    info!(
        "{} entries, {} instances, {} unknown tags",
        stats.entries, stats.instances, stats.unknown_tags
    );
    Ok(())
}
