//! Converts `word ner pos` columns on stdin into NER context lines on stdout.

use std::io::{self, BufWriter};

use anyhow::Result;
use clap::Parser;
use toad_core::features::convert_ner_columns;
use toad_trainer::cli::init_logging;
use tracing::info;

#[derive(Parser)]
#[command(name = "nerv")]
#[command(about = "Convert 'word ner pos' lines into NER context lines (stdin to stdout)")]
#[command(version)]
struct Cli {}

fn main() -> Result<()> {
    init_logging();
    let _ = Cli::parse();
    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    let words = convert_ner_columns(stdin, stdout)?;
    info!("converted {words} words");
    Ok(())
}
