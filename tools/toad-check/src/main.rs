//! Toad model checker
//!
//! Runs a trained lemmatizer or morphological analyzer over known words
//! and reports the results no lexicon accounts for.

mod checks;

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use toad_core::Lexicon;
use toad_core::defaults::MBLEM_RUNTIME_TIMBL_OPTS;
use toad_core::engine::{FrogAnalyzer, TimblLemmatizer};
use tracing::info;

use crate::checks::{
    add_word_list, analyze_words, check_lemmas, check_morphology, read_frequent_words, read_lemma_lexicon,
    read_morph_lexicon, read_word_column,
};

/// CLI arguments
#[derive(Parser)]
#[command(name = "toad-check")]
#[command(about = "Check trained lemmatizer and morphology models against lexicons")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print findings as JSON lines
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report lemmas proposed by the lemmatizer that no lexicon knows
    Mblem {
        /// 'word lemma tag' lexicon; its lowercase words are checked
        #[arg(long, default_value = "mblem.lex")]
        lexicon: PathBuf,

        #[command(flatten)]
        lemmas: LemmaLists,

        /// Lemmatizer instance base
        #[arg(long)]
        tree: PathBuf,

        /// Learner options used to classify with the instance base
        #[arg(long, default_value = MBLEM_RUNTIME_TIMBL_OPTS, allow_hyphen_values = true)]
        timbl_opts: String,

        /// Memory-based learner program
        #[arg(long, env = "TOAD_TIMBL", default_value = "timbl")]
        timbl: PathBuf,
    },
    /// Report analyses with unknown lemmas (and, with -m, unknown morphemes)
    Mbma {
        /// Morpheme lexicon
        #[arg(long, default_value = "mbma-merged.lex")]
        lexicon: PathBuf,

        #[command(flatten)]
        lemmas: LemmaLists,

        /// Known morphemes, one per line
        #[arg(long)]
        known_morphs: Option<PathBuf>,

        /// Report unknown morphemes too
        #[arg(short = 'm')]
        morphemes: bool,

        /// Check the words of the frequency list seen more than LIMIT times
        #[arg(short = 'S', value_name = "LIMIT")]
        sonar_limit: Option<usize>,

        /// Frequency list used with -S
        #[arg(long, default_value = "sonar.words")]
        sonar_words: PathBuf,

        /// Check the first column of this file instead of the lexicon words
        #[arg(short = 't', long = "input")]
        input: Option<PathBuf>,

        #[command(flatten)]
        frog: FrogArgs,
    },
    /// Print the analyses of the words in the given files
    Analyze {
        /// Files with one word (first column) per line
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        frog: FrogArgs,
    },
}

#[derive(Args)]
struct LemmaLists {
    /// Extra lemma list (default: sonar.lemmas, if present)
    #[arg(long)]
    sonar_lemmas: Option<PathBuf>,

    /// Extra lemma list (default: known.lemmas, if present)
    #[arg(long)]
    known_lemmas: Option<PathBuf>,
}

impl LemmaLists {
    fn add_to(&self, lexicon: &mut Lexicon) -> Result<()> {
        add_word_list(lexicon, self.sonar_lemmas.as_deref(), "sonar.lemmas")?;
        add_word_list(lexicon, self.known_lemmas.as_deref(), "known.lemmas")?;
        info!("lexicon size is now {} words", lexicon.len());
        Ok(())
    }
}

#[derive(Args)]
struct FrogArgs {
    /// Frog configuration for the analyzer
    #[arg(long)]
    frog_config: Option<PathBuf>,

    /// Frog program
    #[arg(long, env = "TOAD_FROG", default_value = "frog")]
    frog: PathBuf,
}

impl FrogArgs {
    fn analyzer(&self) -> Result<FrogAnalyzer> {
        Ok(FrogAnalyzer::new(&self.frog, self.frog_config.clone())?)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let cli = Cli::parse();
    let mut out = BufWriter::new(io::stdout().lock());

    match cli.command {
        Commands::Mblem {
            lexicon,
            lemmas,
            tree,
            timbl_opts,
            timbl,
        } => {
            let (mut known, words) = read_lemma_lexicon(&lexicon)?;
            lemmas.add_to(&mut known)?;
            info!("checking the lemmas in {}", lexicon.display());
            let lemmatizer = TimblLemmatizer::new(timbl, tree, timbl_opts);
            for finding in check_lemmas(&lemmatizer, &words, &known)? {
                emit(&mut out, &finding, cli.json)?;
            }
        }
        Commands::Mbma {
            lexicon,
            lemmas,
            known_morphs,
            morphemes,
            sonar_limit,
            sonar_words,
            input,
            frog,
        } => {
            let (mut known, lexicon_words) = read_morph_lexicon(&lexicon)?;
            lemmas.add_to(&mut known)?;
            let mut morphs = Lexicon::new();
            add_word_list(&mut morphs, known_morphs.as_deref(), "known.morphs")?;
            info!("found {} known morphemes", morphs.len());

            let words = match (sonar_limit, &input) {
                (Some(limit), _) => {
                    let reader = open(&sonar_words)?;
                    read_frequent_words(reader, limit)?.into_keys().collect()
                }
                (None, Some(path)) => read_word_column(open(path)?)?,
                (None, None) => lexicon_words,
            };
            info!("checking the morphemes of {} words", words.len());
            let analyzer = frog.analyzer()?;
            let known_morphs = morphemes.then_some(&morphs);
            for finding in check_morphology(&analyzer, &words, &known, known_morphs)? {
                emit(&mut out, &finding, cli.json)?;
            }
        }
        Commands::Analyze { files, frog } => {
            let analyzer = frog.analyzer()?;
            for path in &files {
                info!("processing: {}", path.display());
                let words = read_word_column(open(path)?)?;
                for analysis in analyze_words(&analyzer, &words)? {
                    emit(&mut out, &analysis, cli.json)?;
                }
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("unable to open: {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Writes one finding, as text or as a JSON line.
fn emit<T: Serialize + Display, W: Write>(out: &mut W, item: &T, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, item)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::UnknownLemma;

    #[test]
    fn emits_text_and_json() {
        let finding = UnknownLemma {
            word: "liep".into(),
            lemma: "liepen".into(),
        };
        let mut text = Vec::new();
        emit(&mut text, &finding, false).unwrap();
        assert_eq!(String::from_utf8(text).unwrap(), "liep ==> liepen\n");
        let mut json = Vec::new();
        emit(&mut json, &finding, true).unwrap();
        assert_eq!(
            String::from_utf8(json).unwrap(),
            "{\"word\":\"liep\",\"lemma\":\"liepen\"}\n"
        );
    }

    #[test]
    fn cli_parses_mbma_flags() {
        let cli = Cli::try_parse_from(["toad-check", "--json", "mbma", "-m", "-S", "100"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Mbma {
                morphemes,
                sonar_limit,
                ..
            } => {
                assert!(morphemes);
                assert_eq!(sonar_limit, Some(100));
            }
            _ => panic!("expected mbma"),
        }
    }
}
