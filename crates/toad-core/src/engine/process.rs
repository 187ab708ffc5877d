//! Engines backed by external programs.
//!
//! Each engine runs one program per batch: the input goes to a scratch
//! file, the program writes its output to another (or to stdout), and the
//! result is parsed back. Programs are looked up on `PATH` unless a path
//! is given.

use std::ffi::OsString;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use regex::Regex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::Configuration;
use crate::corpus::reader::UTTERANCE_MARK;
use crate::engine::{
    InstanceLearner, LemmaCandidate, LineTokenizer, MorphAnalyzer, SentenceTagger, TaggedWord,
    TaggerCommand, TaggerGenerator, WordLemmatizer,
};
use crate::error::{Result, ToadError};
use crate::lemma::edit::ClassLabel;
use crate::lemma::instances::suffix_context;

/// Runs `program` to completion, failing on a non-zero exit status.
fn run(program: &Path, args: &[OsString]) -> Result<Output> {
    let tool = program.display().to_string();
    debug!(tool = %tool, ?args, "running");
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ToadError::ToolSpawn {
            tool: tool.clone(),
            source,
        })?;
    if !output.status.success() {
        return Err(ToadError::ToolFailed {
            tool,
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// Writes `lines` to a fresh scratch file.
fn scratch_file<I, S>(lines: I) -> Result<NamedTempFile>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let file = NamedTempFile::new()?;
    let mut out = BufWriter::new(file.as_file());
    for line in lines {
        writeln!(out, "{}", line.as_ref())?;
    }
    out.flush()?;
    drop(out);
    Ok(file)
}

/// A scratch path for a program to write its output to.
fn scratch_output() -> Result<tempfile::TempPath> {
    Ok(NamedTempFile::new()?.into_temp_path())
}

fn read_output(tool: &Path, path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ToadError::ToolOutput {
        tool: tool.display().to_string(),
        message: format!("cannot read {}: {e}", path.display()),
    })
}

fn mismatch(tool: &Path, what: &str, expected: usize, got: usize) -> ToadError {
    ToadError::ToolOutput {
        tool: tool.display().to_string(),
        message: format!("expected {expected} {what}, got {got}"),
    }
}

/// Trains instance bases with `timbl`.
#[derive(Debug, Clone)]
pub struct TimblLearner {
    program: PathBuf,
}

impl TimblLearner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl InstanceLearner for TimblLearner {
    fn learn(&self, data: &Path, options: &str, tree: &Path) -> Result<()> {
        info!("Timbl: start training {} with options: {options}", data.display());
        let mut args: Vec<OsString> = options.split_whitespace().map(OsString::from).collect();
        args.push("-f".into());
        args.push(data.into());
        args.push("-I".into());
        args.push(tree.into());
        run(&self.program, &args)?;
        info!("Timbl: done, stored instance base: {}", tree.display());
        Ok(())
    }
}

/// Generates taggers with `mbtg`.
#[derive(Debug, Clone)]
pub struct MbtGenerator {
    program: PathBuf,
}

impl MbtGenerator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TaggerGenerator for MbtGenerator {
    fn generate(&self, command: &TaggerCommand) -> Result<()> {
        info!("start tagger: {command}");
        info!("this may take several minutes, depending on the corpus size");
        run(&self.program, &command.args())?;
        info!("finished tagger");
        Ok(())
    }
}

/// Tags sentences with `mbt` and an existing settings file.
#[derive(Debug, Clone)]
pub struct MbtTagger {
    program: PathBuf,
    settings: PathBuf,
}

impl MbtTagger {
    pub fn new(program: impl Into<PathBuf>, settings: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            settings: settings.into(),
        }
    }
}

/// Splits tagger output (`word/tag` tokens) into sentences at `<utt>`.
pub fn parse_tagged_sentences(output: &str) -> Vec<Vec<TaggedWord>> {
    let mut sentences = Vec::new();
    let mut current = Vec::new();
    for token in output.split_whitespace() {
        if token == UTTERANCE_MARK {
            sentences.push(std::mem::take(&mut current));
            continue;
        }
        let tagged = match token.rsplit_once('/') {
            Some((word, tag)) if !word.is_empty() => TaggedWord::new(word, tag),
            _ => TaggedWord::new(token, ""),
        };
        current.push(tagged);
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

impl SentenceTagger for MbtTagger {
    fn tag_sentences(&self, sentences: &[Vec<String>]) -> Result<Vec<Vec<TaggedWord>>> {
        let input = scratch_file(sentences.iter().flat_map(|s| {
            s.iter()
                .map(String::as_str)
                .chain(std::iter::once(UTTERANCE_MARK))
        }))?;
        let args: Vec<OsString> = vec![
            "-s".into(),
            self.settings.clone().into(),
            "-T".into(),
            input.path().into(),
        ];
        let output = run(&self.program, &args)?;
        let tagged = parse_tagged_sentences(&String::from_utf8_lossy(&output.stdout));
        if tagged.len() != sentences.len() {
            return Err(mismatch(&self.program, "sentences", sentences.len(), tagged.len()));
        }
        Ok(tagged)
    }
}

/// Lemmatizes words with a trained lemmatizer instance base via `timbl`.
#[derive(Debug, Clone)]
pub struct TimblLemmatizer {
    program: PathBuf,
    tree: PathBuf,
    options: String,
}

impl TimblLemmatizer {
    pub fn new(program: impl Into<PathBuf>, tree: impl Into<PathBuf>, options: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            tree: tree.into(),
            options: options.into(),
        }
    }
}

/// The predicted class on a classifier output line: the last column, with
/// a trailing `{ ... }` distribution stripped.
pub fn predicted_class(line: &str) -> Option<&str> {
    let line = line.trim_end();
    let line = match line.rfind(" {") {
        Some(pos) if line.ends_with('}') => &line[..pos],
        _ => line,
    };
    line.split_whitespace().last()
}

impl WordLemmatizer for TimblLemmatizer {
    fn lemmatize(&self, words: &[String]) -> Result<Vec<Vec<LemmaCandidate>>> {
        let test = scratch_file(words.iter().map(|w| format!("{}?", suffix_context(w))))?;
        let out = scratch_output()?;
        let mut args: Vec<OsString> = self.options.split_whitespace().map(OsString::from).collect();
        args.extend([
            "-i".into(),
            self.tree.clone().into(),
            "-t".into(),
            test.path().into(),
            "-o".into(),
            out.to_path_buf().into(),
        ]);
        run(&self.program, &args)?;
        let text = read_output(&self.program, &out)?;
        let classes: Vec<&str> = text.lines().filter_map(predicted_class).collect();
        if classes.len() != words.len() {
            return Err(mismatch(&self.program, "classifications", words.len(), classes.len()));
        }
        Ok(words
            .iter()
            .zip(classes)
            .map(|(word, class)| {
                ClassLabel::parse_all(class)
                    .into_iter()
                    .map(|label| LemmaCandidate {
                        lemma: label.lemma(word),
                        tag: label.tag,
                    })
                    .collect()
            })
            .collect())
    }
}

/// Morphological analysis through `frog` with only the analyzer enabled.
#[derive(Debug)]
pub struct FrogAnalyzer {
    program: PathBuf,
    config: Option<PathBuf>,
    morphemes: Regex,
}

/// Column of the morphological analysis in frog's tabbed output.
const MORPH_COLUMN: usize = 3;

impl FrogAnalyzer {
    pub fn new(program: impl Into<PathBuf>, config: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            program: program.into(),
            config,
            morphemes: Regex::new(r"\[([^\[\]]+)\]")?,
        })
    }

    /// Morphemes in a `[m1][m2]...` analysis column.
    pub fn split_morphemes(&self, column: &str) -> Vec<String> {
        self.morphemes
            .captures_iter(column)
            .map(|c| c[1].to_string())
            .collect()
    }
}

impl MorphAnalyzer for FrogAnalyzer {
    fn analyze(&self, words: &[String]) -> Result<Vec<Vec<Vec<String>>>> {
        let input = scratch_file(words)?;
        let out = scratch_output()?;
        let mut args: Vec<OsString> = vec!["--skip=tmlcnp".into(), "-n".into()];
        if let Some(config) = &self.config {
            args.push("-c".into());
            args.push(config.clone().into());
        }
        args.extend([
            "-t".into(),
            input.path().into(),
            "-o".into(),
            out.to_path_buf().into(),
        ]);
        run(&self.program, &args)?;
        let text = read_output(&self.program, &out)?;

        // One sentence (blank-line separated) per input word; a word split
        // into several tokens gets their morphemes concatenated.
        let mut results: Vec<Vec<Vec<String>>> = Vec::with_capacity(words.len());
        let mut current: Option<Vec<String>> = None;
        for line in text.lines() {
            if line.trim().is_empty() {
                if let Some(morphemes) = current.take() {
                    results.push(vec![morphemes]);
                }
                continue;
            }
            let columns: Vec<&str> = line.split('\t').collect();
            let morphemes = columns
                .get(MORPH_COLUMN)
                .map(|c| self.split_morphemes(c))
                .unwrap_or_default();
            current.get_or_insert_with(Vec::new).extend(morphemes);
        }
        if let Some(morphemes) = current {
            results.push(vec![morphemes]);
        }
        if results.len() != words.len() {
            return Err(mismatch(&self.program, "analyses", words.len(), results.len()));
        }
        Ok(results)
    }
}

/// Tokenizes lines with `ucto` and a rules file.
#[derive(Debug, Clone)]
pub struct UctoTokenizer {
    program: PathBuf,
    rules: PathBuf,
}

impl UctoTokenizer {
    pub fn new(program: impl Into<PathBuf>, rules: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            rules: rules.into(),
        }
    }
}

impl LineTokenizer for UctoTokenizer {
    fn count_tokens(&self, lines: &[String]) -> Result<Vec<usize>> {
        let input = scratch_file(lines)?;
        let out = scratch_output()?;
        let args: Vec<OsString> = vec![
            "-c".into(),
            self.rules.clone().into(),
            "-m".into(),
            "-n".into(),
            input.path().into(),
            out.to_path_buf().into(),
        ];
        run(&self.program, &args)?;
        let text = read_output(&self.program, &out)?;
        let counts: Vec<usize> = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.split_whitespace().count())
            .collect();
        if counts.len() != lines.len() {
            return Err(mismatch(&self.program, "lines", lines.len(), counts.len()));
        }
        Ok(counts)
    }
}

/// Settings file of the POS tagger named in `config`.
pub fn tagger_settings(config: &Configuration, section: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(config.resolve(config.require("settings", section)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_output_splits_on_utterance() {
        let out = "Jan/SPEC(deeleigen) slaapt/WW(pv,tgw,met-t) <utt>\nIn/VZ(init) 1/2/TW <utt>\n";
        let sentences = parse_tagged_sentences(out);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0][1], TaggedWord::new("slaapt", "WW(pv,tgw,met-t)"));
        assert_eq!(sentences[1][1], TaggedWord::new("1/2", "TW"));
    }

    #[test]
    fn class_is_last_column() {
        assert_eq!(
            predicted_class("= = l o p e n ? WW(inf) { WW(inf) 3.0 }"),
            Some("WW(inf)")
        );
        assert_eq!(predicted_class("= l i e p ? WW(pv)+Diep+Iopen"), Some("WW(pv)+Diep+Iopen"));
        assert_eq!(predicted_class(""), None);
    }

    #[test]
    fn braces_in_features_are_not_a_distribution() {
        assert_eq!(
            predicted_class("= { a b ? N(soort) { N(soort) 2.0 }"),
            Some("N(soort)")
        );
        assert_eq!(predicted_class("= { a ? N"), Some("N"));
        assert_eq!(predicted_class("= a { ? LET() { LET() 1.0 }  "), Some("LET()"));
    }

    #[test]
    fn morphemes_from_brackets() {
        let frog = FrogAnalyzer::new("frog", None).unwrap();
        assert_eq!(
            frog.split_morphemes("[aan][kom][en]"),
            vec!["aan", "kom", "en"]
        );
        assert!(frog.split_morphemes("").is_empty());
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let learner = TimblLearner::new("/nonexistent/timbl");
        let err = learner
            .learn(Path::new("x.data"), "-a1", Path::new("x.tree"))
            .unwrap_err();
        assert!(matches!(err, ToadError::ToolSpawn { .. }));
    }

    #[test]
    fn settings_resolve_against_config_dir() {
        let config = Configuration::parse("configDir=/etc/frog/nld/\n[[tagger]]\nsettings=Frog.mbt.1.0.settings\n").unwrap();
        assert_eq!(
            tagger_settings(&config, "tagger").unwrap(),
            PathBuf::from("/etc/frog/nld/Frog.mbt.1.0.settings")
        );
    }
}
