//! # Froggen
//!
//! Trains the POS tagger and the lemmatizer from one `word lemma tag`
//! corpus. Both data files are written first; the tagger generator and the
//! learner then run side by side on blocking worker threads.

use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use toad_core::corpus::{CorpusReader, LinePolicy, Record, TagCheck, UTTERANCE_MARK};
use toad_core::defaults::{DEFAULTS_VERSION, Stage, runtime_timbl_opts, section};
use toad_core::engine::{DataFormat, InstanceLearner, LineTokenizer, TaggerCommand, TaggerGenerator};
use toad_core::{CONFIG_DIR, Configuration, GLOBAL, LemmaIndex, LemmaInstanceWriter, ParticleTable};
use tracing::{info, warn};

use crate::output::OutputDir;

/// What froggen reads.
#[derive(Debug, Clone)]
pub struct FroggenInput {
    /// The `word lemma tag` training corpus.
    pub corpus: PathBuf,
    /// More `word lemma tag` lines, used for the lemmatizer only.
    pub extra_lemmas: Option<PathBuf>,
    /// Tokenizer rules, already installed in the output directory.
    pub tokenizer_rules: Option<PathBuf>,
    pub policy: LinePolicy,
    /// Check applied to the corpus POS tags.
    pub tag_check: TagCheck,
}

/// Files and counts produced by a froggen run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FroggenReport {
    pub tagger_data: PathBuf,
    pub lemma_data: PathBuf,
    pub tree: PathBuf,
    pub template: PathBuf,
    /// Tagged words written to the tagger data.
    pub tagged_words: usize,
    /// Instance lines written to the lemmatizer data.
    pub lemma_instances: usize,
    /// Words the tokenizer does not keep as one token.
    pub tokenizer_warnings: usize,
}

/// The froggen pipeline with its engines.
pub struct Froggen {
    pub config: Configuration,
    pub out: OutputDir,
    pub learner: Arc<dyn InstanceLearner>,
    pub generator: Arc<dyn TaggerGenerator>,
}

impl Froggen {
    /// Runs the whole pipeline.
    pub async fn run(&self, input: &FroggenInput, tokenizer: Option<&dyn LineTokenizer>) -> Result<FroggenReport> {
        let base = self.config.require("baseName", section::TAGGER)?.to_string();
        let tree_name = self.config.require("treeFile", section::MBLEM)?.to_string();
        let particles = ParticleTable::parse(self.config.require("particles", section::MBLEM)?)?;

        let tagger_data = self.out.path(&format!("{base}.data"));
        let settings = self.out.path(&format!("{base}.settings"));
        let tree = self.out.path(&tree_name);
        let lemma_data = self.out.path(&format!("{tree_name}.data"));

        info!("start reading lemmas from the corpus: {}", input.corpus.display());
        let mut index = LemmaIndex::new();
        let records = CorpusReader::open(&input.corpus, 3, input.policy)?;
        let file = File::create(&tagger_data)
            .with_context(|| format!("creating {}", tagger_data.display()))?;
        let tagged_words = write_tagger_data(records, &mut index, input.tag_check.clone(), BufWriter::new(file))?;
        info!("created an inputfile for the tagger: {}", tagger_data.display());

        if let Some(extra) = &input.extra_lemmas {
            info!("start reading extra lemmas from: {}", extra.display());
            let added = index.add_corpus(CorpusReader::open(extra, 3, input.policy)?)?;
            info!("read {added} extra lemma entries");
        }

        let tokenizer_warnings = match tokenizer {
            Some(tokenizer) => check_tokenization(tokenizer, &index)?,
            None => 0,
        };

        let file = File::create(&lemma_data)
            .with_context(|| format!("creating {}", lemma_data.display()))?;
        let mut writer = LemmaInstanceWriter::new(BufWriter::new(file));
        writer.push_index(&index, &particles)?;
        let lemma_instances = writer.finish()?;
        info!("created a mblem trainingsfile: {}", lemma_data.display());

        let command = TaggerCommand::from_config(
            &self.config,
            section::TAGGER,
            DataFormat::Plain,
            &tagger_data,
            &settings,
        )?;
        let learner_opts = self.config.require("timblOpts", section::MBLEM)?.to_string();
        train_both(
            Arc::clone(&self.generator),
            command,
            Arc::clone(&self.learner),
            lemma_data.clone(),
            learner_opts,
            tree.clone(),
        )
        .await?;

        let template = froggen_template(&self.config, &self.out, input.tokenizer_rules.as_deref())?;
        let template = self.out.write_template(Stage::Froggen, &template)?;

        Ok(FroggenReport {
            tagger_data,
            lemma_data,
            tree,
            template,
            tagged_words,
            lemma_instances,
            tokenizer_warnings,
        })
    }
}

/// Copies the tokenizer rules into the output directory (when there is
/// one) and returns the path to use from then on.
pub fn install_rules(rules: &Path, out: &OutputDir) -> Result<PathBuf> {
    if !rules.is_file() {
        anyhow::bail!("unable to find: '{}'", rules.display());
    }
    if out.config_dir().is_none() {
        return Ok(rules.to_path_buf());
    }
    let name = rules
        .file_name()
        .with_context(|| format!("not a file name: {}", rules.display()))?;
    let target = out.path(&name.to_string_lossy());
    fs::copy(rules, &target)
        .with_context(|| format!("copying {} to {}", rules.display(), target.display()))?;
    Ok(target)
}

/// The `rulesFile` entry of the template: the bare file name when the
/// rules were installed in the output directory, an absolute path otherwise.
pub fn rules_entry(rules: &Path, out: &OutputDir) -> Result<String> {
    if out.config_dir().is_some() {
        let name = rules
            .file_name()
            .with_context(|| format!("not a file name: {}", rules.display()))?;
        return Ok(name.to_string_lossy().into_owned());
    }
    let path = std::path::absolute(rules).with_context(|| format!("no absolute path for {}", rules.display()))?;
    Ok(path.display().to_string())
}

/// Writes `word<TAB>tag` tagger data and fills the lemma index.
///
/// Sentence boundaries (blank lines and `<utt>`) become one `<utt>` line;
/// the last sentence is closed too. Words with a tag rejected by `check`
/// are left out of both. Returns the number of words written.
pub fn write_tagger_data<R: BufRead, W: Write>(
    mut records: CorpusReader<R>,
    index: &mut LemmaIndex,
    mut check: TagCheck,
    mut out: W,
) -> Result<usize> {
    let source = records.source_name().to_string();
    let mut words = 0;
    let mut open = false;
    for record in records.by_ref() {
        match record? {
            Record::Boundary { .. } => {
                if open {
                    writeln!(out, "{UTTERANCE_MARK}")?;
                    open = false;
                }
            }
            Record::Fields { line_no, fields } => {
                let [word, lemma, tag] = fields.as_slice() else {
                    continue;
                };
                if !check.accept(tag, &source, line_no, &fields.join("\t"))? {
                    continue;
                }
                writeln!(out, "{word}\t{tag}")?;
                index.insert(word, lemma, tag);
                words += 1;
                open = true;
            }
        }
    }
    if open {
        writeln!(out, "{UTTERANCE_MARK}")?;
    }
    if records.skipped() > 0 {
        warn!("skipped {} malformed lines in {source}", records.skipped());
    }
    out.flush()?;
    Ok(words)
}

/// Warns about every indexed word the tokenizer splits. Returns how many
/// words were split.
pub fn check_tokenization(tokenizer: &dyn LineTokenizer, index: &LemmaIndex) -> Result<usize> {
    let words: Vec<String> = index.words().map(str::to_string).collect();
    let counts = tokenizer.count_tokens(&words)?;
    let mut problems = 0;
    for (word, count) in words.iter().zip(counts) {
        if count != 1 {
            warn!("the provided tokenizer doesn't handle '{word}' well (splits it into {count} parts)");
            problems += 1;
        }
    }
    Ok(problems)
}

/// Runs the tagger generator and the learner side by side. The first
/// failure is returned.
pub async fn train_both(
    generator: Arc<dyn TaggerGenerator>,
    command: TaggerCommand,
    learner: Arc<dyn InstanceLearner>,
    data: PathBuf,
    options: String,
    tree: PathBuf,
) -> Result<()> {
    info!("training tagger and lemmatizer in parallel");
    tokio::try_join!(
        blocking("tagger generation", move || generator.generate(&command)),
        blocking("lemmatizer training", move || learner.learn(&data, &options, &tree)),
    )?;
    info!("finished tagger and lemmatizer");
    Ok(())
}

async fn blocking<F>(what: &'static str, job: F) -> Result<()>
where
    F: FnOnce() -> toad_core::Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .with_context(|| format!("{what} task died"))?
        .with_context(|| format!("{what} failed"))
}

/// The template froggen writes: tokenizer rules (if any), the tagger
/// settings and the lemmatizer instance base, relative to the output
/// directory.
pub fn froggen_template(config: &Configuration, out: &OutputDir, rules: Option<&Path>) -> Result<Configuration> {
    let base = config.require("baseName", section::TAGGER)?;
    let mut template = Configuration::new();
    if let Some(dir) = out.config_dir() {
        template.set(CONFIG_DIR, &dir, GLOBAL);
    }
    if let Some(rules) = rules {
        template.set("rulesFile", &rules_entry(rules, out)?, section::TOKENIZER);
    }
    template.set("settings", &format!("{base}.settings"), section::TAGGER);
    template.set("set", config.require("set", section::TAGGER)?, section::TAGGER);
    template.set("version", DEFAULTS_VERSION, section::TAGGER);
    template.set("treeFile", config.require("treeFile", section::MBLEM)?, section::MBLEM);
    template.set(
        "timblOpts",
        &runtime_timbl_opts(config.require("timblOpts", section::MBLEM)?),
        section::MBLEM,
    );
    template.set("set", config.require("set", section::MBLEM)?, section::MBLEM);
    template.set("version", DEFAULTS_VERSION, section::MBLEM);
    Ok(template)
}
