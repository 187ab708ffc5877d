//! # NER and chunker generation
//!
//! `nergen` and `chunkgen` share one pipeline: read a `word<TAB>label`
//! corpus, POS-tag it with an existing tagger, write enriched context
//! lines (plus gazetteer columns for NER) and hand them to the tagger
//! generator.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use toad_core::corpus::{CorpusReader, LinePolicy, Sentence, SentenceReader, TagCheck};
use toad_core::defaults::{Stage, section};
use toad_core::engine::{DataFormat, SentenceTagger, TaggerCommand, TaggerGenerator};
use toad_core::features::{chunk_feature_lines, end_of_sentence, ner_feature_lines};
use toad_core::{Configuration, GLOBAL, Gazetteer};
use tracing::{debug, info};

use crate::output::{OutputDir, TAGGER_TRAINING_KEYS};

/// Sentences handed to the POS tagger per call.
pub const TAG_BATCH: usize = 500;

/// Which tagger is being generated.
#[derive(Debug, Clone)]
pub enum TaggerKind {
    /// Named entities, with gazetteer features.
    Ner {
        gazetteer: Gazetteer,
        /// The gazetteer index, recorded in the template.
        index: PathBuf,
    },
    /// IOB chunks.
    Chunker,
}

impl TaggerKind {
    pub fn stage(&self) -> Stage {
        match self {
            TaggerKind::Ner { .. } => Stage::Nergen,
            TaggerKind::Chunker => Stage::Chunkgen,
        }
    }

    /// The configuration section of the generated tagger.
    pub fn section(&self) -> &'static str {
        match self {
            TaggerKind::Ner { .. } => section::NER,
            TaggerKind::Chunker => section::IOB,
        }
    }

    /// Enriched training lines for one POS-tagged sentence.
    fn feature_lines(&self, sentence: &Sentence, pos: &[&str]) -> Vec<String> {
        let words: Vec<&str> = sentence.words.iter().map(String::as_str).collect();
        let gold: Vec<&str> = sentence.labels.iter().map(String::as_str).collect();
        match self {
            TaggerKind::Ner { gazetteer, .. } => {
                let found = gazetteer.tag(&words);
                let found: Vec<&str> = found.iter().map(String::as_str).collect();
                ner_feature_lines(&words, pos, &found, &gold)
            }
            TaggerKind::Chunker => chunk_feature_lines(&words, pos, &gold),
        }
    }
}

/// Options of one generator run.
#[derive(Debug, Clone)]
pub struct TaggerInput {
    /// The `word<TAB>label` corpus.
    pub corpus: PathBuf,
    /// Overrides the configured `baseName`.
    pub base: Option<String>,
    pub policy: LinePolicy,
    pub max_invalid_tags: usize,
    /// Pass `-X` to the generator.
    pub keep_x: bool,
}

/// Files and counts produced by a generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggerReport {
    pub data: PathBuf,
    pub settings: PathBuf,
    pub template: PathBuf,
    pub sentences: usize,
    pub words: usize,
    /// Whether the corpus marked sentence ends with `<utt>`.
    pub utterance_marks: bool,
}

/// The generator pipeline with its engines.
pub struct TaggerGen<'a> {
    pub kind: &'a TaggerKind,
    pub config: &'a Configuration,
    pub out: &'a OutputDir,
    pub pos_tagger: &'a dyn SentenceTagger,
    pub generator: &'a dyn TaggerGenerator,
}

impl TaggerGen<'_> {
    pub fn run(&self, input: &TaggerInput) -> Result<TaggerReport> {
        let base = match &input.base {
            Some(base) => base.as_str(),
            None => self.config.require("baseName", GLOBAL)?,
        };
        let data = self.out.path(&format!("{base}.data"));
        let settings = self.out.path(&format!("{base}.data.settings"));

        let records = CorpusReader::open(&input.corpus, 2, input.policy)?;
        let mut sentences = SentenceReader::new(records, TagCheck::iob(input.max_invalid_tags));
        let file = File::create(&data).with_context(|| format!("creating {}", data.display()))?;
        let mut out = BufWriter::new(file);

        let mut batch: Vec<Sentence> = Vec::with_capacity(TAG_BATCH);
        let (mut sentence_count, mut words) = (0, 0);
        loop {
            let next = sentences.next().transpose()?;
            let done = next.is_none();
            batch.extend(next);
            if batch.len() == TAG_BATCH || (done && !batch.is_empty()) {
                words += self.write_batch(&batch, &mut out)?;
                sentence_count += batch.len();
                debug!("tagged {sentence_count} sentences");
                batch.clear();
            }
            if done {
                break;
            }
        }
        out.flush()?;
        let utterance_marks = sentences.saw_utterance_mark();
        info!(
            "created {} ({sentence_count} sentences, {words} words)",
            data.display()
        );

        let mut command = TaggerCommand::from_config(
            self.config,
            self.kind.section(),
            DataFormat::Enriched,
            &data,
            &settings,
        )?;
        command.empty_line_eos = !utterance_marks;
        command.keep_x = input.keep_x;
        self.generator.generate(&command)?;

        let template = self.template(base);
        let template = self.out.write_template(self.kind.stage(), &template)?;
        Ok(TaggerReport {
            data,
            settings,
            template,
            sentences: sentence_count,
            words,
            utterance_marks,
        })
    }

    /// Tags a batch and writes its feature lines, one end-of-sentence line
    /// after each sentence. Returns the number of words written.
    fn write_batch<W: Write>(&self, batch: &[Sentence], out: &mut W) -> Result<usize> {
        let words: Vec<Vec<String>> = batch.iter().map(|s| s.words.clone()).collect();
        let tagged = self.pos_tagger.tag_sentences(&words)?;
        if tagged.len() != batch.len() {
            bail!(
                "POS tagger returned {} sentences for a batch of {}",
                tagged.len(),
                batch.len()
            );
        }
        let mut written = 0;
        for (sentence, tagged) in batch.iter().zip(&tagged) {
            if tagged.len() != sentence.len() {
                bail!(
                    "POS tagger returned {} words for '{}'",
                    tagged.len(),
                    sentence.words.join(" ")
                );
            }
            let pos: Vec<&str> = tagged.iter().map(|t| t.tag.as_str()).collect();
            for line in self.kind.feature_lines(sentence, &pos) {
                writeln!(out, "{line}")?;
            }
            writeln!(out, "{}", end_of_sentence(sentence.closed_by_mark))?;
            written += sentence.len();
        }
        Ok(written)
    }

    fn template(&self, base: &str) -> Configuration {
        let section = self.kind.section();
        let mut template = self.out.stage_template(self.config, section, TAGGER_TRAINING_KEYS);
        template.set("settings", &format!("{base}.data.settings"), section);
        if let TaggerKind::Ner { index, .. } = self.kind {
            template.set("known_ners", &index.display().to_string(), section);
        }
        template
    }
}

/// Loads the gazetteer for a NER run. The index is recorded as an
/// absolute path, so the template does not depend on the working directory.
pub fn ner_kind(index: &Path) -> Result<TaggerKind> {
    let index = index
        .canonicalize()
        .with_context(|| format!("unable to find gazetteer index {}", index.display()))?;
    let gazetteer = Gazetteer::from_index(&index)
        .with_context(|| format!("reading gazetteer {}", index.display()))?;
    info!("gazetteer: {} names from {}", gazetteer.len(), index.display());
    Ok(TaggerKind::Ner { gazetteer, index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use toad_core::engine::TaggedWord;

    struct FixedTag;

    impl SentenceTagger for FixedTag {
        fn tag_sentences(&self, sentences: &[Vec<String>]) -> toad_core::Result<Vec<Vec<TaggedWord>>> {
            Ok(sentences
                .iter()
                .map(|s| s.iter().map(|w| TaggedWord::new(w.as_str(), "N")).collect())
                .collect())
        }
    }

    struct DropsWords;

    impl SentenceTagger for DropsWords {
        fn tag_sentences(&self, sentences: &[Vec<String>]) -> toad_core::Result<Vec<Vec<TaggedWord>>> {
            Ok(sentences.iter().map(|_| Vec::new()).collect())
        }
    }

    struct NoGenerator;

    impl TaggerGenerator for NoGenerator {
        fn generate(&self, _command: &TaggerCommand) -> toad_core::Result<()> {
            Ok(())
        }
    }

    fn sentence(words: &[&str], labels: &[&str], closed_by_mark: bool) -> Sentence {
        Sentence {
            words: words.iter().map(|w| w.to_string()).collect(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            closed_by_mark,
        }
    }

    fn run_batch(kind: &TaggerKind, tagger: &dyn SentenceTagger, batch: &[Sentence]) -> Result<String> {
        let config = Configuration::with_defaults(kind.stage());
        let out_dir = OutputDir::default();
        let pipeline = TaggerGen {
            kind,
            config: &config,
            out: &out_dir,
            pos_tagger: tagger,
            generator: &NoGenerator,
        };
        let mut out = Vec::new();
        pipeline.write_batch(batch, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn chunk_batch_closes_every_sentence() {
        let batch = [
            sentence(&["de", "kat"], &["B-NP", "I-NP"], true),
            sentence(&["slaapt"], &["B-VP"], false),
        ];
        let text = run_batch(&TaggerKind::Chunker, &FixedTag, &batch).unwrap();
        assert_eq!(
            text,
            "de\t_\tN\tN\tB-NP\nkat\tN\tN\t_\tI-NP\n<utt>\nslaapt\t_\tN\t_\tB-VP\n\n"
        );
    }

    #[test]
    fn ner_batch_adds_gazetteer_columns() {
        let mut gazetteer = Gazetteer::new();
        gazetteer.add("loc", "Gent");
        let kind = TaggerKind::Ner {
            gazetteer,
            index: PathBuf::from("gazets.idx"),
        };
        let batch = [sentence(&["in", "Gent"], &["O", "B-loc"], true)];
        let text = run_batch(&kind, &FixedTag, &batch).unwrap();
        assert_eq!(
            text,
            "in\t_\tN\tN\t_\tO\tloc\tO\nGent\tN\tN\t_\tO\tloc\t_\tB-loc\n<utt>\n"
        );
    }

    #[test]
    fn gazetteer_index_is_made_absolute() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("loc.lst"), "Gent\n").unwrap();
        std::fs::write(tmp.path().join("gazets.idx"), "loc loc.lst\n").unwrap();
        let given = tmp.path().join(".").join("gazets.idx");
        let TaggerKind::Ner { index, gazetteer } = ner_kind(&given).unwrap() else {
            panic!("expected a NER kind");
        };
        assert!(index.is_absolute());
        assert!(!index.components().any(|c| c == std::path::Component::CurDir));
        assert_eq!(index, tmp.path().join("gazets.idx").canonicalize().unwrap());
        assert_eq!(gazetteer.len(), 1);
    }

    #[test]
    fn missing_gazetteer_index_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(ner_kind(&tmp.path().join("gazets.idx")).is_err());
    }

    #[test]
    fn word_count_mismatch_is_an_error() {
        let batch = [sentence(&["de"], &["B-NP"], false)];
        assert!(run_batch(&TaggerKind::Chunker, &DropsWords, &batch).is_err());
    }
}
