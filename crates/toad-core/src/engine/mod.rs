//! # Engines
//!
//! The trainers and validators never learn or classify anything themselves.
//! They hand data files to a memory-based learner, a tagger generator, a
//! tagger, a lemmatizer, a morphological analyzer or a tokenizer, each
//! reached through one of the traits below. [`process`] implements them by
//! running the usual command-line programs; tests plug in fakes.

pub mod process;
pub mod tagger_command;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use process::{FrogAnalyzer, MbtGenerator, MbtTagger, TimblLearner, TimblLemmatizer, UctoTokenizer};
pub use tagger_command::{DataFormat, TaggerCommand};

/// A word with the tag an engine assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedWord {
    pub word: String,
    pub tag: String,
}

impl TaggedWord {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }
}

/// One lemma a lemmatizer proposes for a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmaCandidate {
    pub lemma: String,
    pub tag: String,
}

/// Trains an instance base from an instance file.
pub trait InstanceLearner: Send + Sync {
    /// Learns `data` with the learner `options` and stores the result at `tree`.
    fn learn(&self, data: &Path, options: &str, tree: &Path) -> Result<()>;
}

/// Builds a tagger (settings file plus instance bases) from tagged data.
pub trait TaggerGenerator: Send + Sync {
    fn generate(&self, command: &TaggerCommand) -> Result<()>;
}

/// Tags whole sentences with an existing tagger.
pub trait SentenceTagger {
    /// Tags a batch of sentences. The result has one entry per sentence.
    fn tag_sentences(&self, sentences: &[Vec<String>]) -> Result<Vec<Vec<TaggedWord>>>;

    fn tag_sentence(&self, words: &[String]) -> Result<Vec<TaggedWord>> {
        let mut tagged = self.tag_sentences(&[words.to_vec()])?;
        Ok(tagged.pop().unwrap_or_default())
    }
}

/// Proposes lemmas for isolated words.
pub trait WordLemmatizer {
    /// One candidate list per input word.
    fn lemmatize(&self, words: &[String]) -> Result<Vec<Vec<LemmaCandidate>>>;
}

/// Splits words into morphemes.
pub trait MorphAnalyzer {
    /// For every input word, its analyses; each analysis is a morpheme list.
    fn analyze(&self, words: &[String]) -> Result<Vec<Vec<Vec<String>>>>;
}

/// Counts the tokens a tokenizer makes of each line.
pub trait LineTokenizer {
    fn count_tokens(&self, lines: &[String]) -> Result<Vec<usize>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl SentenceTagger for Echo {
        fn tag_sentences(&self, sentences: &[Vec<String>]) -> Result<Vec<Vec<TaggedWord>>> {
            Ok(sentences
                .iter()
                .map(|s| s.iter().map(|w| TaggedWord::new(w.as_str(), "X")).collect())
                .collect())
        }
    }

    #[test]
    fn single_sentence_goes_through_batch() {
        let tagged = Echo
            .tag_sentence(&["Jan".to_string(), "slaapt".to_string()])
            .unwrap();
        assert_eq!(tagged, vec![TaggedWord::new("Jan", "X"), TaggedWord::new("slaapt", "X")]);
    }

    #[test]
    fn candidates_serialize_as_objects() {
        let candidate = LemmaCandidate {
            lemma: "lopen".into(),
            tag: "WW(inf)".into(),
        };
        let json = serde_json::to_string(&candidate).unwrap();
        assert_eq!(json, r#"{"lemma":"lopen","tag":"WW(inf)"}"#);
        let back: LemmaCandidate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, candidate);
    }
}
