//! # Lexicons
//!
//! [`Lexicon`] is a set of known (lowercased) word forms used by the
//! validators. [`LemmaIndex`] collects word → lemma → tag counts from a
//! tagged corpus and yields them in sorted order for the lemmatizer
//! training file.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use tracing::{info, warn};

use crate::corpus::fields::first_field;
use crate::corpus::reader::{CorpusReader, Record};
use crate::error::{Result, ToadError};

/// A set of known word forms, compared in lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    words: HashSet<String>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a word. Returns `false` when it was already known.
    pub fn insert(&mut self, word: &str) -> bool {
        self.words.insert(word.to_lowercase())
    }

    /// Whether the lowercased form of `word` is known.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Adds the first field of every non-empty line.
    ///
    /// Returns the number of lines read.
    pub fn add_first_fields<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut count = 0;
        for line in reader.lines() {
            let line = line?;
            if let Some(word) = first_field(&line) {
                self.insert(word);
                count += 1;
            }
        }
        Ok(count)
    }

    /// Like [`add_first_fields`](Self::add_first_fields), reading from a file.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ToadError::file(path, e))?;
        let count = self.add_first_fields(BufReader::new(file))?;
        info!("added {count} words from {}", path.display());
        Ok(count)
    }

    /// Adds an auxiliary word list. A missing file is reported and ignored.
    pub fn add_optional_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        match File::open(path) {
            Ok(file) => {
                let count = self.add_first_fields(BufReader::new(file))?;
                info!("added {count} words from {}", path.display());
                Ok(count)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("lexicon {} not found, continuing without it", path.display());
                Ok(0)
            }
            Err(e) => Err(ToadError::file(path, e)),
        }
    }
}

impl<S: AsRef<str>> Extend<S> for Lexicon {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for word in iter {
            self.insert(word.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for Lexicon {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut lexicon = Self::new();
        lexicon.extend(iter);
        lexicon
    }
}

/// Word → lemma → tag → count, iterated in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LemmaIndex {
    entries: BTreeMap<String, BTreeMap<String, BTreeMap<String, usize>>>,
}

impl LemmaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one `(word, lemma, tag)` observation.
    pub fn insert(&mut self, word: &str, lemma: &str, tag: &str) {
        *self
            .entries
            .entry(word.to_string())
            .or_default()
            .entry(lemma.to_string())
            .or_default()
            .entry(tag.to_string())
            .or_default() += 1;
    }

    /// Adds every 3-field record of a `word lemma tag` corpus.
    ///
    /// Sentence boundaries are ignored. Returns the number of records added.
    pub fn add_corpus<R: BufRead>(&mut self, records: CorpusReader<R>) -> Result<usize> {
        let mut added = 0;
        for record in records {
            if let Record::Fields { fields, .. } = record? {
                if let [word, lemma, tag] = fields.as_slice() {
                    self.insert(word, lemma, tag);
                    added += 1;
                }
            }
        }
        Ok(added)
    }

    /// Number of distinct word forms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct word forms in sorted order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// How often `word` was seen with `lemma` and `tag`.
    pub fn count(&self, word: &str, lemma: &str, tag: &str) -> usize {
        self.entries
            .get(word)
            .and_then(|l| l.get(lemma))
            .and_then(|t| t.get(tag))
            .copied()
            .unwrap_or(0)
    }

    /// All distinct `(word, lemma, tag)` triples, sorted by word, then
    /// lemma, then tag.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.entries.iter().flat_map(|(word, lemmas)| {
            lemmas.iter().flat_map(move |(lemma, tags)| {
                tags.keys()
                    .map(move |tag| (word.as_str(), lemma.as_str(), tag.as_str()))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::reader::LinePolicy;
    use std::io::Cursor;

    #[test]
    fn lexicon_lowercases_and_is_idempotent() {
        let mut lexicon: Lexicon = ["Huis", "boom"].into_iter().collect();
        assert!(lexicon.contains("huis"));
        assert!(lexicon.contains("BOOM"));
        let before = lexicon.clone();
        lexicon.extend(["huis", "HUIS", "boom"]);
        assert_eq!(lexicon, before);
        assert_eq!(lexicon.len(), 2);
    }

    #[test]
    fn first_fields_skip_empty_lines() {
        let mut lexicon = Lexicon::new();
        let n = lexicon
            .add_first_fields(Cursor::new("lopen 120\n\nhuis 3 N\n"))
            .unwrap();
        assert_eq!(n, 2);
        assert!(lexicon.contains("lopen"));
        assert!(!lexicon.contains("120"));
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut lexicon = Lexicon::new();
        let n = lexicon
            .add_optional_file(dir.path().join("known.lemmas"))
            .unwrap();
        assert_eq!(n, 0);
        assert!(lexicon.add_file(dir.path().join("mblem.lex")).is_err());
    }

    #[test]
    fn index_counts_and_sorts() {
        let text = "lopen\tlopen\tWW(inf)\n<utt>\nloopt\tlopen\tWW(pv,tgw,met-t)\nlopen\tlopen\tWW(inf)\nlopen\tloop\tN(soort,mv)\n";
        let mut index = LemmaIndex::new();
        let records = CorpusReader::new(Cursor::new(text), "c", 3, LinePolicy::Strict);
        assert_eq!(index.add_corpus(records).unwrap(), 4);
        assert_eq!(index.len(), 2);
        assert_eq!(index.count("lopen", "lopen", "WW(inf)"), 2);
        let triples: Vec<_> = index.iter().collect();
        assert_eq!(
            triples,
            vec![
                ("loopt", "lopen", "WW(pv,tgw,met-t)"),
                ("lopen", "loop", "N(soort,mv)"),
                ("lopen", "lopen", "WW(inf)"),
            ]
        );
    }
}
