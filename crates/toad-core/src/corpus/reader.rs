//! Line-oriented readers for tagged corpora.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::warn;
use unicode_normalization::UnicodeNormalization;

use crate::corpus::fields::split_fields;
use crate::corpus::tags::TagCheck;
use crate::error::{Result, ToadError};

/// Explicit sentence separator used in corpora.
pub const UTTERANCE_MARK: &str = "<utt>";

/// What to do with lines that do not have the expected number of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinePolicy {
    /// Abort on the first malformed line.
    #[default]
    Strict,
    /// Report malformed lines and skip them.
    Lenient,
}

/// One meaningful line of a corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A sentence boundary: `<utt>` or an empty line.
    Boundary {
        /// `true` for `<utt>`, `false` for an empty line.
        utterance_mark: bool,
    },
    /// A line split into exactly the expected number of fields, each in NFC.
    Fields { line_no: usize, fields: Vec<String> },
}

/// Reads a corpus record by record, enforcing a fixed field count.
pub struct CorpusReader<R> {
    lines: io::Lines<R>,
    source_name: String,
    line_no: usize,
    expected_fields: usize,
    policy: LinePolicy,
    skipped: usize,
}

impl CorpusReader<BufReader<File>> {
    /// Opens a corpus file.
    pub fn open<P: AsRef<Path>>(path: P, expected_fields: usize, policy: LinePolicy) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ToadError::file(path, e))?;
        Ok(Self::new(
            BufReader::new(file),
            path.display().to_string(),
            expected_fields,
            policy,
        ))
    }
}

impl<R: BufRead> CorpusReader<R> {
    /// Wraps any buffered reader; `source_name` is used in messages.
    pub fn new(reader: R, source_name: impl Into<String>, expected_fields: usize, policy: LinePolicy) -> Self {
        Self {
            lines: reader.lines(),
            source_name: source_name.into(),
            line_no: 0,
            expected_fields,
            policy,
            skipped: 0,
        }
    }

    /// Name used for this corpus in messages.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Number of malformed lines skipped so far (lenient mode only).
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> Iterator for CorpusReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Some(Ok(Record::Boundary {
                    utterance_mark: false,
                }));
            }
            if trimmed == UTTERANCE_MARK {
                return Some(Ok(Record::Boundary {
                    utterance_mark: true,
                }));
            }
            let fields = split_fields(&line);
            if fields.len() == self.expected_fields {
                return Some(Ok(Record::Fields {
                    line_no: self.line_no,
                    fields: fields.into_iter().map(|f| f.nfc().collect()).collect(),
                }));
            }
            match self.policy {
                LinePolicy::Strict => {
                    return Some(Err(ToadError::MalformedLine {
                        source_name: self.source_name.clone(),
                        line_no: self.line_no,
                        line,
                        expected: format!("{} fields", self.expected_fields),
                    }));
                }
                LinePolicy::Lenient => {
                    self.skipped += 1;
                    warn!(
                        source = %self.source_name,
                        line_no = self.line_no,
                        "skipping line with {} fields (should be {}): '{line}'",
                        fields.len(),
                        self.expected_fields
                    );
                }
            }
        }
    }
}

/// A sentence from a two-column `word<TAB>label` corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    pub words: Vec<String>,
    pub labels: Vec<String>,
    /// Whether the sentence was closed by `<utt>` rather than an empty line.
    pub closed_by_mark: bool,
}

impl Sentence {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Groups `word<TAB>label` records into sentences.
pub struct SentenceReader<R> {
    records: CorpusReader<R>,
    check: TagCheck,
    saw_utterance_mark: bool,
}

impl<R: BufRead> SentenceReader<R> {
    /// Reads sentences, validating each label with `check`.
    pub fn new(records: CorpusReader<R>, check: TagCheck) -> Self {
        Self {
            records,
            check,
            saw_utterance_mark: false,
        }
    }

    /// Whether any `<utt>` separator has been read so far.
    pub fn saw_utterance_mark(&self) -> bool {
        self.saw_utterance_mark
    }

    /// Number of labels rejected so far.
    pub fn rejected_labels(&self) -> usize {
        self.check.rejected()
    }
}

impl<R: BufRead> Iterator for SentenceReader<R> {
    type Item = Result<Sentence>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut sentence = Sentence::default();
        loop {
            match self.records.next() {
                None => {
                    return if sentence.is_empty() {
                        None
                    } else {
                        Some(Ok(sentence))
                    };
                }
                Some(Err(e)) => return Some(Err(e)),
                Some(Ok(Record::Boundary { utterance_mark })) => {
                    self.saw_utterance_mark |= utterance_mark;
                    if !sentence.is_empty() {
                        sentence.closed_by_mark = utterance_mark;
                        return Some(Ok(sentence));
                    }
                }
                Some(Ok(Record::Fields { line_no, mut fields })) => {
                    let line = fields.join("\t");
                    let source = self.records.source_name().to_string();
                    let label = fields.pop().unwrap_or_default();
                    match self.check.accept(&label, &source, line_no, &line) {
                        Ok(true) => {
                            let prev = sentence.labels.last().map(String::as_str);
                            if let Err(e) = self.check.check_transition(prev, &label, &source, line_no, &line) {
                                return Some(Err(e));
                            }
                            let word = fields.into_iter().next().unwrap_or_default();
                            sentence.words.push(word);
                            sentence.labels.push(label);
                        }
                        Ok(false) => {}
                        Err(e) => return Some(Err(e)),
                    }
                }
            }
        }
    }
}
