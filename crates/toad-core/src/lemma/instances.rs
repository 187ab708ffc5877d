//! Lemmatizer training instances.
//!
//! One line per suffix context: the last [`HISTORY`] characters of the
//! word (right aligned, `=` padded), each followed by a space, then the
//! class labels of that context joined with `|`.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::corpus::fields::split_fields;
use crate::error::{Result, ToadError};
use crate::lemma::edit::EditScript;
use crate::lemma::particles::ParticleTable;
use crate::lexicon::LemmaIndex;

/// Number of word-final characters in an instance.
pub const HISTORY: usize = 20;

/// Label used for tags missing from a translation table.
pub const UNKNOWN_TAG: &str = "?";

/// The feature part of an instance for `word`, including the trailing space.
pub fn suffix_context(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut out = String::with_capacity(HISTORY * 2);
    let pad = HISTORY.saturating_sub(chars.len());
    for _ in 0..pad {
        out.push_str("= ");
    }
    for c in &chars[chars.len() - (HISTORY - pad)..] {
        out.push(*c);
        out.push(' ');
    }
    out
}

/// Streams labelled words into instance lines.
///
/// Consecutive words with the same suffix context share one line.
pub struct LemmaInstanceWriter<W: Write> {
    out: W,
    context: String,
    labels: Vec<String>,
    lines: usize,
}

impl<W: Write> LemmaInstanceWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            context: String::new(),
            labels: Vec::new(),
            lines: 0,
        }
    }

    /// Adds one class label for `word`.
    pub fn push(&mut self, word: &str, label: String) -> Result<()> {
        let context = suffix_context(word);
        if context != self.context {
            self.flush_line()?;
            self.context = context;
        }
        self.labels.push(label);
        Ok(())
    }

    /// Computes and adds the labels of every entry in `index`.
    pub fn push_index(&mut self, index: &LemmaIndex, particles: &ParticleTable) -> Result<()> {
        for (word, lemma, tag) in index.iter() {
            let script = EditScript::compute(word, lemma, tag, particles);
            self.push(word, script.label(tag))?;
        }
        Ok(())
    }

    fn flush_line(&mut self) -> Result<()> {
        if self.labels.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "{}{}", self.context, self.labels.join("|"))?;
        self.labels.clear();
        self.lines += 1;
        Ok(())
    }

    /// Writes the pending line and returns the number of lines written.
    pub fn finish(mut self) -> Result<usize> {
        self.flush_line()?;
        self.out.flush()?;
        Ok(self.lines)
    }
}

/// Tag → short class code table, read from `tag code` lines.
#[derive(Debug, Clone, Default)]
pub struct TagTranslations {
    codes: HashMap<String, String>,
}

impl TagTranslations {
    pub fn from_reader<R: BufRead>(reader: R, source_name: &str) -> Result<Self> {
        let mut codes = HashMap::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match split_fields(&line).as_slice() {
                [tag, code] => {
                    codes.entry(tag.to_string()).or_insert_with(|| code.to_string());
                }
                _ => {
                    return Err(ToadError::MalformedLine {
                        source_name: source_name.to_string(),
                        line_no: idx + 1,
                        line,
                        expected: "tag and code".to_string(),
                    });
                }
            }
        }
        Ok(Self { codes })
    }

    /// Code for `tag`, if it has one.
    pub fn translate(&self, tag: &str) -> Option<&str> {
        self.codes.get(tag).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn short_words_are_padded() {
        let ctx = suffix_context("lopen");
        assert_eq!(ctx, format!("{}l o p e n ", "= ".repeat(15)));
        assert_eq!(ctx.chars().filter(|c| *c == ' ').count(), HISTORY);
    }

    #[test]
    fn long_words_keep_the_tail() {
        let word = "arbeidsongeschiktheidsverzekering";
        let ctx = suffix_context(word);
        let tail: String = word.chars().skip(word.chars().count() - HISTORY).collect();
        let expected: String = tail.chars().map(|c| format!("{c} ")).collect();
        assert_eq!(ctx, expected);
    }

    #[test]
    fn multibyte_chars() {
        let ctx = suffix_context("geërfd");
        assert!(ctx.ends_with("g e ë r f d "));
    }

    #[test]
    fn writer_merges_equal_contexts() {
        let mut index = LemmaIndex::new();
        index.insert("gelopen", "lopen", "WW(vd,vrij,zonder)");
        index.insert("gelopen", "gelopen", "ADJ(vrij,basis,zonder)");
        index.insert("lopen", "lopen", "WW(inf)");
        let mut out = Vec::new();
        let mut writer = LemmaInstanceWriter::new(&mut out);
        writer.push_index(&index, &ParticleTable::dutch()).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            format!(
                "{}g e l o p e n ADJ(vrij,basis,zonder)|WW(vd,vrij,zonder)+Pge",
                "= ".repeat(13)
            )
        );
        assert_eq!(lines[1], format!("{}l o p e n WW(inf)", "= ".repeat(15)));
    }

    #[test]
    fn translations_table() {
        let table = TagTranslations::from_reader(Cursor::new("WW(inf) 1\n\nN(soort,ev) 2\n"), "t").unwrap();
        assert_eq!(table.translate("WW(inf)"), Some("1"));
        assert_eq!(table.translate("ADJ"), None);
        assert!(TagTranslations::from_reader(Cursor::new("WW(inf)\n"), "t").is_err());
    }
}
