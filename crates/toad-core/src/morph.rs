//! # Morpheme windows
//!
//! Turns a morpheme lexicon (`word c1 c2 ... cN`, one class code per
//! letter) into letter-window instances for the morphological analyzer:
//! six letters of left context, the focus letter, six letters of right
//! context, then the classes seen for the focus position.

use std::collections::BTreeSet;
use std::io::{BufRead, Write};

use tracing::warn;

use crate::corpus::fields::split_fields;
use crate::corpus::reader::LinePolicy;
use crate::error::{Result, ToadError};

/// Letters of context left of the focus.
pub const LEFT: usize = 6;
/// Letters of context right of the focus.
pub const RIGHT: usize = 6;
/// Filler for context positions outside the word.
pub const PAD: char = '_';

/// One lexicon line: a word and one morpheme class code per letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphEntry {
    pub word: String,
    pub classes: Vec<String>,
}

impl MorphEntry {
    /// Parses a lexicon line. Blank lines give `Ok(None)`.
    pub fn parse(line: &str, source_name: &str, line_no: usize) -> Result<Option<Self>> {
        let mut fields = split_fields(line);
        if fields.is_empty() {
            return Ok(None);
        }
        if fields.len() < 2 {
            return Err(ToadError::MalformedLine {
                source_name: source_name.to_string(),
                line_no,
                line: line.to_string(),
                expected: "a word followed by its morpheme classes".to_string(),
            });
        }
        let word = fields.remove(0).to_string();
        let letters = word.chars().count();
        if letters != fields.len() {
            return Err(ToadError::MorphemeCount {
                word,
                letters,
                classes: fields.len(),
            });
        }
        Ok(Some(Self {
            word,
            classes: fields.into_iter().map(str::to_string).collect(),
        }))
    }
}

/// The instance lines for `word`, one per letter.
///
/// `classes[i]` holds the class codes of letter `i`; they are joined with
/// `|` in sorted order.
pub fn window_lines(word: &str, classes: &[BTreeSet<String>]) -> Vec<String> {
    let letters: Vec<char> = word.chars().collect();
    let at = |i: isize| -> char {
        usize::try_from(i)
            .ok()
            .and_then(|i| letters.get(i).copied())
            .unwrap_or(PAD)
    };
    let mut lines = Vec::with_capacity(letters.len());
    for (i, focus) in letters.iter().enumerate() {
        let i = i as isize;
        let mut line = String::new();
        for j in (1..=LEFT as isize).rev() {
            line.push(at(i - j));
            line.push(',');
        }
        line.push(*focus);
        line.push(',');
        for j in 1..=RIGHT as isize {
            line.push(at(i + j));
            line.push(',');
        }
        let codes: Vec<&str> = classes
            .get(i as usize)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default();
        line.push_str(&codes.join("|"));
        lines.push(line);
    }
    lines
}

/// Streams lexicon entries into window instances.
///
/// Consecutive entries for the same word are merged: each letter position
/// collects the union of its class codes.
pub struct MorphInstanceWriter<W: Write> {
    out: W,
    word: String,
    classes: Vec<BTreeSet<String>>,
    lines: usize,
}

impl<W: Write> MorphInstanceWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            word: String::new(),
            classes: Vec::new(),
            lines: 0,
        }
    }

    pub fn push(&mut self, entry: MorphEntry) -> Result<()> {
        if entry.word != self.word {
            self.flush_word()?;
            self.word = entry.word;
            self.classes.clear();
        }
        if self.classes.len() < entry.classes.len() {
            self.classes.resize_with(entry.classes.len(), BTreeSet::new);
        }
        for (set, class) in self.classes.iter_mut().zip(entry.classes) {
            set.insert(class);
        }
        Ok(())
    }

    /// Reads a whole lexicon.
    ///
    /// Malformed entries abort under [`LinePolicy::Strict`] and are reported
    /// and skipped under [`LinePolicy::Lenient`].
    pub fn push_lexicon<R: BufRead>(&mut self, reader: R, source_name: &str, policy: LinePolicy) -> Result<()> {
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            match MorphEntry::parse(&line, source_name, idx + 1) {
                Ok(Some(entry)) => self.push(entry)?,
                Ok(None) => {}
                Err(e) if policy == LinePolicy::Lenient => {
                    warn!("skipping entry: {e}");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn flush_word(&mut self) -> Result<()> {
        if self.word.is_empty() {
            return Ok(());
        }
        for line in window_lines(&self.word, &self.classes) {
            writeln!(self.out, "{line}")?;
            self.lines += 1;
        }
        Ok(())
    }

    /// Writes the pending word and returns the number of lines written.
    pub fn finish(mut self) -> Result<usize> {
        self.flush_word()?;
        self.out.flush()?;
        Ok(self.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sets(codes: &[&str]) -> Vec<BTreeSet<String>> {
        codes
            .iter()
            .map(|c| BTreeSet::from([c.to_string()]))
            .collect()
    }

    #[test]
    fn windows_are_padded() {
        let lines = window_lines("kat", &sets(&["N", "0", "0"]));
        assert_eq!(
            lines,
            vec![
                "_,_,_,_,_,_,k,a,t,_,_,_,_,N",
                "_,_,_,_,_,k,a,t,_,_,_,_,_,0",
                "_,_,_,_,k,a,t,_,_,_,_,_,_,0",
            ]
        );
    }

    #[test]
    fn parse_rejects_wrong_counts() {
        assert!(MorphEntry::parse("", "lex", 1).unwrap().is_none());
        let err = MorphEntry::parse("kat", "lex", 2).unwrap_err();
        assert!(matches!(err, ToadError::MalformedLine { line_no: 2, .. }));
        let err = MorphEntry::parse("kat N 0", "lex", 3).unwrap_err();
        assert!(matches!(
            err,
            ToadError::MorphemeCount {
                letters: 3,
                classes: 2,
                ..
            }
        ));
    }

    #[test]
    fn consecutive_entries_merge() {
        let lexicon = "kat N 0 0\nkat V 0 0\nkater N 0 0 0 0\n";
        let mut out = Vec::new();
        let mut writer = MorphInstanceWriter::new(&mut out);
        writer
            .push_lexicon(Cursor::new(lexicon), "lex", LinePolicy::Strict)
            .unwrap();
        assert_eq!(writer.finish().unwrap(), 8);
        let text = String::from_utf8(out).unwrap();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "_,_,_,_,_,_,k,a,t,_,_,_,_,N|V");
    }

    #[test]
    fn lenient_skips_bad_entries() {
        let lexicon = "kat N 0\nhond N 0 0 0\n";
        let mut out = Vec::new();
        let mut writer = MorphInstanceWriter::new(&mut out);
        writer
            .push_lexicon(Cursor::new(lexicon), "lex", LinePolicy::Lenient)
            .unwrap();
        assert_eq!(writer.finish().unwrap(), 4);

        let mut writer = MorphInstanceWriter::new(Vec::new());
        assert!(
            writer
                .push_lexicon(Cursor::new(lexicon), "lex", LinePolicy::Strict)
                .is_err()
        );
    }
}
