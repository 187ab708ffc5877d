//! # Tagger context features
//!
//! Builds the enriched training lines for the NER and IOB chunk taggers:
//! each word followed by previous/current/next context columns and the gold
//! label, tab separated. Also converts `word ner pos` columns into the
//! older NER context format.

use std::io::{BufRead, Write};

use crate::corpus::fields::split_tabs;
use crate::corpus::reader::UTTERANCE_MARK;
use crate::error::{Result, ToadError};

/// Filler for context positions outside the sentence.
pub const BOUNDARY: &str = "_";

/// `(previous, current, next)` values around position `i`.
pub fn context<S: AsRef<str>>(values: &[S], i: usize) -> (&str, &str, &str) {
    let get = |j: Option<usize>| {
        j.and_then(|j| values.get(j))
            .map(|v| v.as_ref())
            .unwrap_or(BOUNDARY)
    };
    (get(i.checked_sub(1)), get(Some(i)), get(i.checked_add(1)))
}

/// `word  prevPOS  POS  nextPOS  gold` lines for the chunker.
pub fn chunk_feature_lines<S: AsRef<str>>(words: &[S], pos: &[S], gold: &[S]) -> Vec<String> {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let (prev, cur, next) = context(pos, i);
            let label = gold.get(i).map(|g| g.as_ref()).unwrap_or(BOUNDARY);
            format!("{}\t{prev}\t{cur}\t{next}\t{label}", word.as_ref())
        })
        .collect()
}

/// `word  prevPOS  POS  nextPOS  prevGaz  gaz  nextGaz  gold` lines for the
/// NER tagger.
pub fn ner_feature_lines<S: AsRef<str>>(words: &[S], pos: &[S], gazetteer: &[S], gold: &[S]) -> Vec<String> {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let (prev, cur, next) = context(pos, i);
            let (gprev, gcur, gnext) = context(gazetteer, i);
            let label = gold.get(i).map(|g| g.as_ref()).unwrap_or(BOUNDARY);
            format!(
                "{}\t{prev}\t{cur}\t{next}\t{gprev}\t{gcur}\t{gnext}\t{label}",
                word.as_ref()
            )
        })
        .collect()
}

/// The line written after each sentence: `<utt>` when the corpus closed it
/// with one, an empty line otherwise.
pub fn end_of_sentence(closed_by_mark: bool) -> &'static str {
    if closed_by_mark { UTTERANCE_MARK } else { "" }
}

/// Converts tab-separated `word ner pos` lines into
/// `word<TAB><TAB>ner<TAB>prevPOS<TAB>POS<TAB>nextPOS`.
///
/// Empty lines separate sentences and are kept. Returns the number of words
/// converted.
pub fn convert_ner_columns<R: BufRead, W: Write>(input: R, mut out: W) -> Result<usize> {
    let mut rows: Vec<(String, String, String)> = Vec::new();
    let mut converted = 0;
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            if !rows.is_empty() {
                converted += write_ner_rows(&mut rows, &mut out)?;
                writeln!(out)?;
            }
            continue;
        }
        match split_tabs(&line).as_slice() {
            [word, ner, pos, ..] => rows.push((word.to_string(), ner.to_string(), pos.to_string())),
            _ => {
                return Err(ToadError::MalformedLine {
                    source_name: "<stdin>".to_string(),
                    line_no: idx + 1,
                    line,
                    expected: "word, NER tag and POS tag".to_string(),
                });
            }
        }
    }
    converted += write_ner_rows(&mut rows, &mut out)?;
    out.flush()?;
    Ok(converted)
}

fn write_ner_rows<W: Write>(rows: &mut Vec<(String, String, String)>, out: &mut W) -> Result<usize> {
    let pos: Vec<&str> = rows.iter().map(|(_, _, p)| p.as_str()).collect();
    for (i, (word, ner, _)) in rows.iter().enumerate() {
        let (prev, cur, next) = context(&pos, i);
        writeln!(out, "{word}\t\t{ner}\t{prev}\t{cur}\t{next}")?;
    }
    let written = rows.len();
    rows.clear();
    Ok(written)
}
