//! Model checks against known-word lexicons.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use toad_core::corpus::{CorpusReader, LinePolicy, Record, split_fields};
use toad_core::engine::{MorphAnalyzer, WordLemmatizer};
use toad_core::{Lexicon, MorphEntry};
use tracing::{info, warn};

/// Words handed to an engine per call.
pub const BATCH: usize = 1000;

/// Lemmas shorter than this are never reported.
pub const MIN_LEMMA_CHARS: usize = 3;

/// A lemma the lemmatizer proposed that no lexicon knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownLemma {
    pub word: String,
    pub lemma: String,
}

impl fmt::Display for UnknownLemma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ==> {}", self.word, self.lemma)
    }
}

/// A suspicious morphological analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MorphFinding {
    /// No morpheme of the analysis is a known word.
    UnknownLemma { word: String, analysis: Vec<String> },
    /// Some non-initial morphemes are not known morphemes.
    UnknownMorphemes {
        word: String,
        morphemes: Vec<String>,
        analysis: Vec<String>,
    },
}

impl fmt::Display for MorphFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MorphFinding::UnknownLemma { word, analysis } => {
                write!(f, "UNK LEMMA {word} - {{{}}}", analysis.join(","))
            }
            MorphFinding::UnknownMorphemes {
                word,
                morphemes,
                analysis,
            } => {
                write!(f, "UNK MOR ")?;
                for m in morphemes {
                    write!(f, "[{m}] ")?;
                }
                write!(f, "{word} - {{{}}}", analysis.join(","))
            }
        }
    }
}

/// One analysis printed by `analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub word: String,
    pub morphemes: Vec<String>,
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ==> ", self.word)?;
        for m in &self.morphemes {
            write!(f, "[{m}]")?;
        }
        Ok(())
    }
}

fn is_lowercase(word: &str) -> bool {
    word.to_lowercase() == word
}

/// Reads a `word lemma tag` lexicon: the known words, and the lowercase
/// words to check in file order.
pub fn read_lemma_lexicon(path: &Path) -> Result<(Lexicon, Vec<String>)> {
    let mut lexicon = Lexicon::new();
    let mut to_check = Vec::new();
    info!("building a lexicon from {}", path.display());
    for record in CorpusReader::open(path, 3, LinePolicy::Lenient)? {
        let Record::Fields { fields, .. } = record? else {
            continue;
        };
        if let Some(word) = fields.into_iter().next() {
            lexicon.insert(&word);
            if is_lowercase(&word) {
                to_check.push(word);
            }
        }
    }
    info!("found {} words", lexicon.len());
    Ok((lexicon, to_check))
}

/// Reads a morpheme lexicon (`word c1 ... cN`). Entries whose class count
/// does not match the word are reported and skipped.
pub fn read_morph_lexicon(path: &Path) -> Result<(Lexicon, Vec<String>)> {
    let source = path.display().to_string();
    let file = File::open(path).with_context(|| format!("could not open mbma file '{source}'"))?;
    let mut lexicon = Lexicon::new();
    let mut words = Vec::new();
    info!("building a lexicon from {source}");
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        match MorphEntry::parse(&line, &source, idx + 1) {
            Ok(Some(entry)) => {
                lexicon.insert(&entry.word);
                words.push(entry.word);
            }
            Ok(None) => {}
            Err(e) => warn!("problem in line '{line}': {e}"),
        }
    }
    info!("found {} words", lexicon.len());
    Ok((lexicon, words))
}

/// Adds a word list; an explicitly named file must exist, the default one
/// may be missing.
pub fn add_word_list(lexicon: &mut Lexicon, explicit: Option<&Path>, default: &str) -> Result<usize> {
    let added = match explicit {
        Some(path) => lexicon.add_file(path)?,
        None => lexicon.add_optional_file(default)?,
    };
    Ok(added)
}

/// Frequent words from a `word freq x y` frequency list: those seen more
/// than `limit` times, in sorted order.
pub fn read_frequent_words<R: BufRead>(reader: R, limit: usize) -> Result<BTreeMap<String, usize>> {
    let mut words = BTreeMap::new();
    for line in reader.lines() {
        let line = line?;
        let fields = split_fields(&line);
        let [word, freq, _, _] = fields.as_slice() else {
            continue;
        };
        match freq.parse::<usize>() {
            Ok(freq) if freq > limit => {
                words.insert(word.to_string(), freq);
            }
            Ok(_) => {}
            Err(_) => warn!("illegal int in {line}"),
        }
    }
    info!("read {} test words", words.len());
    Ok(words)
}

/// First field of every non-empty line.
pub fn read_word_column<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if let Some(word) = split_fields(&line).first() {
            words.push(word.to_string());
        }
    }
    Ok(words)
}

/// Lemmatizes `words` and reports proposed lemmas that differ from the
/// word, have at least [`MIN_LEMMA_CHARS`] characters and are not in
/// `lexicon`.
pub fn check_lemmas(
    lemmatizer: &dyn WordLemmatizer,
    words: &[String],
    lexicon: &Lexicon,
) -> Result<Vec<UnknownLemma>> {
    let mut findings = Vec::new();
    for batch in words.chunks(BATCH) {
        let candidates = lemmatizer.lemmatize(batch)?;
        for (word, candidates) in batch.iter().zip(candidates) {
            let mut seen = BTreeSet::new();
            for candidate in candidates {
                let lemma = candidate.lemma.to_lowercase();
                if lemma == *word
                    || lemma.chars().count() < MIN_LEMMA_CHARS
                    || lexicon.contains(&lemma)
                    || !seen.insert(lemma.clone())
                {
                    continue;
                }
                findings.push(UnknownLemma {
                    word: word.clone(),
                    lemma,
                });
            }
        }
    }
    Ok(findings)
}

/// Findings for one analysis of `word`.
///
/// A morpheme equal to the word, or any morpheme in `lexicon`, accounts
/// for the lemma. With `known_morphs`, non-initial morphemes longer than
/// one character must be known morphemes.
pub fn check_analysis(
    word: &str,
    analysis: &[String],
    lexicon: &Lexicon,
    known_morphs: Option<&Lexicon>,
) -> Option<MorphFinding> {
    let mut lemma_found = false;
    let mut unknown = Vec::new();
    for (j, morpheme) in analysis.iter().enumerate() {
        let morpheme = morpheme.to_lowercase();
        if morpheme == word {
            lemma_found = true;
            break;
        }
        if lexicon.contains(&morpheme) {
            lemma_found = true;
        } else if let Some(morphs) = known_morphs {
            if j != 0 && morpheme.chars().count() != 1 && !morphs.contains(&morpheme) {
                unknown.push(analysis[j].clone());
            }
        }
    }
    if !lemma_found {
        Some(MorphFinding::UnknownLemma {
            word: word.to_string(),
            analysis: analysis.to_vec(),
        })
    } else if !unknown.is_empty() {
        Some(MorphFinding::UnknownMorphemes {
            word: word.to_string(),
            morphemes: unknown,
            analysis: analysis.to_vec(),
        })
    } else {
        None
    }
}

/// Analyzes the lowercase words of `words` and checks every analysis.
pub fn check_morphology(
    analyzer: &dyn MorphAnalyzer,
    words: &[String],
    lexicon: &Lexicon,
    known_morphs: Option<&Lexicon>,
) -> Result<Vec<MorphFinding>> {
    let words: Vec<String> = words.iter().filter(|w| is_lowercase(w)).cloned().collect();
    let mut findings = Vec::new();
    for batch in words.chunks(BATCH) {
        let analyses = analyzer.analyze(batch)?;
        for (word, analyses) in batch.iter().zip(analyses) {
            findings.extend(
                analyses
                    .iter()
                    .filter_map(|a| check_analysis(word, a, lexicon, known_morphs)),
            );
        }
    }
    Ok(findings)
}

/// Analyses of `words`, lowercased, in input order.
pub fn analyze_words(analyzer: &dyn MorphAnalyzer, words: &[String]) -> Result<Vec<Analysis>> {
    let words: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let mut out = Vec::new();
    for batch in words.chunks(BATCH) {
        let analyses = analyzer.analyze(batch)?;
        for (word, analyses) in batch.iter().zip(analyses) {
            if analyses.is_empty() {
                warn!("no analysis for: {word}");
            }
            out.extend(analyses.into_iter().map(|morphemes| Analysis {
                word: word.clone(),
                morphemes,
            }));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use std::io::Cursor;
    use toad_core::engine::LemmaCandidate;

    struct TableLemmatizer(HashMap<&'static str, Vec<&'static str>>);

    impl WordLemmatizer for TableLemmatizer {
        fn lemmatize(&self, words: &[String]) -> toad_core::Result<Vec<Vec<LemmaCandidate>>> {
            Ok(words
                .iter()
                .map(|w| {
                    self.0
                        .get(w.as_str())
                        .into_iter()
                        .flatten()
                        .map(|l| LemmaCandidate {
                            lemma: l.to_string(),
                            tag: "WW".to_string(),
                        })
                        .collect()
                })
                .collect())
        }
    }

    struct TableAnalyzer(HashMap<&'static str, Vec<Vec<&'static str>>>);

    impl MorphAnalyzer for TableAnalyzer {
        fn analyze(&self, words: &[String]) -> toad_core::Result<Vec<Vec<Vec<String>>>> {
            Ok(words
                .iter()
                .map(|w| {
                    self.0
                        .get(w.as_str())
                        .into_iter()
                        .flatten()
                        .map(|a| a.iter().map(|m| m.to_string()).collect())
                        .collect()
                })
                .collect())
        }
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn reports_unknown_lemmas_only() {
        let lexicon: Lexicon = ["lopen", "fiets"].into_iter().collect();
        let lemmatizer = TableLemmatizer(HashMap::from([
            ("liep", vec!["lopen", "liepen", "liepen"]),
            ("fietsen", vec!["fiets", "fietsen"]),
            ("at", vec!["et"]),
        ]));
        let findings = check_lemmas(&lemmatizer, &words(&["liep", "fietsen", "at"]), &lexicon).unwrap();
        assert_eq!(
            findings,
            vec![UnknownLemma {
                word: "liep".into(),
                lemma: "liepen".into()
            }]
        );
        assert_eq!(findings[0].to_string(), "liep ==> liepen");
    }

    #[test]
    fn unknown_lemma_analysis() {
        let lexicon: Lexicon = ["huis"].into_iter().collect();
        let finding = check_analysis("fietsbel", &words(&["fiets", "bel"]), &lexicon, None).unwrap();
        assert_eq!(finding.to_string(), "UNK LEMMA fietsbel - {fiets,bel}");
        assert!(check_analysis("huis", &words(&["huis"]), &Lexicon::new(), None).is_none());
    }

    #[test]
    fn unknown_morphemes_need_flag() {
        let lexicon: Lexicon = ["huis"].into_iter().collect();
        let morphs: Lexicon = ["je"].into_iter().collect();
        let analysis = words(&["huis", "je", "s", "xq"]);
        assert!(check_analysis("huisjesxq", &analysis, &lexicon, None).is_none());
        let finding = check_analysis("huisjesxq", &analysis, &lexicon, Some(&morphs)).unwrap();
        assert_eq!(finding.to_string(), "UNK MOR [xq] huisjesxq - {huis,je,s,xq}");
    }

    #[test]
    fn check_morphology_skips_capitalised_words() {
        let lexicon = Lexicon::new();
        let analyzer = TableAnalyzer(HashMap::from([("gent", vec![vec!["gent"]]), ("kat", vec![vec!["ka", "t"]])]));
        let findings = check_morphology(&analyzer, &words(&["Gent", "kat"]), &lexicon, None).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(matches!(&findings[0], MorphFinding::UnknownLemma { word, .. } if word == "kat"));
    }

    #[test]
    fn analyses_print_bracketed() {
        let analyzer = TableAnalyzer(HashMap::from([("fietsbel", vec![vec!["fiets", "bel"]])]));
        let out = analyze_words(&analyzer, &words(&["Fietsbel"])).unwrap();
        assert_eq!(out[0].to_string(), "fietsbel ==> [fiets][bel]");
    }

    #[test]
    fn findings_serialize_with_kind() {
        let finding = MorphFinding::UnknownLemma {
            word: "kat".into(),
            analysis: vec!["ka".into(), "t".into()],
        };
        assert_eq!(
            serde_json::to_string(&finding).unwrap(),
            r#"{"kind":"unknown_lemma","word":"kat","analysis":["ka","t"]}"#
        );
    }

    #[test]
    fn frequency_limit_is_exclusive() {
        let list = "de 100 x y\nkat 10 x y\nhond 11 x y\nraar zz x y\nkort 50\n";
        let words = read_frequent_words(Cursor::new(list), 10).unwrap();
        assert_eq!(words.keys().collect::<Vec<_>>(), vec!["de", "hond"]);
    }

    #[test]
    fn lemma_lexicon_collects_lowercase_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mblem.lex");
        fs::write(&path, "Jan Jan SPEC\nliep lopen WW\nkapot\n").unwrap();
        let (lexicon, to_check) = read_lemma_lexicon(&path).unwrap();
        assert!(lexicon.contains("jan"));
        assert_eq!(lexicon.len(), 2);
        assert_eq!(to_check, vec!["liep"]);
    }

    #[test]
    fn morph_lexicon_skips_bad_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mbma.lex");
        fs::write(&path, "kat N 0 0\nhond N 0\n").unwrap();
        let (lexicon, words) = read_morph_lexicon(&path).unwrap();
        assert_eq!(lexicon.len(), 1);
        assert_eq!(words, vec!["kat"]);
    }

    #[test]
    fn explicit_word_list_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let mut lexicon = Lexicon::new();
        assert!(add_word_list(&mut lexicon, Some(&dir.path().join("nope")), "nope").is_err());
        let missing_default = dir.path().join("known.lemmas");
        let default = missing_default.to_str().unwrap();
        assert_eq!(add_word_list(&mut lexicon, None, default).unwrap(), 0);
    }
}
