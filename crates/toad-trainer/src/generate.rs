//! Standalone instance generators: lemmatizer instances straight from a
//! sorted lexicon, and morpheme windows without training.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use toad_core::corpus::{CorpusReader, LinePolicy, Record};
use toad_core::lemma::{TagTranslations, UNKNOWN_TAG};
use toad_core::{EditScript, LemmaInstanceWriter, MorphInstanceWriter, ParticleTable};
use tracing::warn;

/// Counts from a [`make_mblem`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MblemStats {
    pub entries: usize,
    pub instances: usize,
    pub unknown_tags: usize,
}

/// Streams a `word lemma tag` lexicon into lemmatizer instances.
///
/// The lexicon is expected sorted on word form; adjacent words sharing a
/// suffix context end up on one line. With `translations`, tags are
/// replaced by their code and unknown tags by `?`. Particles are matched
/// against the original tag.
pub fn make_mblem<R: BufRead, W: Write>(
    lexicon: CorpusReader<R>,
    particles: &ParticleTable,
    translations: Option<&TagTranslations>,
    out: W,
) -> Result<MblemStats> {
    let mut stats = MblemStats::default();
    let mut writer = LemmaInstanceWriter::new(out);
    for record in lexicon {
        let Record::Fields { fields, .. } = record? else {
            continue;
        };
        let [word, lemma, tag] = fields.as_slice() else {
            continue;
        };
        let script = EditScript::compute(word, lemma, tag, particles);
        let class = match translations {
            Some(table) => match table.translate(tag) {
                Some(code) => code,
                None => {
                    warn!("UNKNOWN TAG: {tag}");
                    stats.unknown_tags += 1;
                    UNKNOWN_TAG
                }
            },
            None => tag.as_str(),
        };
        writer.push(word, script.label(class))?;
        stats.entries += 1;
    }
    stats.instances = writer.finish()?;
    Ok(stats)
}

/// Turns a morpheme lexicon into window instances. Returns the number of
/// instance lines.
pub fn make_mbma<R: BufRead, W: Write>(lexicon: R, source_name: &str, policy: LinePolicy, out: W) -> Result<usize> {
    let mut writer = MorphInstanceWriter::new(out);
    writer.push_lexicon(lexicon, source_name, policy)?;
    Ok(writer.finish()?)
}

/// Opens the output of a generator: a file, or stdout for `None` and `-`.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path).with_context(|| format!("could not open output file '{}'", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Refuses to read and write the same file.
pub fn ensure_distinct(input: &Path, output: Option<&Path>) -> Result<()> {
    if output == Some(input) {
        bail!("input file and output file cannot have the same name: {}", input.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn lexicon(text: &str) -> CorpusReader<Cursor<&str>> {
        CorpusReader::new(Cursor::new(text), "mblem.lex", 3, LinePolicy::Lenient)
    }

    #[test]
    fn lexicon_lines_become_instances() {
        let lex = "gelopen\tlopen\tWW(vd,vrij,zonder)\nlopen\tlopen\tWW(inf)\nlopen\tlopen\tWW(pv,tgw,mv)\n";
        let mut out = Vec::new();
        let stats = make_mblem(lexicon(lex), &ParticleTable::dutch(), None, &mut out).unwrap();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.instances, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with("g e l o p e n WW(vd,vrij,zonder)+Pge"));
        assert!(lines[1].ends_with("l o p e n WW(inf)|WW(pv,tgw,mv)"));
    }

    #[test]
    fn translations_replace_tags() {
        let table = TagTranslations::from_reader(Cursor::new("WW(inf) v1\n"), "trans").unwrap();
        let lex = "lopen\tlopen\tWW(inf)\nlopers\tloper\tN(soort,mv)\n";
        let mut out = Vec::new();
        let stats = make_mblem(lexicon(lex), &ParticleTable::dutch(), Some(&table), &mut out).unwrap();
        assert_eq!(stats.unknown_tags, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(" v1\n"));
        assert!(text.contains(" ?+Ds\n"));
    }

    #[test]
    fn decomposed_entries_match_composed_ones() {
        let mut composed = Vec::new();
        make_mblem(lexicon("geërfd\terven\tWW(vd,vrij,zonder)\n"), &ParticleTable::dutch(), None, &mut composed).unwrap();
        let mut decomposed = Vec::new();
        make_mblem(
            lexicon("gee\u{308}rfd\terven\tWW(vd,vrij,zonder)\n"),
            &ParticleTable::dutch(),
            None,
            &mut decomposed,
        )
        .unwrap();
        assert_eq!(composed, decomposed);
        let text = String::from_utf8(composed).unwrap();
        assert!(text.contains(" g e \u{eb} r f d WW(vd,vrij,zonder)"));
    }

    #[test]
    fn short_lines_are_skipped() {
        let mut out = Vec::new();
        let stats = make_mblem(lexicon("lopen\tlopen\n"), &ParticleTable::dutch(), None, &mut out).unwrap();
        assert_eq!(stats.entries, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn morpheme_windows() {
        let mut out = Vec::new();
        let n = make_mbma(Cursor::new("op 0 0\n"), "mbma.lex", LinePolicy::Strict, &mut out).unwrap();
        assert_eq!(n, 2);
    }

    #[test]
    fn same_input_and_output_refused() {
        let p = Path::new("mblem.lex");
        assert!(ensure_distinct(p, Some(p)).is_err());
        assert!(ensure_distinct(p, Some(Path::new("mblem.data"))).is_ok());
    }
}
