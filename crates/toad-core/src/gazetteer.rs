//! # Gazetteers
//!
//! Named-entity name lists used as NER tagger features. An index file maps
//! categories to list files:
//!
//! ```text
//! # category  list
//! loc         locations.lst
//! per         persons.lst
//! ```
//!
//! List files hold one (possibly multi-word) name per line. Matching is
//! exact and case sensitive.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use crate::corpus::fields::split_fields;
use crate::error::{Result, ToadError};

/// Longest name, in tokens, a gazetteer accepts.
pub const MAX_NAME_TOKENS: usize = 10;

/// Tag for words not covered by any name.
pub const OUTSIDE: &str = "O";

/// Name lists per category, indexed by name length.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    // by_len[n - 1]: names of n tokens → categories
    by_len: Vec<HashMap<String, BTreeSet<String>>>,
    names: usize,
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::new()
    }
}

impl Gazetteer {
    pub fn new() -> Self {
        Self {
            by_len: vec![HashMap::new(); MAX_NAME_TOKENS],
            names: 0,
        }
    }

    /// Reads an index file and every list it names.
    ///
    /// List paths are relative to the directory holding the index.
    pub fn from_index<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ToadError::file(path, e))?;
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut gazetteer = Self::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let fields = split_fields(trimmed);
            let [category, list] = fields.as_slice() else {
                return Err(ToadError::InvalidGazetteer {
                    path: path.to_path_buf(),
                    reason: format!("expected 'category file', got '{line}'"),
                });
            };
            let list_path = dir.join(list);
            let list_file = File::open(&list_path).map_err(|e| ToadError::file(&list_path, e))?;
            let added = gazetteer.add_list(
                category,
                BufReader::new(list_file),
                &list_path.display().to_string(),
            )?;
            info!("read {added} {category} names from {}", list_path.display());
        }
        if gazetteer.is_empty() {
            return Err(ToadError::InvalidGazetteer {
                path: path.to_path_buf(),
                reason: "no names found".to_string(),
            });
        }
        Ok(gazetteer)
    }

    /// Adds one name. Returns `false` for empty or over-long names.
    pub fn add(&mut self, category: &str, name: &str) -> bool {
        let tokens = split_fields(name);
        if tokens.is_empty() || tokens.len() > MAX_NAME_TOKENS {
            return false;
        }
        let inserted = self.by_len[tokens.len() - 1]
            .entry(tokens.join(" "))
            .or_default()
            .insert(category.to_string());
        if inserted {
            self.names += 1;
        }
        true
    }

    /// Adds every name of a list under `category`. Returns the count added.
    pub fn add_list<R: BufRead>(&mut self, category: &str, reader: R, source_name: &str) -> Result<usize> {
        let mut added = 0;
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if self.add(category, &line) {
                added += 1;
            } else {
                warn!(
                    source = source_name,
                    line_no = idx + 1,
                    "name '{line}' is longer than {MAX_NAME_TOKENS} tokens, skipped"
                );
            }
        }
        Ok(added)
    }

    /// Number of (name, category) pairs.
    pub fn len(&self) -> usize {
        self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names == 0
    }

    /// Categories of the exact name `words`, if known.
    pub fn lookup<S: AsRef<str>>(&self, words: &[S]) -> Option<&BTreeSet<String>> {
        if words.is_empty() || words.len() > MAX_NAME_TOKENS {
            return None;
        }
        let key = words.iter().map(|w| w.as_ref()).collect::<Vec<_>>().join(" ");
        self.by_len[words.len() - 1].get(&key)
    }

    /// Gazetteer tag per word.
    ///
    /// From every start position the longest known name is taken; each word
    /// it covers gets the name's categories. Words covered by several
    /// categories get them joined with `+` in sorted order, uncovered words
    /// get [`OUTSIDE`].
    pub fn tag<S: AsRef<str>>(&self, words: &[S]) -> Vec<String> {
        let mut found: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); words.len()];
        for start in 0..words.len() {
            let longest = MAX_NAME_TOKENS.min(words.len() - start);
            for len in (1..=longest).rev() {
                if let Some(categories) = self.lookup(&words[start..start + len]) {
                    for slot in &mut found[start..start + len] {
                        slot.extend(categories.iter().map(String::as_str));
                    }
                    break;
                }
            }
        }
        found
            .into_iter()
            .map(|cats| {
                if cats.is_empty() {
                    OUTSIDE.to_string()
                } else {
                    cats.into_iter().collect::<Vec<_>>().join("+")
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    fn sample() -> Gazetteer {
        let mut g = Gazetteer::new();
        g.add("loc", "Gent");
        g.add("loc", "Den Haag");
        g.add("org", "Den Haag Centraal");
        g.add("per", "Gent");
        g
    }

    #[test]
    fn longest_match_wins() {
        let tags = sample().tag(&["via", "Den", "Haag", "Centraal", "naar", "Gent"]);
        assert_eq!(tags, vec!["O", "org", "org", "org", "O", "loc+per"]);
    }

    #[test]
    fn case_sensitive() {
        assert_eq!(sample().tag(&["gent"]), vec!["O"]);
    }

    #[test]
    fn overlong_names_are_skipped() {
        let mut g = Gazetteer::new();
        let list = "a b c d e f g h i j k\nDe Pinte\n";
        let n = g.add_list("loc", Cursor::new(list), "test").unwrap();
        assert_eq!(n, 1);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn reads_index_relative_to_its_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("loc.lst"), "Gent\nDen Haag\n").unwrap();
        fs::write(dir.path().join("per.lst"), "Jan Janssen\n").unwrap();
        let index = dir.path().join("gazetteer.idx");
        fs::write(&index, "# index\nloc loc.lst\n\nper per.lst\n").unwrap();
        let g = Gazetteer::from_index(&index).unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.tag(&["Jan", "Janssen"]), vec!["per", "per"]);
    }

    #[test]
    fn bad_index_line() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("gazetteer.idx");
        fs::write(&index, "loc\n").unwrap();
        let err = Gazetteer::from_index(&index).unwrap_err();
        assert!(matches!(err, ToadError::InvalidGazetteer { .. }));
    }
}
