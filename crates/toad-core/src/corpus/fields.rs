//! # Field splitting
//!
//! Splits corpus and lexicon lines into their columns. Any run of
//! separator characters counts as one break, so `word\tlemma  TAG` has
//! three fields.

/// Separator characters between columns.
const SEPARATORS: &[char] = &[' ', '\t', '\r', '\n'];

/// Splits a line into non-empty fields.
///
/// # Examples
/// ```
/// use toad_core::corpus::fields::split_fields;
///
/// assert_eq!(split_fields("lopen\tlopen\tWW(inf)"), vec!["lopen", "lopen", "WW(inf)"]);
/// assert!(split_fields("  \t ").is_empty());
/// ```
pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(SEPARATORS).filter(|f| !f.is_empty()).collect()
}

/// Splits a line on tabs only, keeping empty columns.
///
/// Used for formats where a column may legitimately be blank.
pub fn split_tabs(line: &str) -> Vec<&str> {
    if line.is_empty() {
        return Vec::new();
    }
    line.split('\t').collect()
}

/// First field of a line, if there is one.
pub fn first_field(line: &str) -> Option<&str> {
    line.split(SEPARATORS).find(|f| !f.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_mixed_separators() {
        assert_eq!(
            split_fields("gelopen \t lopen\tWW(vd,vrij,zonder)\r"),
            vec!["gelopen", "lopen", "WW(vd,vrij,zonder)"]
        );
    }

    #[test]
    fn split_empty() {
        assert!(split_fields("").is_empty());
    }

    #[test]
    fn tabs_keep_empty_columns() {
        assert_eq!(split_tabs("Jan\t\tB-per"), vec!["Jan", "", "B-per"]);
        assert!(split_tabs("").is_empty());
    }

    #[test]
    fn first_field_skips_leading_space() {
        assert_eq!(first_field("  huis 12"), Some("huis"));
        assert_eq!(first_field(" \t"), None);
    }
}
