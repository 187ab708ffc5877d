//! # Tag validation
//!
//! IOB labels for the chunker and NER corpora, and the tag check that
//! rejects labels outside a whitelist, aborting once too many were seen.
//! In IOB corpora an `I-X` that does not continue an `X` span counts
//! against the same limit.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use tracing::warn;

use crate::corpus::fields::first_field;
use crate::error::{Result, ToadError};

/// Number of rejected tags tolerated before giving up.
pub const DEFAULT_MAX_INVALID_TAGS: usize = 10;

/// An Inside-Outside-Begin label such as `B-NP`, `I-per` or `O`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IobTag {
    Begin(String),
    Inside(String),
    Outside,
}

/// The string was not an IOB label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIobTag(pub String);

impl fmt::Display for InvalidIobTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not an IOB tag: '{}'", self.0)
    }
}

impl std::error::Error for InvalidIobTag {}

impl FromStr for IobTag {
    type Err = InvalidIobTag;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == "O" {
            return Ok(IobTag::Outside);
        }
        let invalid = || InvalidIobTag(s.to_string());
        let (prefix, kind) = s.split_once('-').ok_or_else(invalid)?;
        if kind.is_empty() {
            return Err(invalid());
        }
        match prefix {
            "B" => Ok(IobTag::Begin(kind.to_string())),
            "I" => Ok(IobTag::Inside(kind.to_string())),
            _ => Err(invalid()),
        }
    }
}

impl IobTag {
    /// The chunk or entity type, `None` for `O`.
    pub fn entity_type(&self) -> Option<&str> {
        match self {
            IobTag::Begin(t) | IobTag::Inside(t) => Some(t),
            IobTag::Outside => None,
        }
    }

    /// Check if `to` may follow `from`.
    ///
    /// An `I-X` must continue a `B-X` or `I-X`; everything else is free.
    pub fn is_valid_transition(from: &IobTag, to: &IobTag) -> bool {
        match to {
            IobTag::Inside(kind) => from.entity_type() == Some(kind.as_str()),
            _ => true,
        }
    }
}

impl fmt::Display for IobTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IobTag::Begin(t) => write!(f, "B-{t}"),
            IobTag::Inside(t) => write!(f, "I-{t}"),
            IobTag::Outside => write!(f, "O"),
        }
    }
}

/// What a [`TagCheck`] accepts.
#[derive(Debug, Clone)]
enum Accepts {
    Anything,
    Whitelist(HashSet<String>),
    Iob,
}

/// Counts rejected tags and fails once more than `limit` were seen.
#[derive(Debug, Clone)]
pub struct TagCheck {
    accepts: Accepts,
    limit: usize,
    rejected: usize,
}

impl TagCheck {
    /// Accepts every tag.
    pub fn permissive() -> Self {
        Self {
            accepts: Accepts::Anything,
            limit: DEFAULT_MAX_INVALID_TAGS,
            rejected: 0,
        }
    }

    /// Accepts only the given tags.
    pub fn whitelist<I, S>(tags: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepts: Accepts::Whitelist(tags.into_iter().map(Into::into).collect()),
            limit,
            rejected: 0,
        }
    }

    /// Reads a whitelist, one tag (first field) per line.
    pub fn whitelist_from_file<P: AsRef<Path>>(path: P, limit: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ToadError::file(path, e))?;
        let mut tags = HashSet::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if let Some(tag) = first_field(&line) {
                tags.insert(tag.to_string());
            }
        }
        Ok(Self::whitelist(tags, limit))
    }

    /// Accepts syntactically valid IOB labels.
    pub fn iob(limit: usize) -> Self {
        Self {
            accepts: Accepts::Iob,
            limit,
            rejected: 0,
        }
    }

    /// Checks one tag. Returns `Ok(false)` when the line should be skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ToadError::TooManyInvalidTags`] once the number of rejected
    /// tags exceeds the limit.
    pub fn accept(&mut self, tag: &str, source_name: &str, line_no: usize, line: &str) -> Result<bool> {
        let ok = match &self.accepts {
            Accepts::Anything => true,
            Accepts::Whitelist(tags) => tags.contains(tag),
            Accepts::Iob => tag.parse::<IobTag>().is_ok(),
        };
        if ok {
            return Ok(true);
        }
        warn!(source = source_name, line_no, tag, "invalid tag in line '{line}'");
        self.count_rejected()?;
        Ok(false)
    }

    /// Checks that an accepted IOB label may follow the previous label of
    /// its sentence (`None` at the start). Only IOB checks look at
    /// transitions. A bad transition is counted but the word is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ToadError::TooManyInvalidTags`] once the number of rejected
    /// tags exceeds the limit.
    pub fn check_transition(
        &mut self,
        prev: Option<&str>,
        tag: &str,
        source_name: &str,
        line_no: usize,
        line: &str,
    ) -> Result<()> {
        if !matches!(self.accepts, Accepts::Iob) {
            return Ok(());
        }
        let Ok(to) = tag.parse::<IobTag>() else {
            return Ok(());
        };
        let from = prev.and_then(|p| p.parse::<IobTag>().ok()).unwrap_or(IobTag::Outside);
        if IobTag::is_valid_transition(&from, &to) {
            return Ok(());
        }
        warn!(
            source = source_name,
            line_no,
            tag,
            "'{tag}' does not continue '{from}' in line '{line}'"
        );
        self.count_rejected()
    }

    fn count_rejected(&mut self) -> Result<()> {
        self.rejected += 1;
        if self.rejected > self.limit {
            return Err(ToadError::TooManyInvalidTags {
                count: self.rejected,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Number of tags rejected so far.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
