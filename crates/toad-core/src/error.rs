use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reshaping corpora or driving the external engines.
#[derive(Debug, Error)]
pub enum ToadError {
    /// A corpus or lexicon line did not have the expected shape.
    #[error("wrong input line {line_no} in {source_name} (expected {expected}): '{line}'")]
    MalformedLine {
        /// Name of the file (or stream) the line came from.
        source_name: String,
        /// 1-based line number.
        line_no: usize,
        /// The offending line.
        line: String,
        /// What the line should have looked like.
        expected: String,
    },

    /// Too many tags were rejected by the tag check.
    #[error("found {count} invalid tags, more than the allowed {limit}")]
    TooManyInvalidTags {
        /// Number of rejected tags seen so far.
        count: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A required configuration value is missing or empty.
    #[error("missing key: '{key}' for module: '{module}'")]
    MissingSetting {
        /// The key that was looked up.
        key: String,
        /// The configuration section.
        module: String,
    },

    /// A configuration file line could not be understood.
    #[error("invalid configuration line {line_no}: '{line}'")]
    InvalidConfigLine { line_no: usize, line: String },

    /// A particle table could not be parsed.
    #[error("error parsing particles line: {line} at: {part}")]
    InvalidParticles { line: String, part: String },

    /// A morpheme lexicon entry has a class count that does not match its letters.
    #[error("{word}: {letters} letters, but got {classes} morphemes")]
    MorphemeCount {
        word: String,
        letters: usize,
        classes: usize,
    },

    /// A gazetteer index or list could not be used.
    #[error("invalid gazetteer {path:?}: {reason}")]
    InvalidGazetteer { path: PathBuf, reason: String },

    /// An external program could not be started.
    #[error("unable to start {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// An external program ran but reported failure.
    #[error("{tool} failed with status {status:?}: {stderr}")]
    ToolFailed {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    /// An external program produced output we could not interpret.
    #[error("unexpected output from {tool}: {message}")]
    ToolOutput { tool: String, message: String },

    /// A file could not be opened or created.
    #[error("unable to access {path:?}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    Regex(#[from] regex::Error),

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToadError {
    /// Wraps an I/O error with the path it happened on.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for toad operations.
pub type Result<T> = std::result::Result<T, ToadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ToadError::MissingSetting {
            key: "timblOpts".into(),
            module: "IOB".into(),
        };
        assert_eq!(err.to_string(), "missing key: 'timblOpts' for module: 'IOB'");

        let err = ToadError::MalformedLine {
            source_name: "corpus.txt".into(),
            line_no: 3,
            line: "lopen\tWW(inf)".into(),
            expected: "3 fields".into(),
        };
        assert!(err.to_string().contains("lopen\tWW(inf)"));
        assert!(err.to_string().contains("corpus.txt"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ToadError>();
    }
}
