//! Reading tagged corpora: field splitting, line records, sentences and
//! tag validation.

pub mod fields;
pub mod reader;
pub mod tags;

pub use fields::{first_field, split_fields, split_tabs};
pub use reader::{CorpusReader, LinePolicy, Record, Sentence, SentenceReader, UTTERANCE_MARK};
pub use tags::{DEFAULT_MAX_INVALID_TAGS, IobTag, TagCheck};
