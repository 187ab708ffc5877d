//! # Lemmatizer edit scripts
//!
//! Encodes word → lemma pairs as class labels for a memory-based
//! lemmatizer, and decodes predicted labels back into lemmas.

pub mod edit;
pub mod instances;
pub mod particles;

pub use edit::{ClassLabel, EditScript, MIN_PARTICLE_OVERLAP, common_prefix_len};
pub use instances::{HISTORY, LemmaInstanceWriter, TagTranslations, UNKNOWN_TAG, suffix_context};
pub use particles::ParticleTable;
