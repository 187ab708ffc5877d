//! # Toad Core
//!
//! Building blocks for training and checking the models of a Frog-style
//! Dutch NLP pipeline: configuration tables, corpus readers, lexicons,
//! lemmatizer edit scripts, morpheme windows, tagger context features,
//! gazetteers and the engines the trainers drive.
//!
//! ## Quick Start
//!
//! ```rust
//! use toad_core::lemma::{EditScript, ParticleTable};
//!
//! let particles = ParticleTable::parse("[WW(vd/be] [WW(vd/ge]").unwrap();
//! let script = EditScript::compute("gelopen", "lopen", "WW(vd,vrij,zonder)", &particles);
//!
//! assert_eq!(script.label("WW(vd,vrij,zonder)"), "WW(vd,vrij,zonder)+Pge");
//! assert_eq!(script.apply("gelopen"), "lopen");
//! ```
pub mod config;
pub mod corpus;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod features;
pub mod gazetteer;
pub mod lemma;
pub mod lexicon;
pub mod morph;

// Re-export primary API
pub use config::{CONFIG_DIR, Configuration, GLOBAL};
pub use defaults::{DEFAULTS_VERSION, Stage};
pub use error::{Result, ToadError};
pub use gazetteer::Gazetteer;
pub use lemma::{ClassLabel, EditScript, LemmaInstanceWriter, ParticleTable};
pub use lexicon::{LemmaIndex, Lexicon};
pub use morph::{MorphEntry, MorphInstanceWriter};
