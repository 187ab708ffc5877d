//! # Toad Trainer
//!
//! Pipelines that turn tagged corpora and lexicons into trained models for
//! a Frog-style NLP pipeline, plus the small standalone data generators.
//!
//! Every pipeline follows the same shape: merge the stage defaults with the
//! user configuration, reshape the input into an instance file, hand that
//! to an external engine, and write a configuration template pointing at
//! the results.

pub mod cli;
pub mod froggen;
pub mod generate;
pub mod morgen;
pub mod output;
pub mod taggen;

pub use output::OutputDir;
