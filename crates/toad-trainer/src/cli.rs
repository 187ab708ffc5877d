//! Pieces shared by the trainer binaries.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use toad_core::corpus::{DEFAULT_MAX_INVALID_TAGS, LinePolicy};
use toad_core::{Configuration, Stage};
use tracing::info;

/// `-c`, `-O` and `--lenient`, common to the pipeline binaries.
#[derive(Debug, Clone, Args)]
pub struct PipelineArgs {
    /// Configuration file, merged on top of the built-in defaults
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Directory receiving the generated files
    #[arg(short = 'O', long = "outdir")]
    pub outdir: Option<PathBuf>,

    /// Skip malformed input lines instead of aborting
    #[arg(long)]
    pub lenient: bool,

    /// Abort after this many invalid tags
    #[arg(long, default_value_t = DEFAULT_MAX_INVALID_TAGS)]
    pub max_invalid_tags: usize,
}

impl PipelineArgs {
    pub fn line_policy(&self) -> LinePolicy {
        if self.lenient {
            LinePolicy::Lenient
        } else {
            LinePolicy::Strict
        }
    }
}

/// The defaults of `stage`, with the user file (if any) merged on top.
pub fn load_config(stage: Stage, path: Option<&Path>) -> Result<Configuration> {
    let mut config = Configuration::with_defaults(stage);
    if let Some(path) = path {
        let user = Configuration::from_file(path)
            .with_context(|| format!("invalid configuration: {}", path.display()))?;
        config.merge(&user);
        info!("using configuration: {}", path.display());
    }
    Ok(config)
}

/// Installs the log subscriber. Logs go to stderr so stdout stays free for
/// generated data.
pub fn init_logging() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
}
