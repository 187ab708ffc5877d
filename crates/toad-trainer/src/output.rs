//! Output directory handling and configuration templates.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use toad_core::config::{CONFIG_DIR, Configuration, GLOBAL, with_trailing_slash};
use toad_core::defaults::{DEFAULTS_VERSION, Stage};
use tracing::info;

/// Where a pipeline writes its files. Without a directory, files go to the
/// current directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDir {
    dir: Option<PathBuf>,
}

impl OutputDir {
    /// Uses `dir`, creating it when needed.
    pub fn create(dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("output dir not usable: {}", dir.display()))?;
        }
        Ok(Self {
            dir: dir.map(Path::to_path_buf),
        })
    }

    /// Path of `name` inside the output directory.
    pub fn path(&self, name: &str) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    /// The directory as a `configDir` value, with a trailing `/`.
    pub fn config_dir(&self) -> Option<String> {
        self.dir
            .as_ref()
            .map(|d| with_trailing_slash(&d.to_string_lossy()))
    }

    /// Points `configDir` of a template at this directory (or drops it).
    pub fn apply_to(&self, template: &mut Configuration) {
        template.clear(CONFIG_DIR, GLOBAL);
        if let Some(dir) = self.config_dir() {
            template.set(CONFIG_DIR, &dir, GLOBAL);
        }
    }

    /// Turns the training configuration into a template for `section`.
    ///
    /// `training_keys` are dropped from the section, as is the global
    /// `baseName`; `configDir` points at this directory.
    pub fn stage_template(&self, config: &Configuration, section: &str, training_keys: &[&str]) -> Configuration {
        let mut template = config.clone();
        for key in training_keys {
            template.clear(key, section);
        }
        template.clear("baseName", GLOBAL);
        self.apply_to(&mut template);
        template.set("version", DEFAULTS_VERSION, section);
        template
    }

    /// Writes the template for `stage` and returns its path.
    pub fn write_template(&self, stage: Stage, template: &Configuration) -> Result<PathBuf> {
        let path = self.path(stage.template_name());
        template
            .write_template(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("stored a frog configfile template: {}", path.display());
        Ok(path)
    }
}

/// Tagger generator settings that have no meaning at runtime.
pub const TAGGER_TRAINING_KEYS: &[&str] = &["p", "P", "timblOpts", "M", "n", "%"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_without_dir_are_relative() {
        let out = OutputDir::default();
        assert_eq!(out.path("froggen.data"), PathBuf::from("froggen.data"));
        assert_eq!(out.config_dir(), None);
    }

    #[test]
    fn creates_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b");
        let out = OutputDir::create(Some(&dir)).unwrap();
        assert!(dir.is_dir());
        assert_eq!(out.path("x.tree"), dir.join("x.tree"));
        assert!(out.config_dir().unwrap().ends_with("a/b/"));
    }

    #[test]
    fn stage_template_drops_training_keys() {
        let mut config = Configuration::new();
        config.set("baseName", "chunkgen", GLOBAL);
        config.set("p", "dddwfWawa", "IOB");
        config.set("set", "chunks", "IOB");
        let tmp = tempfile::tempdir().unwrap();
        let out = OutputDir::create(Some(tmp.path())).unwrap();
        let template = out.stage_template(&config, "IOB", TAGGER_TRAINING_KEYS);
        assert_eq!(template.lookup("p", "IOB"), None);
        assert_eq!(template.lookup("set", "IOB"), Some("chunks"));
        assert_eq!(template.lookup("version", "IOB"), Some(DEFAULTS_VERSION));
        assert_eq!(template.lookup("baseName", GLOBAL), None);
        assert_eq!(template.config_dir(), out.config_dir().as_deref());
    }

    #[test]
    fn template_config_dir_follows_output() {
        let mut template = Configuration::new();
        template.set(CONFIG_DIR, "/etc/frog/nld/", GLOBAL);
        OutputDir::default().apply_to(&mut template);
        assert_eq!(template.config_dir(), None);
    }
}
