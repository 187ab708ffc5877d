//! # Frog-style configuration
//!
//! A section/key/value table read from and written to the `[[section]]` /
//! `key=value` format the pipeline consumes. Keys that appear before the
//! first section header belong to [`GLOBAL`].

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::defaults::Stage;
use crate::error::{Result, ToadError};

/// Name of the implicit top-level section.
pub const GLOBAL: &str = "global";

/// Key holding the directory other relative paths are resolved against.
pub const CONFIG_DIR: &str = "configDir";

/// A section/key/value configuration table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Configuration {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration holding the default table for `stage`.
    pub fn with_defaults(stage: Stage) -> Self {
        let mut config = Self::new();
        for &(section, key, value) in stage.defaults() {
            config.set(key, value, section);
        }
        config
    }

    /// Reads a configuration file.
    ///
    /// When the file does not set `configDir`, it defaults to the directory
    /// holding the file (with a trailing `/`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ToadError::file(path, e))?;
        let mut config = Self::parse(&text)?;
        if config.lookup(CONFIG_DIR, GLOBAL).is_none() {
            let dir = path
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| ".".to_string());
            config.set(CONFIG_DIR, &with_trailing_slash(&dir), GLOBAL);
        }
        debug!(path = %path.display(), sections = config.sections.len(), "configuration read");
        Ok(config)
    }

    /// Parses configuration text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut config = Self::new();
        let mut section = GLOBAL.to_string();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line
                .strip_prefix("[[")
                .and_then(|rest| rest.strip_suffix("]]"))
            {
                section = name.trim().to_string();
                config.sections.entry(section.clone()).or_default();
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    config.set(key.trim(), value.trim(), &section);
                }
                _ => {
                    return Err(ToadError::InvalidConfigLine {
                        line_no: idx + 1,
                        line: raw.to_string(),
                    });
                }
            }
        }
        Ok(config)
    }

    /// Looks up `key` in `section`, trimmed of spaces and double quotes.
    ///
    /// Empty values count as absent.
    pub fn lookup(&self, key: &str, section: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(|v| v.trim_matches(|c: char| c == ' ' || c == '"'))
            .filter(|v| !v.is_empty())
    }

    /// Like [`lookup`](Self::lookup), but a missing value is an error.
    pub fn require(&self, key: &str, section: &str) -> Result<&str> {
        self.lookup(key, section)
            .ok_or_else(|| ToadError::MissingSetting {
                key: key.to_string(),
                module: section.to_string(),
            })
    }

    /// Sets `key` in `section`, creating the section when needed.
    pub fn set(&mut self, key: &str, value: &str, section: &str) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Removes `key` from `section`. Sections left empty are dropped.
    pub fn clear(&mut self, key: &str, section: &str) {
        if let Some(s) = self.sections.get_mut(section) {
            s.remove(key);
            if s.is_empty() {
                self.sections.remove(section);
            }
        }
    }

    /// Overlays `other` on top of `self`; values from `other` win.
    pub fn merge(&mut self, other: &Configuration) {
        for (section, entries) in &other.sections {
            for (key, value) in entries {
                self.set(key, value, section);
            }
        }
    }

    /// The configured `configDir`, if any.
    pub fn config_dir(&self) -> Option<&str> {
        self.lookup(CONFIG_DIR, GLOBAL)
    }

    /// Resolves `name` against `configDir` unless it is absolute.
    pub fn resolve(&self, name: &str) -> String {
        match self.config_dir() {
            Some(dir) if !Path::new(name).is_absolute() => {
                format!("{}{}", with_trailing_slash(dir), name)
            }
            _ => name.to_string(),
        }
    }

    /// Whether `section` holds any keys.
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.get(section).is_some_and(|s| !s.is_empty())
    }

    /// Writes the configuration as a template file.
    pub fn write_template<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string()).map_err(|e| ToadError::file(path, e))
    }
}

impl fmt::Display for Configuration {
    /// `global` comes first, the other sections follow in name order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let global = self.sections.get_key_value(GLOBAL);
        let rest = self.sections.iter().filter(|(name, _)| *name != GLOBAL);
        for (name, entries) in global.into_iter().chain(rest) {
            writeln!(f, "[[{name}]]")?;
            for (key, value) in entries {
                writeln!(f, "{key}={value}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Appends a `/` unless the path already ends in one.
pub fn with_trailing_slash(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}
