//! # Morgen
//!
//! Trains the morphological analyzer's instance base from a morpheme
//! lexicon (`word c1 c2 ... cN`, one class code per letter).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use toad_core::corpus::LinePolicy;
use toad_core::defaults::{Stage, runtime_timbl_opts, section};
use toad_core::engine::InstanceLearner;
use toad_core::{Configuration, GLOBAL, MorphInstanceWriter};
use tracing::info;

use crate::output::OutputDir;

/// Files and counts produced by a morgen run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorgenReport {
    pub data: PathBuf,
    pub tree: PathBuf,
    pub template: PathBuf,
    pub instances: usize,
}

/// The morgen pipeline.
pub struct Morgen<'a> {
    pub config: &'a Configuration,
    pub out: &'a OutputDir,
    pub learner: &'a dyn InstanceLearner,
}

impl Morgen<'_> {
    /// Builds the instances from `lexicon`, trains them and writes the
    /// template. `base` overrides the configured `baseName`.
    pub fn run(&self, lexicon: &Path, base: Option<&str>, policy: LinePolicy) -> Result<MorgenReport> {
        let base = match base {
            Some(base) => base,
            None => self.config.require("baseName", GLOBAL)?,
        };
        let tree_name = self
            .config
            .lookup("treeFile", section::MBMA)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{base}.tree"));
        let data = self.out.path(&format!("{base}.data"));
        let tree = self.out.path(&tree_name);

        let input = File::open(lexicon).with_context(|| format!("opening {}", lexicon.display()))?;
        let output = File::create(&data).with_context(|| format!("creating {}", data.display()))?;
        let mut writer = MorphInstanceWriter::new(BufWriter::new(output));
        writer.push_lexicon(BufReader::new(input), &lexicon.display().to_string(), policy)?;
        let instances = writer.finish()?;
        info!("created morphological datafile: {} ({instances} instances)", data.display());

        let options = self.config.require("timblOpts", section::MBMA)?;
        self.learner.learn(&data, options, &tree)?;

        let template = morgen_template(self.config, self.out, &tree_name)?;
        let template = self.out.write_template(Stage::Morgen, &template)?;
        Ok(MorgenReport {
            data,
            tree,
            template,
            instances,
        })
    }
}

/// The analyzer section of the template: the instance base and the
/// options to read it with.
pub fn morgen_template(config: &Configuration, out: &OutputDir, tree_name: &str) -> Result<Configuration> {
    let mut template = out.stage_template(config, section::MBMA, &[]);
    template.set("treeFile", tree_name, section::MBMA);
    template.set(
        "timblOpts",
        &runtime_timbl_opts(config.require("timblOpts", section::MBMA)?),
        section::MBMA,
    );
    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(PathBuf, String, PathBuf)>>);

    impl InstanceLearner for Recorder {
        fn learn(&self, data: &Path, options: &str, tree: &Path) -> toad_core::Result<()> {
            self.0
                .lock()
                .unwrap()
                .push((data.to_path_buf(), options.to_string(), tree.to_path_buf()));
            Ok(())
        }
    }

    #[test]
    fn trains_windows_and_writes_template() {
        let tmp = tempfile::tempdir().unwrap();
        let lexicon = tmp.path().join("mbma.lex");
        fs::write(&lexicon, "kat N 0 0\nkat N 0 0\nop 0 0\n").unwrap();
        let out = OutputDir::create(Some(&tmp.path().join("out"))).unwrap();
        let config = Configuration::with_defaults(Stage::Morgen);
        let learner = Recorder::default();
        let report = Morgen {
            config: &config,
            out: &out,
            learner: &learner,
        }
        .run(&lexicon, None, LinePolicy::Strict)
        .unwrap();

        assert_eq!(report.instances, 5);
        assert_eq!(report.data, out.path("morgen.data"));
        let calls = learner.0.lock().unwrap();
        assert_eq!(calls[0], (out.path("morgen.data"), "-a1 -w2 +vS".to_string(), out.path("morgen.tree")));

        let template = Configuration::from_file(&report.template).unwrap();
        assert_eq!(template.lookup("treeFile", section::MBMA), Some("morgen.tree"));
        assert_eq!(template.lookup("timblOpts", section::MBMA), Some("-a1 -w2"));
        assert_eq!(template.lookup("baseName", GLOBAL), None);
    }

    #[test]
    fn base_name_flag_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let lexicon = tmp.path().join("mbma.lex");
        fs::write(&lexicon, "op 0 0\n").unwrap();
        let out = OutputDir::create(Some(tmp.path())).unwrap();
        let config = Configuration::with_defaults(Stage::Morgen);
        let report = Morgen {
            config: &config,
            out: &out,
            learner: &Recorder::default(),
        }
        .run(&lexicon, Some("nld"), LinePolicy::Strict)
        .unwrap();
        assert_eq!(report.tree, out.path("nld.tree"));
    }
}
