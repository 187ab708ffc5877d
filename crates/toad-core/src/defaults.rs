//! Default settings per pipeline stage (Dutch models).
//!
//! Each stage owns one table. A user configuration is merged on top of it,
//! so anything set in the user file wins.

use crate::config::{CONFIG_DIR, GLOBAL};

/// Bumped whenever a default value changes.
pub const DEFAULTS_VERSION: &str = "2.0";

/// Section names used by the pipeline configuration.
pub mod section {
    pub const TAGGER: &str = "tagger";
    pub const MBLEM: &str = "mblem";
    pub const MBMA: &str = "mbma";
    pub const NER: &str = "NER";
    pub const IOB: &str = "IOB";
    pub const TOKENIZER: &str = "tokenizer";
}

pub const FOLIA_POS_SET: &str = "http://ilk.uvt.nl/folia/sets/frog-mbpos-cgn";
pub const FOLIA_MBLEM_SET: &str = "http://ilk.uvt.nl/folia/sets/frog-mblem-nl";
pub const FOLIA_MBMA_SET: &str = "http://ilk.uvt.nl/folia/sets/frog-mbma-nl";
pub const FOLIA_NER_SET: &str = "http://ilk.uvt.nl/folia/sets/frog-ner";
pub const FOLIA_CHUNKER_SET: &str = "http://ilk.uvt.nl/folia/sets/frog-chunker-nl";

/// Where an installed frog keeps its Dutch models.
pub const FROG_CONFIG_DIR: &str = "/usr/local/etc/frog/nld/";

/// Particle table used when the configuration does not provide one.
pub const DUTCH_PARTICLES: &str = "[WW(vd/be] [WW(vd/ge]";

/// Timbl options frog uses at runtime for the lemmatizer.
pub const MBLEM_RUNTIME_TIMBL_OPTS: &str = "-a1 -w2";

type Entry = (&'static str, &'static str, &'static str);

const FROGGEN: &[Entry] = &[
    (section::TAGGER, "baseName", "froggen"),
    (section::TAGGER, "p", "dddwfWawa"),
    (section::TAGGER, "P", "chnppdddwFawasss"),
    (
        section::TAGGER,
        "timblOpts",
        "+vS -G0 +D K: -w1 -a1 U: -a0 -w1 -mM -k9 -dIL",
    ),
    (section::TAGGER, "M", "500"),
    (section::TAGGER, "set", FOLIA_POS_SET),
    (section::MBLEM, "treeFile", "froggen.tree"),
    (section::MBLEM, "timblOpts", "-a1 -w2 +vS"),
    (section::MBLEM, "particles", DUTCH_PARTICLES),
    (section::MBLEM, "set", FOLIA_MBLEM_SET),
];

const MORGEN: &[Entry] = &[
    (GLOBAL, "baseName", "morgen"),
    (section::MBMA, "timblOpts", "-a1 -w2 +vS"),
    (section::MBMA, "set", FOLIA_MBMA_SET),
];

const NERGEN: &[Entry] = &[
    (GLOBAL, "baseName", "nergen"),
    (GLOBAL, CONFIG_DIR, FROG_CONFIG_DIR),
    (section::TAGGER, "settings", "Frog.mbt.1.0.settings"),
    (section::NER, "p", "ddwdwfWawawaa"),
    (section::NER, "P", "chnppddwdwFawawaasss"),
    (
        section::NER,
        "timblOpts",
        "+vS -G -FColumns K: -a1 U: -a2 -q2 -mM -k19 -dID",
    ),
    (section::NER, "n", "10"),
    (section::NER, "M", "1000"),
    (section::NER, "set", FOLIA_NER_SET),
];

const CHUNKGEN: &[Entry] = &[
    (GLOBAL, "baseName", "chunkgen"),
    (GLOBAL, CONFIG_DIR, FROG_CONFIG_DIR),
    (section::TAGGER, "settings", "Frog.mbt.1.0.settings"),
    (section::IOB, "p", "dddwfWawa"),
    (section::IOB, "P", "chnppddwFawasss"),
    (
        section::IOB,
        "timblOpts",
        "+vS -FColumns K: -a4 -mM -k5 -dID U: -a0 -mM -k19 -dID",
    ),
    (section::IOB, "n", "10"),
    (section::IOB, "M", "200"),
    (section::IOB, "%", "5"),
    (section::IOB, "set", FOLIA_CHUNKER_SET),
];

/// A pipeline stage with its own default table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// POS tagger + lemmatizer.
    Froggen,
    /// Morphological analyzer instance base.
    Morgen,
    /// Named-entity tagger.
    Nergen,
    /// IOB chunker.
    Chunkgen,
}

impl Stage {
    /// `(section, key, value)` defaults for this stage.
    pub fn defaults(&self) -> &'static [(&'static str, &'static str, &'static str)] {
        match self {
            Stage::Froggen => FROGGEN,
            Stage::Morgen => MORGEN,
            Stage::Nergen => NERGEN,
            Stage::Chunkgen => CHUNKGEN,
        }
    }

    /// Name of the configuration template this stage writes.
    pub fn template_name(&self) -> &'static str {
        match self {
            Stage::Froggen | Stage::Morgen => "frog.cfg.template",
            Stage::Nergen => "frog-ner.cfg.template",
            Stage::Chunkgen => "frog-chunker.cfg.template",
        }
    }
}

/// Drops verbosity switches (`+v...`, `-v...`) from a Timbl option string.
///
/// Training runs report statistics; the runtime configuration should not.
pub fn runtime_timbl_opts(opts: &str) -> String {
    opts.split_whitespace()
        .filter(|o| !(o.starts_with("+v") || o.starts_with("-v")))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stage_names_a_template() {
        for stage in [Stage::Froggen, Stage::Morgen, Stage::Nergen, Stage::Chunkgen] {
            assert!(stage.template_name().ends_with(".cfg.template"));
            assert!(!stage.defaults().is_empty());
        }
    }

    #[test]
    fn chunker_defaults_cover_generator_keys() {
        let keys: Vec<_> = Stage::Chunkgen
            .defaults()
            .iter()
            .filter(|(s, _, _)| *s == section::IOB)
            .map(|(_, k, _)| *k)
            .collect();
        for key in ["p", "P", "timblOpts", "n", "M", "%", "set"] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }

    #[test]
    fn runtime_opts_strip_verbosity() {
        assert_eq!(runtime_timbl_opts("-a1 -w2 +vS"), MBLEM_RUNTIME_TIMBL_OPTS);
        assert_eq!(runtime_timbl_opts("+vS -G0 +D"), "-G0 +D");
    }
}
