//! Tagger generator invocations.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::config::Configuration;
use crate::error::Result;

/// Layout of the tagger training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// `word<TAB>tag` (`-T`).
    Plain,
    /// Enriched columns between word and tag (`-E`).
    Enriched,
}

impl DataFormat {
    fn flag(self) -> &'static str {
        match self {
            DataFormat::Plain => "-T",
            DataFormat::Enriched => "-E",
        }
    }
}

/// One run of the tagger generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggerCommand {
    pub format: DataFormat,
    pub data: PathBuf,
    /// Settings file the generator writes.
    pub settings: PathBuf,
    /// Feature pattern for known words (`-p`).
    pub known_pattern: String,
    /// Feature pattern for unknown words (`-P`).
    pub unknown_pattern: String,
    /// Learner options (`-O`).
    pub timbl_opts: String,
    /// Frequency threshold for the lexicon (`-M`).
    pub max_ambiguity: String,
    /// Unknown-word cutoff (`-n`).
    pub n: Option<String>,
    /// Percentage of data used for unknown words (`-%`).
    pub percentage: Option<String>,
    /// Sentences end in an empty line instead of `<utt>` (`-eEL`).
    pub empty_line_eos: bool,
    /// Keep the extra columns in the settings (`-X`).
    pub keep_x: bool,
}

impl TaggerCommand {
    /// Reads `p`, `P`, `timblOpts` and `M` (required) plus `n` and `%`
    /// (optional) from `section`.
    pub fn from_config(
        config: &Configuration,
        section: &str,
        format: DataFormat,
        data: impl Into<PathBuf>,
        settings: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            format,
            data: data.into(),
            settings: settings.into(),
            known_pattern: config.require("p", section)?.to_string(),
            unknown_pattern: config.require("P", section)?.to_string(),
            timbl_opts: config.require("timblOpts", section)?.to_string(),
            max_ambiguity: config.require("M", section)?.to_string(),
            n: config.lookup("n", section).map(str::to_string),
            percentage: config.lookup("%", section).map(str::to_string),
            empty_line_eos: false,
            keep_x: false,
        })
    }

    /// Argument vector for the generator program.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.format.flag().into(),
            self.data.clone().into(),
            "-s".into(),
            self.settings.clone().into(),
            "-p".into(),
            self.known_pattern.clone().into(),
            "-P".into(),
            self.unknown_pattern.clone().into(),
            format!("-O{}", self.timbl_opts).into(),
            "-M".into(),
            self.max_ambiguity.clone().into(),
        ];
        if let Some(n) = &self.n {
            args.push("-n".into());
            args.push(n.into());
        }
        if let Some(pct) = &self.percentage {
            args.push("-%".into());
            args.push(pct.into());
        }
        if self.empty_line_eos {
            args.push("-eEL".into());
        }
        if self.keep_x {
            args.push("-X".into());
        }
        args.push("-DLogSilent".into());
        args
    }
}

impl fmt::Display for TaggerCommand {
    /// Shell-like rendering, for logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -s {} -p {} -P {} -O\"{}\" -M {}",
            self.format.flag(),
            self.data.display(),
            self.settings.display(),
            self.known_pattern,
            self.unknown_pattern,
            self.timbl_opts,
            self.max_ambiguity
        )?;
        if let Some(n) = &self.n {
            write!(f, " -n {n}")?;
        }
        if let Some(pct) = &self.percentage {
            write!(f, " -% {pct}")?;
        }
        if self.empty_line_eos {
            write!(f, " -eEL")?;
        }
        if self.keep_x {
            write!(f, " -X")?;
        }
        write!(f, " -DLogSilent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{Stage, section};
    use crate::error::ToadError;

    #[test]
    fn chunker_command_from_defaults() {
        let config = Configuration::with_defaults(Stage::Chunkgen);
        let mut cmd = TaggerCommand::from_config(
            &config,
            section::IOB,
            DataFormat::Enriched,
            "out/chunkgen.data",
            "out/chunkgen.data.settings",
        )
        .unwrap();
        cmd.empty_line_eos = true;
        let args: Vec<String> = cmd
            .args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-E",
                "out/chunkgen.data",
                "-s",
                "out/chunkgen.data.settings",
                "-p",
                "dddwfWawa",
                "-P",
                "chnppddwFawasss",
                "-O+vS -FColumns K: -a4 -mM -k5 -dID U: -a0 -mM -k19 -dID",
                "-M",
                "200",
                "-n",
                "10",
                "-%",
                "5",
                "-eEL",
                "-DLogSilent",
            ]
        );
        assert!(cmd.to_string().starts_with("-E out/chunkgen.data -s"));
    }

    #[test]
    fn missing_pattern_is_reported() {
        let config = Configuration::parse("[[NER]]\nP=x\ntimblOpts=y\nM=1\n").unwrap();
        let err = TaggerCommand::from_config(
            &config,
            section::NER,
            DataFormat::Enriched,
            "d",
            "s",
        )
        .unwrap_err();
        assert!(matches!(err, ToadError::MissingSetting { ref key, .. } if key == "p"));
    }
}
