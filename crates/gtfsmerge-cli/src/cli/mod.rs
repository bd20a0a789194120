//! Clap CLI definition: root struct, flags, and the value types they parse into.
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Duplicate-detection mode accepted by `--duplicate-detection`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DuplicateDetectionArg {
    /// Only raw id collisions trigger renaming (default).
    None,
    /// A source id already present in the target is a duplicate.
    Identity,
    /// Use each entity type's similarity score.
    Fuzzy,
}

impl From<DuplicateDetectionArg> for gtfsmerge_core::DuplicateDetection {
    fn from(value: DuplicateDetectionArg) -> Self {
        match value {
            DuplicateDetectionArg::None => gtfsmerge_core::DuplicateDetection::None,
            DuplicateDetectionArg::Identity => gtfsmerge_core::DuplicateDetection::Identity,
            DuplicateDetectionArg::Fuzzy => gtfsmerge_core::DuplicateDetection::Fuzzy,
        }
    }
}

/// Duplicate-logging mode accepted by `--logging`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DuplicateLoggingArg {
    /// Merge silently (default).
    None,
    /// Emit a log line and continue.
    Warning,
    /// Abort the merge with a descriptive error.
    Error,
}

impl From<DuplicateLoggingArg> for gtfsmerge_core::DuplicateLogging {
    fn from(value: DuplicateLoggingArg) -> Self {
        match value {
            DuplicateLoggingArg::None => gtfsmerge_core::DuplicateLogging::None,
            DuplicateLoggingArg::Warning => gtfsmerge_core::DuplicateLogging::Warning,
            DuplicateLoggingArg::Error => gtfsmerge_core::DuplicateLogging::Error,
        }
    }
}

/// Root CLI struct for the `gtfsmerge` binary.
///
/// `--file=NAME:MODE` scopes a detection override to a single GTFS filename
/// instead of the unscoped `--duplicate-detection` default; it is
/// repeatable so several files can each get their own mode in one
/// invocation. This reads as a single self-contained value per flag
/// occurrence rather than a flag whose meaning depends on another flag's
/// position in argv, which keeps parsing order-independent.
#[derive(Parser, Debug)]
#[command(
    name = "gtfsmerge",
    version,
    about = "Merge two or more GTFS transit feeds into one"
)]
pub struct Cli {
    /// Input feed paths (directories or ZIP archives), followed by one
    /// output path. At least two inputs are required.
    #[arg(value_name = "PATH", num_args = 3.., required = true)]
    pub paths: Vec<PathBuf>,

    /// Duplicate-detection mode applied to every file unless overridden by
    /// `--file`.
    #[arg(long = "duplicate-detection", value_enum, default_value = "none")]
    pub duplicate_detection: DuplicateDetectionArg,

    /// Duplicate-logging mode applied to every file unless overridden by
    /// `--file`.
    #[arg(long, value_enum, default_value = "none")]
    pub logging: DuplicateLoggingArg,

    /// Per-file detection override, as `NAME:MODE` (e.g. `stops.txt:fuzzy`).
    /// Repeatable.
    #[arg(long = "file", value_name = "NAME:MODE")]
    pub file_overrides: Vec<String>,

    /// Raise logging verbosity to debug.
    #[arg(long)]
    pub debug: bool,

    /// Run the auto-detect heuristic (§4.20) instead of the explicit
    /// detection mode.
    #[arg(long)]
    pub auto_detect: bool,

    /// Worker count for the concurrent fuzzy scorer; 0 disables concurrency
    /// and always scans candidates sequentially.
    #[arg(long, default_value = "0")]
    pub jobs: usize,
}

impl Cli {
    /// Splits `paths` into the leading input feeds and the trailing output
    /// path. Clap's `num_args = 3..` already guarantees at least two inputs
    /// plus one output.
    pub fn inputs_and_output(&self) -> (&[PathBuf], &PathBuf) {
        let (output, inputs) = self.paths.split_last().expect("clap guarantees at least 3 paths");
        (inputs, output)
    }

    /// Parses each `--file=NAME:MODE` entry into `(filename, mode)` pairs.
    /// Returns an error string naming the malformed entry on the first bad
    /// one encountered.
    pub fn parsed_file_overrides(&self) -> Result<Vec<(String, DuplicateDetectionArg)>, String> {
        self.file_overrides
            .iter()
            .map(|entry| {
                let (name, mode) = entry
                    .split_once(':')
                    .ok_or_else(|| format!("--file value {entry:?} is not of the form NAME:MODE"))?;
                let mode = <DuplicateDetectionArg as ValueEnum>::from_str(mode, true)
                    .map_err(|_| format!("unknown detection mode {mode:?} in --file {entry:?}"))?;
                Ok((name.to_owned(), mode))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn inputs_and_output_splits_trailing_path() {
        let cli = Cli::try_parse_from(["gtfsmerge", "a", "b", "out"]).expect("parses");
        let (inputs, output) = cli.inputs_and_output();
        assert_eq!(inputs, [PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(output, &PathBuf::from("out"));
    }

    #[test]
    fn fewer_than_three_paths_is_rejected() {
        let result = Cli::try_parse_from(["gtfsmerge", "a", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn file_override_flag_is_repeatable() {
        let cli = Cli::try_parse_from(["gtfsmerge", "--file", "stops.txt:fuzzy", "--file", "routes.txt:identity", "a", "b", "out"])
            .expect("parses");
        assert_eq!(cli.file_overrides, vec!["stops.txt:fuzzy".to_owned(), "routes.txt:identity".to_owned()]);
    }

    #[test]
    fn parsed_file_overrides_splits_name_and_mode() {
        let cli = Cli::try_parse_from(["gtfsmerge", "--file", "stops.txt:fuzzy", "a", "b", "out"]).expect("parses");
        let parsed = cli.parsed_file_overrides().expect("valid overrides");
        assert_eq!(parsed[0].0, "stops.txt");
        assert!(matches!(parsed[0].1, DuplicateDetectionArg::Fuzzy));
    }

    #[test]
    fn malformed_file_override_is_rejected() {
        let cli = Cli::try_parse_from(["gtfsmerge", "--file", "stops.txt", "a", "b", "out"]).expect("parses");
        assert!(cli.parsed_file_overrides().is_err());
    }
}
