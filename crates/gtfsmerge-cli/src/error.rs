//! CLI error type with associated exit codes.
//!
//! [`CliError`] is the top-level error type for the `gtfsmerge` binary.
//! Every variant maps to the single non-zero exit code the CLI surface
//! (§6 of the merge design) allows: `0` on success, `1` on any error —
//! unlike the core library's richer [`gtfsmerge_core::MergeError`], there
//! is no separate "input failure" exit code at the CLI boundary.
use std::path::PathBuf;

use thiserror::Error;

/// All error conditions the `gtfsmerge` CLI can produce.
#[derive(Debug, Error)]
pub enum CliError {
    /// A malformed `--file=NAME:MODE` value.
    #[error("{detail}")]
    InvalidFileOverride { detail: String },

    /// Reading or writing a feed failed.
    #[error("{path}: {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: gtfsmerge_core::IoError,
    },

    /// The merge engine itself failed.
    #[error(transparent)]
    Merge(#[from] gtfsmerge_core::MergeError),
}

impl CliError {
    /// Exit code for this error. Every variant maps to `1`; the method
    /// exists so `main` never hardcodes the number at more than one site.
    pub fn exit_code(&self) -> i32 {
        1
    }

    pub fn message(&self) -> String {
        format!("error: {self}")
    }
}
