//! Reading and writing GTFS feeds as directories or zip archives.
//!
//! This layer is deliberately kept separate from the merge engine: nothing
//! here knows about prefixes, policies, or fuzzy scoring, and nothing in
//! `crate::merge`/`crate::strategies` touches the filesystem.
pub mod archive;
pub mod csv;

pub use archive::{read_feed, write_feed};

use thiserror::Error;

/// The GTFS files the reader treats as mandatory. A feed missing any of
/// these fails to load before the merge engine ever sees it.
pub const REQUIRED_FILES: [&str; 5] = ["agency.txt", "stops.txt", "routes.txt", "trips.txt", "stop_times.txt"];

#[derive(Debug, Error)]
pub enum IoError {
    #[error("required file {filename} is missing from the feed")]
    MissingRequiredFile { filename: &'static str },

    #[error("feed must contain at least one of calendar.txt or calendar_dates.txt")]
    MissingCalendarFiles,

    #[error("{filename}: {source}")]
    Csv {
        filename: String,
        #[source]
        source: ::csv::Error,
    },

    #[error("could not determine whether {path} is a directory or a zip archive")]
    NotFileNorDirectory { path: String },

    #[error(transparent)]
    Zip(#[from] ::zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
