//! Implementation of the `gtfsmerge` binary's sole operation: reading every
//! input feed, running the merge engine, and writing the result.
use gtfsmerge_core::{Feed, GtfsFile, MergeConfig, io};

use crate::cli::Cli;
use crate::error::CliError;

/// Runs the merge: reads every input path, applies `cli`'s policy flags,
/// merges, and writes the result to the trailing output path.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let (input_paths, output_path) = cli.inputs_and_output();

    let mut feeds: Vec<Feed> = Vec::with_capacity(input_paths.len());
    for path in input_paths {
        let feed = io::read_feed(path).map_err(|source| CliError::Io { path: path.clone(), source })?;
        feeds.push(feed);
    }

    let config = build_config(cli)?;
    let output = gtfsmerge_core::merge(&feeds, &config)?;

    io::write_feed(output_path, &output.feed).map_err(|source| CliError::Io {
        path: output_path.clone(),
        source,
    })?;

    Ok(())
}

/// Builds a [`MergeConfig`] from the parsed CLI flags: the unscoped
/// `--duplicate-detection`/`--logging` defaults, overridden per file by any
/// `--file=NAME:MODE` entries, plus auto-detect and concurrency tuning.
fn build_config(cli: &Cli) -> Result<MergeConfig, CliError> {
    let mut config = MergeConfig::default();
    config.set_all(cli.duplicate_detection.into(), cli.logging.into());
    config.auto_detect = cli.auto_detect;
    config.concurrent_scorer_enabled = cli.jobs > 0;

    let overrides = cli.parsed_file_overrides().map_err(|detail| CliError::InvalidFileOverride { detail })?;
    for (name, mode) in overrides {
        let Some(file) = GtfsFile::from_filename(&name) else {
            return Err(CliError::InvalidFileOverride { detail: format!("unknown GTFS filename in --file: {name:?}") });
        };
        config.set_detection_for(file, mode.into());
    }

    Ok(config)
}
