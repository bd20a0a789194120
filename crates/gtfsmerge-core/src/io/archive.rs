//! Feed-level assembly on top of [`super::csv`]: loads a whole GTFS dataset
//! from a directory or zip archive, and writes a merged [`Feed`] back out as
//! a zip archive.
use std::fs::File;
use std::hash::Hash;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use zip::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::{IoError, REQUIRED_FILES, csv};
use crate::feed::{ColumnSets, Feed, GroupedTable, IndexedTable, OrderedList};
use crate::model::{Agency, Area, Calendar, CalendarDate, FareAttribute, FeedInfo, Pathway, Route, ShapePoint, Stop, Trip};

/// Abstracts over "a directory on disk" and "a zip archive" so the table
/// loaders below don't need to know which one they're reading from.
trait FeedSource {
    fn read_file(&mut self, filename: &str) -> Result<Option<Vec<u8>>, IoError>;
}

struct DirSource {
    root: PathBuf,
}

impl FeedSource for DirSource {
    fn read_file(&mut self, filename: &str) -> Result<Option<Vec<u8>>, IoError> {
        let path = self.root.join(filename);
        if !path.is_file() {
            return Ok(None);
        }
        let mut buf = Vec::new();
        File::open(path)?.read_to_end(&mut buf)?;
        Ok(Some(buf))
    }
}

struct ZipSource {
    archive: ZipArchive<File>,
    /// Single leading directory component shared by every entry (e.g. a
    /// feed zipped as `my-feed/agency.txt`), stripped before matching
    /// against the canonical GTFS filenames.
    prefix: String,
}

impl ZipSource {
    fn open(path: &Path) -> Result<Self, IoError> {
        let archive = ZipArchive::new(File::open(path)?)?;
        let prefix = detect_common_prefix(&archive);
        Ok(Self { archive, prefix })
    }
}

fn detect_common_prefix(archive: &ZipArchive<File>) -> String {
    let mut candidate: Option<String> = None;
    for name in archive.file_names() {
        let Some((dir, _)) = name.split_once('/') else {
            return String::new();
        };
        match &candidate {
            Some(existing) if existing == dir => {}
            Some(_) => return String::new(),
            None => candidate = Some(dir.to_owned()),
        }
    }
    candidate.map(|d| format!("{d}/")).unwrap_or_default()
}

impl FeedSource for ZipSource {
    fn read_file(&mut self, filename: &str) -> Result<Option<Vec<u8>>, IoError> {
        let name = format!("{}{filename}", self.prefix);
        match self.archive.by_name(&name) {
            Ok(mut entry) => {
                let mut buf = Vec::new();
                entry.read_to_end(&mut buf)?;
                Ok(Some(buf))
            }
            Err(zip::result::ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reads a GTFS feed from `path`, which may be a directory containing the
/// `.txt` tables or a zip archive of them (optionally nested one directory
/// deep, as most publishers zip them).
pub fn read_feed(path: &Path) -> Result<Feed, IoError> {
    if path.is_dir() {
        let mut source = DirSource { root: path.to_path_buf() };
        assemble(&mut source)
    } else if path.is_file() {
        let mut source = ZipSource::open(path)?;
        assemble(&mut source)
    } else {
        Err(IoError::NotFileNorDirectory { path: path.display().to_string() })
    }
}

fn assemble(source: &mut dyn FeedSource) -> Result<Feed, IoError> {
    for filename in REQUIRED_FILES {
        if source.read_file(filename)?.is_none() {
            return Err(IoError::MissingRequiredFile { filename });
        }
    }
    if source.read_file("calendar.txt")?.is_none() && source.read_file("calendar_dates.txt")?.is_none() {
        return Err(IoError::MissingCalendarFiles);
    }

    let mut columns = ColumnSets::new();
    let mut feed = Feed::new();

    feed.agencies = load_indexed(source, "agency.txt", &mut columns, |a: &Agency| a.agency_id.clone())?;
    feed.areas = load_indexed(source, "areas.txt", &mut columns, |a: &Area| a.area_id.clone())?;
    feed.stops = load_indexed(source, "stops.txt", &mut columns, |s: &Stop| s.stop_id.clone())?;
    feed.routes = load_indexed(source, "routes.txt", &mut columns, |r: &Route| r.route_id.clone())?;
    feed.trips = load_indexed(source, "trips.txt", &mut columns, |t: &Trip| t.trip_id.clone())?;
    feed.stop_times = load_list(source, "stop_times.txt", &mut columns)?;
    feed.calendars = load_indexed(source, "calendar.txt", &mut columns, |c: &Calendar| c.service_id.clone())?;
    feed.calendar_dates = load_grouped(source, "calendar_dates.txt", &mut columns, |c: &CalendarDate| c.service_id.clone())?;
    feed.shapes = load_grouped(source, "shapes.txt", &mut columns, |p: &ShapePoint| p.shape_id.clone())?;
    feed.frequencies = load_list(source, "frequencies.txt", &mut columns)?;
    feed.transfers = load_list(source, "transfers.txt", &mut columns)?;
    feed.pathways = load_indexed(source, "pathways.txt", &mut columns, |p: &Pathway| p.pathway_id.clone())?;
    feed.fare_attributes = load_indexed(source, "fare_attributes.txt", &mut columns, |f: &FareAttribute| f.fare_id.clone())?;
    feed.fare_rules = load_list(source, "fare_rules.txt", &mut columns)?;
    feed.feed_infos = load_indexed(source, "feed_info.txt", &mut columns, |f: &FeedInfo| {
        if f.feed_id.is_empty() { "1".to_owned() } else { f.feed_id.clone() }
    })?;

    feed.columns = columns;
    Ok(feed)
}

fn load_indexed<K, V, F>(
    source: &mut dyn FeedSource,
    filename: &str,
    columns: &mut ColumnSets,
    key_of: F,
) -> Result<IndexedTable<K, V>, IoError>
where
    V: DeserializeOwned,
    K: Clone + Eq + Hash,
    F: Fn(&V) -> K,
{
    let mut table = IndexedTable::new();
    if let Some(bytes) = source.read_file(filename)? {
        let (cols, rows): (Vec<String>, Vec<V>) = csv::read_rows(&bytes[..], filename)?;
        columns.record(filename, cols);
        for row in rows {
            table.insert(key_of(&row), row);
        }
    }
    Ok(table)
}

fn load_grouped<K, V, F>(
    source: &mut dyn FeedSource,
    filename: &str,
    columns: &mut ColumnSets,
    key_of: F,
) -> Result<GroupedTable<K, V>, IoError>
where
    V: DeserializeOwned,
    K: Clone + Eq + Hash,
    F: Fn(&V) -> K,
{
    let mut table = GroupedTable::new();
    if let Some(bytes) = source.read_file(filename)? {
        let (cols, rows): (Vec<String>, Vec<V>) = csv::read_rows(&bytes[..], filename)?;
        columns.record(filename, cols);
        for row in rows {
            table.push(key_of(&row), row);
        }
    }
    Ok(table)
}

fn load_list<V>(source: &mut dyn FeedSource, filename: &str, columns: &mut ColumnSets) -> Result<OrderedList<V>, IoError>
where
    V: DeserializeOwned,
{
    match source.read_file(filename)? {
        Some(bytes) => {
            let (cols, rows): (Vec<String>, Vec<V>) = csv::read_rows(&bytes[..], filename)?;
            columns.record(filename, cols);
            Ok(rows)
        }
        None => Ok(Vec::new()),
    }
}

/// Writes `feed` out as a zip archive at `path`. Every table file is
/// written with LF line endings and the column set recorded while reading
/// (falling back to each struct's serde field order for tables that were
/// never read from disk, e.g. a feed assembled entirely by a library
/// caller).
pub fn write_feed(path: &Path, feed: &Feed) -> Result<(), IoError> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options: SimpleFileOptions = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    write_table(&mut zip, options.clone(), "agency.txt", feed.agencies.values().collect::<Vec<_>>(), &feed.columns)?;
    write_table(&mut zip, options.clone(), "areas.txt", feed.areas.values().collect::<Vec<_>>(), &feed.columns)?;
    write_table(&mut zip, options.clone(), "stops.txt", feed.stops.values().collect::<Vec<_>>(), &feed.columns)?;
    write_table(&mut zip, options.clone(), "routes.txt", feed.routes.values().collect::<Vec<_>>(), &feed.columns)?;
    write_table(&mut zip, options.clone(), "trips.txt", feed.trips.values().collect::<Vec<_>>(), &feed.columns)?;
    write_table(&mut zip, options.clone(), "stop_times.txt", feed.stop_times.iter().collect::<Vec<_>>(), &feed.columns)?;
    write_table(&mut zip, options.clone(), "calendar.txt", feed.calendars.values().collect::<Vec<_>>(), &feed.columns)?;
    write_table(
        &mut zip,
        options.clone(),
        "calendar_dates.txt",
        feed.calendar_dates.iter().flat_map(|(_, rows)| rows.iter()).collect::<Vec<_>>(),
        &feed.columns,
    )?;
    write_table(
        &mut zip,
        options.clone(),
        "shapes.txt",
        feed.shapes.iter().flat_map(|(_, rows)| rows.iter()).collect::<Vec<_>>(),
        &feed.columns,
    )?;
    write_table(&mut zip, options.clone(), "frequencies.txt", feed.frequencies.iter().collect::<Vec<_>>(), &feed.columns)?;
    write_table(&mut zip, options.clone(), "transfers.txt", feed.transfers.iter().collect::<Vec<_>>(), &feed.columns)?;
    write_table(&mut zip, options.clone(), "pathways.txt", feed.pathways.values().collect::<Vec<_>>(), &feed.columns)?;

    let formatted_fares: Vec<FareAttribute> = feed
        .fare_attributes
        .values()
        .map(|f| {
            let mut f = f.clone();
            if let Ok(price) = f.price.parse::<f64>() {
                f.price = format!("{price:.2}");
            }
            f
        })
        .collect();
    write_table(&mut zip, options.clone(), "fare_attributes.txt", formatted_fares.iter().collect::<Vec<_>>(), &feed.columns)?;

    write_table(&mut zip, options.clone(), "fare_rules.txt", feed.fare_rules.iter().collect::<Vec<_>>(), &feed.columns)?;
    write_table(&mut zip, options.clone(), "feed_info.txt", feed.feed_infos.values().collect::<Vec<_>>(), &feed.columns)?;

    zip.finish()?;
    Ok(())
}

fn write_table<T: Serialize>(
    zip: &mut ZipWriter<File>,
    options: SimpleFileOptions,
    filename: &str,
    rows: Vec<&T>,
    columns: &ColumnSets,
) -> Result<(), IoError> {
    zip.start_file(filename, options)?;
    let recorded: Option<Vec<String>> = columns.columns_for(filename).map(|set| set.iter().cloned().collect());
    let mut buf: Vec<u8> = Vec::new();
    csv::write_rows(&mut buf, &rows, recorded.as_deref())?;
    zip.write_all(&buf)?;
    Ok(())
}
