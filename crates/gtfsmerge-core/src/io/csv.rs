//! Row-level CSV codec: BOM-stripping reads, delimited writes with a
//! per-file column union so the writer emits every column any merged
//! source supplied.
use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::IoError;

/// Reads every row of one GTFS table, returning the trimmed header names
/// alongside the deserialized rows. Strips a leading UTF-8 BOM, which
/// several GTFS publishers still emit.
pub fn read_rows<T: DeserializeOwned>(mut reader: impl Read, filename: &str) -> Result<(Vec<String>, Vec<T>), IoError> {
    let mut bom = [0u8; 3];
    let read = reader.read(&mut bom)?;
    let chained: Box<dyn Read> = if read == 3 && bom == [0xef, 0xbb, 0xbf] {
        Box::new(reader)
    } else {
        Box::new(bom[..read].chain(reader))
    };

    let mut csv_reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(chained);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|source| IoError::Csv { filename: filename.to_owned(), source })?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        let row: T = record.map_err(|source| IoError::Csv { filename: filename.to_owned(), source })?;
        rows.push(row);
    }

    Ok((headers, rows))
}

/// Writes `rows` as a CSV table using `columns` as the header (and column
/// order), falling back to serde's field order for any table whose column
/// set was never recorded (an in-memory feed built by a library caller
/// rather than read from disk).
pub fn write_rows<T: Serialize>(mut writer: impl Write, rows: &[T], columns: Option<&[String]>) -> Result<(), IoError> {
    let mut builder = ::csv::WriterBuilder::new();
    builder.terminator(::csv::Terminator::Any(b'\n'));
    let mut csv_writer = builder.from_writer(Vec::new());

    if let Some(columns) = columns {
        csv_writer.write_record(columns).map_err(|source| IoError::Csv { filename: String::new(), source })?;
        for row in rows {
            let value = serde_json::to_value(row).unwrap_or(serde_json::Value::Null);
            let record: Vec<String> = columns
                .iter()
                .map(|col| {
                    value
                        .get(col)
                        .and_then(|v| v.as_str().map(str::to_owned).or_else(|| Some(v.to_string())))
                        .unwrap_or_default()
                })
                .collect();
            csv_writer.write_record(&record).map_err(|source| IoError::Csv { filename: String::new(), source })?;
        }
    } else {
        for row in rows {
            csv_writer.serialize(row).map_err(|source| IoError::Csv { filename: String::new(), source })?;
        }
    }

    let bytes = csv_writer.into_inner().map_err(|e| IoError::Csv {
        filename: String::new(),
        source: ::csv::Error::from(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())),
    })?;
    writer.write_all(&bytes)?;
    Ok(())
}
