//! CSV row stream reader.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use tracing::debug;

use rios_model::naming::canonical_name;

use crate::error::{IngestError, Result};
use crate::format::require_columns;
use crate::record::{CanonicalRecord, RecordSource};

/// Reads a CSV stream as canonical records.
///
/// Rows may be shorter or longer than the header; missing trailing cells
/// read as "" and extra cells are ignored. Blank lines and rows whose cells
/// are all blank are skipped.
pub struct RecordReader<R: Read> {
    headers: Vec<String>,
    records: StringRecordsIntoIter<R>,
}

impl RecordReader<File> {
    /// Opens `path` for reading.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file)
    }
}

impl<R: Read> RecordReader<R> {
    /// Reads and canonicalizes the header row of `reader`.
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let raw = reader
            .headers()
            .map_err(|source| IngestError::UnreadableHeader { source })?;
        let headers: Vec<String> = raw
            .iter()
            .map(|value| canonical_name(value.trim_matches('\u{feff}')))
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(IngestError::EmptyHeader);
        }
        debug!(columns = headers.len(), "read header row");
        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }

    /// Fails with [`IngestError::MissingColumn`] for the first absent column.
    pub fn require_columns(&self, columns: &[&str]) -> Result<()> {
        require_columns(&self.headers, columns)
    }

    fn to_record(&self, line: u64, row: &StringRecord) -> CanonicalRecord {
        let cells = self
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.clone(), row.get(idx).unwrap_or("").to_string()))
            .collect();
        CanonicalRecord::new(line, cells)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<CanonicalRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.records.next()? {
                Ok(row) => row,
                Err(source) => {
                    let line = source.position().map_or(0, csv::Position::line);
                    return Some(Err(IngestError::Csv { line, source }));
                }
            };
            let line = row.position().map_or(0, csv::Position::line);
            let record = self.to_record(line, &row);
            if record.is_blank() {
                debug!(line, "skipping blank row");
                continue;
            }
            return Some(Ok(record));
        }
    }
}

impl<R: Read> RecordSource for RecordReader<R> {
    fn headers(&self) -> &[String] {
        &self.headers
    }
}
