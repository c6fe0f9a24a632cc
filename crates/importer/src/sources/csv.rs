//! Streaming CSV row reader.

use std::fs::File;
use std::path::Path;

use stanza_core::types::RowRecord;

use super::SourceError;

/// Reads CSV records one at a time, keyed by the header row.
pub struct CsvSource {
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<File>,
}

impl CsvSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;
        let headers = reader.headers()?.iter().map(String::from).collect();
        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }
}

impl Iterator for CsvSource {
    type Item = Result<RowRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };

        // Cells beyond the header width are dropped; short records simply
        // omit the trailing columns.
        let row: RowRecord = self
            .headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.to_string()))
            .collect();

        Some(Ok(row))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
