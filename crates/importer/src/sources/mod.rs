//! Lazy source-file readers.
//!
//! A [`Source`] yields one [`RowRecord`] per top-level record of the file,
//! pulling from disk as it is iterated; the file is never resident in
//! memory as a whole. Opening the same path twice restarts from the top.

use std::path::Path;

use stanza_core::import::ImportType;
use stanza_core::types::RowRecord;

mod csv;
mod xml;

pub use self::csv::CsvSource;
pub use self::xml::XmlSource;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to open source file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML document ended inside a record element")]
    TruncatedXml,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A lazy row reader over one source file.
pub enum Source {
    Csv(CsvSource),
    Xml(XmlSource),
}

impl Source {
    /// Open the source for `path` according to the import's type.
    pub fn open(import_type: ImportType, path: &Path) -> Result<Self, SourceError> {
        match import_type {
            ImportType::Csv => Ok(Self::Csv(CsvSource::open(path)?)),
            ImportType::Xml => Ok(Self::Xml(XmlSource::open(path)?)),
        }
    }

    /// Read only the first row of a source, for mapping-descriptor
    /// sampling. Returns `None` for an empty source.
    pub fn first_row(
        import_type: ImportType,
        path: &Path,
    ) -> Result<Option<RowRecord>, SourceError> {
        Self::open(import_type, path)?.next().transpose()
    }
}

impl Iterator for Source {
    type Item = Result<RowRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Csv(inner) => inner.next(),
            Self::Xml(inner) => inner.next(),
        }
    }
}
