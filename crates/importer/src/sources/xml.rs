//! Streaming XML row reader.
//!
//! Each depth-1 child element of the document root is one record; the
//! record's child elements map tag name to text content. Nested markup
//! inside a field element is flattened to its text.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use stanza_core::types::RowRecord;

use super::SourceError;

/// Reads XML records one at a time without materialising the document.
pub struct XmlSource {
    reader: Reader<BufReader<File>>,
    buf: Vec<u8>,
    root_seen: bool,
    done: bool,
}

impl XmlSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let reader = Reader::from_reader(BufReader::new(file));
        Ok(Self {
            reader,
            buf: Vec::new(),
            root_seen: false,
            done: false,
        })
    }

    /// Consume events inside a record element until its end tag, collecting
    /// one map entry per depth-1 field element.
    fn read_record(&mut self) -> Result<RowRecord, SourceError> {
        let mut row = RowRecord::new();
        let mut depth: usize = 0;
        let mut field: Option<String> = None;
        let mut text = String::new();

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(start) => {
                    depth += 1;
                    if depth == 1 {
                        field = Some(element_name(start.local_name().as_ref()));
                        text.clear();
                    }
                }
                Event::Empty(start) => {
                    if depth == 0 {
                        row.insert(element_name(start.local_name().as_ref()), String::new());
                    }
                }
                Event::Text(t) => {
                    if field.is_some() {
                        text.push_str(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if field.is_some() {
                        text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::End(_) => {
                    if depth == 0 {
                        return Ok(row);
                    }
                    if depth == 1 {
                        if let Some(name) = field.take() {
                            row.insert(name, std::mem::take(&mut text));
                        }
                    }
                    depth -= 1;
                }
                Event::Eof => return Err(SourceError::TruncatedXml),
                _ => {}
            }
        }
    }
}

impl Iterator for XmlSource {
    type Item = Result<RowRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(_)) if !self.root_seen => {
                    self.root_seen = true;
                }
                Ok(Event::Start(_)) => {
                    return Some(self.read_record());
                }
                Ok(Event::Empty(_)) if self.root_seen => {
                    // A self-closing record element carries no fields.
                    return Some(Ok(RowRecord::new()));
                }
                Ok(Event::Eof) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    // A malformed document cannot be resumed; stop after
                    // reporting the error once.
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
