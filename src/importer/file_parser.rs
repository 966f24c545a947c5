// ==========================================
// AuditGov - Delimited file parser
// ==========================================
// Stage 0: read + decode + split into cells
// The source export is single-byte Western text: decode it before splitting
// so accented letters survive until the normalizer strips them
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::trip_importer_trait::FileParser;
use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};
use encoding_rs::Encoding;
use std::io::Cursor;
use std::path::Path;

/// One data line split into cells
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// 1-based line number in the file (header = 1)
    pub line: usize,
    pub cells: Vec<String>,
}

/// Lazily split rows of a decoded file; the header is already consumed
pub struct RowStream {
    records: StringRecordsIntoIter<Cursor<Vec<u8>>>,
    fallback_line: usize,
}

impl Iterator for RowStream {
    type Item = ImportResult<SourceRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        self.fallback_line += 1;

        Some(match record {
            Ok(record) => Ok(SourceRow {
                line: record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(self.fallback_line),
                cells: record.iter().map(str::to_string).collect(),
            }),
            Err(e) => Err(ImportError::from(e)),
        })
    }
}

// ==========================================
// DelimitedFileParser
// ==========================================
pub struct DelimitedFileParser {
    encoding: &'static Encoding,
    delimiter: u8,
}

impl DelimitedFileParser {
    /// # Errors
    /// - UnsupportedEncoding when `encoding_label` is not a WHATWG label
    pub fn new(encoding_label: &str, delimiter: u8) -> ImportResult<Self> {
        let encoding = Encoding::for_label(encoding_label.trim().as_bytes())
            .ok_or_else(|| ImportError::UnsupportedEncoding(encoding_label.to_string()))?;
        Ok(Self {
            encoding,
            delimiter,
        })
    }

    /// Decode raw bytes; invalid sequences become U+FFFD
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, used, had_errors) = self.encoding.decode(bytes);
        if had_errors {
            tracing::warn!(encoding = used.name(), "input contained undecodable bytes");
        }
        text.into_owned()
    }

    /// Split already-decoded text into rows, skipping the header line
    pub fn rows_from_text(&self, text: String) -> RowStream {
        let reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(Cursor::new(text.into_bytes()));

        RowStream {
            records: reader.into_records(),
            fallback_line: 1,
        }
    }
}

impl FileParser for DelimitedFileParser {
    fn open_rows(&self, file_path: &Path) -> ImportResult<RowStream> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let bytes = std::fs::read(file_path)?;
        tracing::debug!(
            file = %file_path.display(),
            bytes = bytes.len(),
            encoding = self.encoding.name(),
            "input file read"
        );

        Ok(self.rows_from_text(self.decode(&bytes)))
    }
}
