// ==========================================
// AuditGov - Import pipeline traits
// ==========================================
// Stages: FileParser -> FieldMapper -> RowAssembler -> EntityResolver
// TripImporter drives them inside one transaction
// ==========================================

use crate::domain::{ImportPhase, ImportReport, RawTripRecord, SkipReason};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::RowStream;
use crate::importer::run_control::CancellationToken;
use std::path::Path;

// ==========================================
// TripImporter Trait (orchestrator)
// ==========================================
pub trait TripImporter: Send + Sync {
    /// Import one delimited file as a single all-or-nothing run
    ///
    /// # Returns
    /// - Ok(ImportReport): committed run with per-reason skip counts
    /// - Err(ImportError): nothing from this run is durable
    fn import_file(&self, file_path: &Path, cancel: &CancellationToken)
        -> ImportResult<ImportReport>;

    /// Phase of the current (or last) run
    fn phase(&self) -> ImportPhase;
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// Open a file and stream its data rows (header skipped)
    ///
    /// # Errors
    /// - FileNotFound / FileReadError: the run must not start
    fn open_rows(&self, file_path: &Path) -> ImportResult<RowStream>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
pub trait FieldMapper: Send + Sync {
    /// Extract the named fields of one row
    ///
    /// # Returns
    /// - Ok(RawTripRecord): raw cell text per field
    /// - Err(SkipReason): row shape unusable, skip and count
    fn map_row(&self, cells: &[String], row_number: usize) -> Result<RawTripRecord, SkipReason>;
}
