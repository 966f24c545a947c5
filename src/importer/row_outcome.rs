// ==========================================
// AuditGov - Per-row outcome
// ==========================================
// The orchestrator is the only place deciding skip vs abort
// ==========================================

use crate::domain::{SkipReason, Trip};
use crate::importer::error::ImportError;

#[derive(Debug)]
pub enum RowOutcome {
    /// Trip stored inside the run transaction
    Imported(Trip),
    /// Row not stored, run continues
    Skipped(SkipReason),
    /// Run must roll back
    Fatal(ImportError),
}

impl RowOutcome {
    pub fn is_imported(&self) -> bool {
        matches!(self, RowOutcome::Imported(_))
    }
}
