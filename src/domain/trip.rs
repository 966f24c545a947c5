// ==========================================
// AuditGov - Trip domain model
// ==========================================
// Agency / City: immutable once created, identity = normalized text key
// Trip: one fact row per valid input line, never updated by the pipeline
// Identifiers are filled in progressively (None = unresolved)
// ==========================================

use crate::domain::types::{EntityId, SkipKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Agency - sponsoring government body
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    pub id: Option<EntityId>,
    pub name: String,
}

impl Agency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.id.is_some()
    }
}

// ==========================================
// City - trip destination
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: Option<EntityId>,
    pub name: String,
    pub region: String, // 2-letter region code (UF)
}

impl City {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            region: region.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.id.is_some()
    }
}

// ==========================================
// DataQualityFlags - defaults applied while normalizing
// ==========================================
// The row is still imported; the flags make the substitution visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityFlags {
    pub date_defaulted: bool,   // start date replaced by the import date
    pub amount_defaulted: bool, // at least one amount replaced by 0.0
}

impl DataQualityFlags {
    pub fn any(&self) -> bool {
        self.date_defaulted || self.amount_defaulted
    }
}

// ==========================================
// Trip - imported fact row
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub process_id: String,
    pub start_date: NaiveDate,
    pub total_value: f64,
    pub agency: Agency,
    pub destination: City,
    pub quality: DataQualityFlags,
    pub row_number: usize, // source line number (header = 1)
}

impl Trip {
    /// Both dimension references carry a store identifier
    pub fn is_resolved(&self) -> bool {
        self.agency.is_resolved() && self.destination.is_resolved()
    }
}

// ==========================================
// RawTripRecord - named fields extracted from one input row
// ==========================================
// Values are raw cell text; normalization happens in the assembler
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTripRecord {
    pub row_number: usize,
    pub column_count: usize,

    pub process_id: String,
    pub agency_name: String,
    pub start_date: String,
    pub destination: String,

    // Trailing monetary block, fixed relative order
    pub per_diem: String,
    pub fare: String,
    pub refund: String,
    pub other_expenses: String,
}

// ==========================================
// SkipReason - why a row was not imported
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    TooFewColumns { found: usize, required: usize },
    PersistenceFailed { message: String },
}

impl SkipReason {
    pub fn kind(&self) -> SkipKind {
        match self {
            SkipReason::TooFewColumns { .. } => SkipKind::TooFewColumns,
            SkipReason::PersistenceFailed { .. } => SkipKind::PersistenceFailed,
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::TooFewColumns { found, required } => {
                write!(f, "row has {} columns, at least {} required", found, required)
            }
            SkipReason::PersistenceFailed { message } => {
                write!(f, "trip could not be stored: {}", message)
            }
        }
    }
}

// ==========================================
// ImportBatch - audit row written with each committed run
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub rows_attempted: i64,
    pub rows_imported: i64,
    pub rows_skipped: i64,
    pub rows_flagged: i64,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    pub summary_json: Option<String>,
}

// ==========================================
// ImportReport - result of one successful run
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub rows_attempted: usize,
    pub rows_imported: usize,
    pub skipped: BTreeMap<SkipKind, usize>,
    pub rows_flagged: usize,
    pub agencies_created: usize,
    pub cities_created: usize,
    pub cap_reached: bool,
    pub elapsed_ms: u64,
}

impl ImportReport {
    pub fn rows_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, kind: SkipKind) -> usize {
        self.skipped.get(&kind).copied().unwrap_or(0)
    }

    pub(crate) fn record_skip(&mut self, kind: SkipKind) {
        *self.skipped.entry(kind).or_insert(0) += 1;
    }

    /// Human-readable one-paragraph summary
    pub fn summary(&self) -> String {
        let mut text = format!(
            "{} rows attempted, {} trips imported, {} rows skipped",
            self.rows_attempted,
            self.rows_imported,
            self.rows_skipped()
        );

        if !self.skipped.is_empty() {
            let reasons: Vec<String> = self
                .skipped
                .iter()
                .map(|(kind, count)| format!("{}: {}", kind, count))
                .collect();
            text.push_str(&format!(" ({})", reasons.join(", ")));
        }

        if self.rows_flagged > 0 {
            text.push_str(&format!(
                "; {} imported rows used default date or amount",
                self.rows_flagged
            ));
        }

        if self.cap_reached {
            text.push_str("; row limit reached, remaining input not read");
        }

        text
    }
}
