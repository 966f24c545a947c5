// ==========================================
// AuditGov - Field mapper
// ==========================================
// Leading fields sit at fixed positions; the monetary block is always the
// last four cells, in this order:
//   n-4 per diem | n-3 fare | n-2 refund | n-1 other expenses
// Leading column count varies across export variants, so the block is
// addressed from the end of the row
// ==========================================

use crate::config::ColumnPositions;
use crate::domain::{RawTripRecord, SkipReason};
use crate::importer::trip_importer_trait::FieldMapper;

/// Number of trailing monetary cells
pub const TRAILING_FIELDS: usize = 4;

/// Default minimum cell count for a usable row
pub const DEFAULT_MIN_COLUMNS: usize = 15;

pub struct TrailingFieldMapper {
    columns: ColumnPositions,
    min_columns: usize,
}

impl Default for TrailingFieldMapper {
    fn default() -> Self {
        Self::new(ColumnPositions::default(), DEFAULT_MIN_COLUMNS)
    }
}

impl TrailingFieldMapper {
    pub fn new(columns: ColumnPositions, min_columns: usize) -> Self {
        Self {
            columns,
            // the trailing block must never reach below index 0
            min_columns: min_columns.max(TRAILING_FIELDS),
        }
    }

    pub fn min_columns(&self) -> usize {
        self.min_columns
    }
}

/// Cell text at `index`, empty when the row is shorter
fn cell(cells: &[String], index: usize) -> String {
    cells.get(index).cloned().unwrap_or_default()
}

impl FieldMapper for TrailingFieldMapper {
    fn map_row(&self, cells: &[String], row_number: usize) -> Result<RawTripRecord, SkipReason> {
        let n = cells.len();
        if n < self.min_columns {
            return Err(SkipReason::TooFewColumns {
                found: n,
                required: self.min_columns,
            });
        }

        Ok(RawTripRecord {
            row_number,
            column_count: n,

            process_id: cell(cells, self.columns.process_id),
            agency_name: cell(cells, self.columns.agency),
            start_date: cell(cells, self.columns.start_date),
            destination: cell(cells, self.columns.destination),

            per_diem: cell(cells, n - 4),
            fare: cell(cells, n - 3),
            refund: cell(cells, n - 2),
            other_expenses: cell(cells, n - 1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(len: usize) -> Vec<String> {
        (0..len).map(|i| format!("c{}", i)).collect()
    }

    #[test]
    fn test_trailing_offsets_pinned() {
        let cells = row(20);
        let raw = TrailingFieldMapper::default().map_row(&cells, 2).unwrap();

        assert_eq!(raw.per_diem, "c16");
        assert_eq!(raw.fare, "c17");
        assert_eq!(raw.refund, "c18");
        assert_eq!(raw.other_expenses, "c19");
        assert_eq!(raw.column_count, 20);
        assert_eq!(raw.row_number, 2);
    }

    #[test]
    fn test_leading_positions() {
        let cells = row(20);
        let raw = TrailingFieldMapper::default().map_row(&cells, 2).unwrap();

        assert_eq!(raw.process_id, "c0");
        assert_eq!(raw.agency_name, "c6");
        assert_eq!(raw.start_date, "c14");
        assert_eq!(raw.destination, "c16");
    }

    #[test]
    fn test_offsets_follow_row_length() {
        let cells = row(23);
        let raw = TrailingFieldMapper::default().map_row(&cells, 9).unwrap();
        assert_eq!(raw.per_diem, "c19");
        assert_eq!(raw.other_expenses, "c22");
    }

    #[test]
    fn test_minimum_row_reads_missing_destination_as_empty() {
        let cells = row(15);
        let raw = TrailingFieldMapper::default().map_row(&cells, 3).unwrap();
        assert_eq!(raw.destination, "");
        assert_eq!(raw.per_diem, "c11");
    }

    #[test]
    fn test_short_row_skipped() {
        let cells = row(14);
        let err = TrailingFieldMapper::default().map_row(&cells, 4).unwrap_err();
        assert_eq!(err, SkipReason::TooFewColumns { found: 14, required: 15 });
    }

    #[test]
    fn test_minimum_never_below_trailing_block() {
        let mapper = TrailingFieldMapper::new(ColumnPositions::default(), 1);
        assert_eq!(mapper.min_columns(), TRAILING_FIELDS);
        assert!(mapper.map_row(&row(3), 2).is_err());
    }
}
