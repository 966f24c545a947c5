// ==========================================
// AuditGov - Import config reader trait
// ==========================================
// Duty: read-only access to the settings the import pipeline needs
// Rule: no writes, no business logic
// ==========================================

use crate::importer::error::ImportResult;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// Implementors: ConfigManager (config_kv table), ImportSettings (fixed values)
pub trait ImportConfigReader: Send + Sync {
    // ===== Run limits =====

    /// Maximum number of data lines read per run
    ///
    /// # Default
    /// - 20000
    fn get_max_rows(&self) -> ImportResult<usize>;

    /// Rows with fewer cells are skipped
    ///
    /// # Default
    /// - 15
    fn get_min_columns(&self) -> ImportResult<usize>;

    /// Log a progress line every N rows
    ///
    /// # Default
    /// - 1000
    fn get_progress_interval(&self) -> ImportResult<usize>;

    // ===== Column layout =====

    /// Leading column positions: (process id, agency, start date, destination)
    ///
    /// # Default
    /// - (0, 6, 14, 16)
    fn get_column_positions(&self) -> ImportResult<ColumnPositions>;

    // ===== Input format =====

    /// chrono pattern for start dates
    ///
    /// # Default
    /// - `%d/%m/%Y`
    fn get_date_pattern(&self) -> ImportResult<String>;

    /// WHATWG encoding label of the input file
    ///
    /// # Default
    /// - `windows-1252`
    fn get_input_encoding(&self) -> ImportResult<String>;

    /// Single-byte field delimiter
    ///
    /// # Default
    /// - `;`
    fn get_delimiter(&self) -> ImportResult<u8>;

    // ===== Storage guards =====

    /// Max city name length in characters (default 150)
    fn get_city_max_len(&self) -> ImportResult<usize>;

    /// Region code length in characters (default 2)
    fn get_region_len(&self) -> ImportResult<usize>;
}

/// Positions of the leading named columns (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPositions {
    pub process_id: usize,
    pub agency: usize,
    pub start_date: usize,
    pub destination: usize,
}

impl Default for ColumnPositions {
    fn default() -> Self {
        Self {
            process_id: 0,
            agency: 6,
            start_date: 14,
            destination: 16,
        }
    }
}
