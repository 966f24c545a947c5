// ==========================================
// AuditGov - Import settings snapshot
// ==========================================
// Read once per run so a config change mid-run cannot alter row handling
// ==========================================

use crate::config::import_config_trait::{ColumnPositions, ImportConfigReader};
use crate::importer::error::ImportResult;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    pub max_rows: usize,
    pub min_columns: usize,
    pub columns: ColumnPositions,
    pub date_pattern: String,
    pub input_encoding: String,
    pub delimiter: u8,
    pub city_max_len: usize,
    pub region_len: usize,
    pub progress_interval: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_rows: 20_000,
            min_columns: 15,
            columns: ColumnPositions::default(),
            date_pattern: "%d/%m/%Y".to_string(),
            input_encoding: "windows-1252".to_string(),
            delimiter: b';',
            city_max_len: 150,
            region_len: 2,
            progress_interval: 1_000,
        }
    }
}

impl ImportSettings {
    /// Snapshot every setting from a reader
    pub fn load(reader: &dyn ImportConfigReader) -> ImportResult<Self> {
        Ok(Self {
            max_rows: reader.get_max_rows()?,
            min_columns: reader.get_min_columns()?,
            columns: reader.get_column_positions()?,
            date_pattern: reader.get_date_pattern()?,
            input_encoding: reader.get_input_encoding()?,
            delimiter: reader.get_delimiter()?,
            city_max_len: reader.get_city_max_len()?,
            region_len: reader.get_region_len()?,
            progress_interval: reader.get_progress_interval()?,
        })
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

impl ImportConfigReader for ImportSettings {
    fn get_max_rows(&self) -> ImportResult<usize> {
        Ok(self.max_rows)
    }

    fn get_min_columns(&self) -> ImportResult<usize> {
        Ok(self.min_columns)
    }

    fn get_progress_interval(&self) -> ImportResult<usize> {
        Ok(self.progress_interval)
    }

    fn get_column_positions(&self) -> ImportResult<ColumnPositions> {
        Ok(self.columns)
    }

    fn get_date_pattern(&self) -> ImportResult<String> {
        Ok(self.date_pattern.clone())
    }

    fn get_input_encoding(&self) -> ImportResult<String> {
        Ok(self.input_encoding.clone())
    }

    fn get_delimiter(&self) -> ImportResult<u8> {
        Ok(self.delimiter)
    }

    fn get_city_max_len(&self) -> ImportResult<usize> {
        Ok(self.city_max_len)
    }

    fn get_region_len(&self) -> ImportResult<usize> {
        Ok(self.region_len)
    }
}
