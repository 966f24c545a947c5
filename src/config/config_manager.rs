// ==========================================
// AuditGov - Config manager
// ==========================================
// Duty: load and override import settings
// Storage: config_kv table (key-value + scope), scope_id = 'global'
// ==========================================

use crate::config::import_config_trait::{ColumnPositions, ImportConfigReader};
use crate::config::import_settings::ImportSettings;
use crate::db::open_sqlite_connection;
use crate::importer::error::{ImportError, ImportResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
    defaults: ImportSettings,
}

impl ConfigManager {
    /// Open a ConfigManager on its own connection
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ImportError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            defaults: ImportSettings::default(),
        })
    }

    /// Share an existing connection (PRAGMAs are re-applied, idempotent)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ImportError::InternalError(format!("lock failed: {}", e)))?;
            crate::db::configure_sqlite_connection(&guard)
                .map_err(|e| ImportError::DatabaseConnectionError(e.to_string()))?;
        }

        Ok(Self {
            conn,
            defaults: ImportSettings::default(),
        })
    }

    fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("lock failed: {}", e)))?;

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Upsert a global config value
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("lock failed: {}", e)))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Parse a stored value, falling back to `default` when the key is absent
    fn get_parsed<T>(&self, key: &str, default: T) -> ImportResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| value_error(key, &raw, e.to_string())),
        }
    }

    /// Like `get_parsed`, rejecting zero
    fn get_positive(&self, key: &str, default: usize) -> ImportResult<usize> {
        let value = self.get_parsed(key, default)?;
        if value == 0 {
            return Err(value_error(key, "0", "must be greater than zero".to_string()));
        }
        Ok(value)
    }
}

fn value_error(key: &str, value: &str, message: String) -> ImportError {
    ImportError::ConfigValueError {
        key: key.to_string(),
        value: value.to_string(),
        message,
    }
}

// ==========================================
// ImportConfigReader implementation
// ==========================================
impl ImportConfigReader for ConfigManager {
    fn get_max_rows(&self) -> ImportResult<usize> {
        self.get_positive(config_keys::MAX_ROWS, self.defaults.max_rows)
    }

    fn get_min_columns(&self) -> ImportResult<usize> {
        self.get_positive(config_keys::MIN_COLUMNS, self.defaults.min_columns)
    }

    fn get_progress_interval(&self) -> ImportResult<usize> {
        self.get_positive(config_keys::PROGRESS_INTERVAL, self.defaults.progress_interval)
    }

    fn get_column_positions(&self) -> ImportResult<ColumnPositions> {
        let d = self.defaults.columns;
        Ok(ColumnPositions {
            process_id: self.get_parsed(config_keys::COLUMN_PROCESS_ID, d.process_id)?,
            agency: self.get_parsed(config_keys::COLUMN_AGENCY, d.agency)?,
            start_date: self.get_parsed(config_keys::COLUMN_START_DATE, d.start_date)?,
            destination: self.get_parsed(config_keys::COLUMN_DESTINATION, d.destination)?,
        })
    }

    fn get_date_pattern(&self) -> ImportResult<String> {
        let value = self
            .get_config_value(config_keys::DATE_PATTERN)?
            .unwrap_or_else(|| self.defaults.date_pattern.clone());
        if value.trim().is_empty() {
            return Err(value_error(
                config_keys::DATE_PATTERN,
                &value,
                "pattern is empty".to_string(),
            ));
        }
        Ok(value)
    }

    fn get_input_encoding(&self) -> ImportResult<String> {
        let value = self
            .get_config_value(config_keys::INPUT_ENCODING)?
            .unwrap_or_else(|| self.defaults.input_encoding.clone());
        if encoding_rs::Encoding::for_label(value.trim().as_bytes()).is_none() {
            return Err(value_error(
                config_keys::INPUT_ENCODING,
                &value,
                "not a known encoding label".to_string(),
            ));
        }
        Ok(value.trim().to_string())
    }

    fn get_delimiter(&self) -> ImportResult<u8> {
        let value = match self.get_config_value(config_keys::DELIMITER)? {
            None => return Ok(self.defaults.delimiter),
            Some(v) => v,
        };
        match value.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(value_error(
                config_keys::DELIMITER,
                &value,
                "delimiter must be one ASCII character".to_string(),
            )),
        }
    }

    fn get_city_max_len(&self) -> ImportResult<usize> {
        self.get_positive(config_keys::CITY_MAX_LEN, self.defaults.city_max_len)
    }

    fn get_region_len(&self) -> ImportResult<usize> {
        self.get_positive(config_keys::REGION_LEN, self.defaults.region_len)
    }
}

// ==========================================
// Config key constants
// ==========================================
pub mod config_keys {
    // Run limits
    pub const MAX_ROWS: &str = "import.max_rows";
    pub const MIN_COLUMNS: &str = "import.min_columns";
    pub const PROGRESS_INTERVAL: &str = "import.progress_interval";

    // Column layout
    pub const COLUMN_PROCESS_ID: &str = "import.column.process_id";
    pub const COLUMN_AGENCY: &str = "import.column.agency";
    pub const COLUMN_START_DATE: &str = "import.column.start_date";
    pub const COLUMN_DESTINATION: &str = "import.column.destination";

    // Input format
    pub const DATE_PATTERN: &str = "import.date_pattern";
    pub const INPUT_ENCODING: &str = "import.input_encoding";
    pub const DELIMITER: &str = "import.delimiter";

    // Storage guards
    pub const CITY_MAX_LEN: &str = "import.city_max_len";
    pub const REGION_LEN: &str = "import.region_len";
}
