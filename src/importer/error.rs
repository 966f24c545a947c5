// ==========================================
// AuditGov - Import layer error types
// ==========================================
// Tool: thiserror derive
// Rule: only fatal conditions live here; per-row problems are RowOutcome
// ==========================================

use crate::domain::types::EntityKind;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Import layer error
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File =====
    #[error("input file not found: {0}")]
    FileNotFound(String),

    #[error("input file could not be read: {0}")]
    FileReadError(String),

    #[error("unknown input encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("CSV parsing failed: {0}")]
    CsvParseError(String),

    // ===== Store =====
    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    #[error("{kind} resolution failed (row {row}): {message}")]
    EntityResolutionError {
        kind: EntityKind,
        row: usize,
        message: String,
    },

    // ===== Run control =====
    #[error("import cancelled after {rows_read} rows")]
    Cancelled { rows_read: usize },

    // ===== Configuration =====
    #[error("config read failed (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("config value malformed (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== Generic =====
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseConnectionError(msg) => {
                ImportError::DatabaseConnectionError(msg)
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ImportError::DatabaseTransactionError(msg)
            }
            other => ImportError::InternalError(other.to_string()),
        }
    }
}

impl ImportError {
    /// Whether the run was stopped by the caller rather than by a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ImportError::Cancelled { .. })
    }
}

/// Result alias
pub type ImportResult<T> = Result<T, ImportError>;
