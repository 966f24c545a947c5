// ==========================================
// AuditGov - Database location
// ==========================================

use std::path::PathBuf;

/// Environment variable that overrides the database location
pub const DB_PATH_ENV: &str = "AUDIT_GOV_DB_PATH";

const DB_FILE_NAME: &str = "audit_gov.db";

/// Resolve the database file path.
///
/// Order: `AUDIT_GOV_DB_PATH`, then the platform data directory, then the
/// working directory.
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(DB_FILE_NAME);

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("audit-gov");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}
