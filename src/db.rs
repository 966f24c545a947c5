// ==========================================
// AuditGov - SQLite connection setup
// ==========================================
// Goals:
// - every Connection::open goes through the same PRAGMAs
// - uniform busy_timeout
// - store-side lookups use the same key normalization as the resolver cache
// ==========================================

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version this code expects
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Trim, upper-case and collapse internal whitespace runs to one space.
///
/// Shared by the resolver cache and the `normalize_key` SQL function so both
/// sides of a lookup compare identical keys.
pub fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Apply the uniform PRAGMAs and register scalar functions.
///
/// Both foreign_keys and busy_timeout are per connection.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    conn.create_scalar_function(
        "normalize_key",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| normalize_key(&v)))
        },
    )?;
    Ok(())
}

/// Open a SQLite connection with the uniform configuration
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create all tables used by the import pipeline (idempotent).
///
/// Agency and city names carry no UNIQUE constraint: deduplication belongs
/// to the entity resolver.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS orgao (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS cidade (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL,
            uf TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id TEXT PRIMARY KEY,
            file_name TEXT,
            file_path TEXT,
            rows_attempted INTEGER NOT NULL,
            rows_imported INTEGER NOT NULL,
            rows_skipped INTEGER NOT NULL,
            rows_flagged INTEGER NOT NULL,
            imported_at TEXT NOT NULL,
            elapsed_ms INTEGER NOT NULL,
            summary_json TEXT
        );

        CREATE TABLE IF NOT EXISTS viagem (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            id_processo TEXT NOT NULL,
            data_inicio TEXT NOT NULL,
            valor_total REAL NOT NULL,
            id_orgao INTEGER NOT NULL REFERENCES orgao(id),
            id_cidade INTEGER NOT NULL REFERENCES cidade(id),
            date_defaulted INTEGER NOT NULL DEFAULT 0,
            amount_defaulted INTEGER NOT NULL DEFAULT 0,
            batch_id TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_viagem_orgao ON viagem(id_orgao);
        CREATE INDEX IF NOT EXISTS idx_viagem_cidade ON viagem(id_cidade);
        CREATE INDEX IF NOT EXISTS idx_viagem_data ON viagem(data_inicio);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// Read schema_version (None when the table does not exist)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_collapses_case_and_whitespace() {
        assert_eq!(normalize_key("  ministerio   da saude  "), "MINISTERIO DA SAUDE");
        assert_eq!(normalize_key("Ministerio da Saude"), "MINISTERIO DA SAUDE");
        assert_eq!(normalize_key("\tA\n B "), "A B");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_sql_normalize_key_matches_rust() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        let value: String = conn
            .query_row("SELECT normalize_key(?1)", ["  porto   alegre "], |row| row.get(0))
            .unwrap();
        assert_eq!(value, normalize_key("  porto   alegre "));
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_schema_version_absent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }
}
