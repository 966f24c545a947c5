// ==========================================
// AuditGov - Trip import repository implementation
// ==========================================
// Backend: rusqlite over one shared connection
// The transaction is opened with explicit BEGIN so it can span many calls
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::EntityKind;
use crate::domain::{Agency, City, EntityId, ImportBatch, Trip};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::trip_import_repo::TripImportRepository;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// TripImportRepositoryImpl
// ==========================================
pub struct TripImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl TripImportRepositoryImpl {
    /// Open the store at `db_path`
    ///
    /// # Errors
    /// - DatabaseConnectionError when the file cannot be opened as SQLite
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Build from an existing shared connection (already configured)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Shared handle, e.g. for a report repository on the same store
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn generated_id(conn: &Connection, kind: EntityKind) -> RepositoryResult<EntityId> {
        let id = conn.last_insert_rowid();
        if id <= 0 {
            return Err(RepositoryError::InvalidIdentifier { kind, id });
        }
        Ok(id)
    }
}

impl TripImportRepository for TripImportRepositoryImpl {
    fn begin(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn commit(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("COMMIT")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn rollback(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        if conn.is_autocommit() {
            return Ok(());
        }
        conn.execute_batch("ROLLBACK")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn in_transaction(&self) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        Ok(!conn.is_autocommit())
    }

    fn find_agency_id(&self, normalized_name: &str) -> RepositoryResult<Option<EntityId>> {
        let conn = self.lock()?;
        let id = conn
            .query_row(
                "SELECT id FROM orgao WHERE normalize_key(nome) = ?1 ORDER BY id LIMIT 1",
                params![normalized_name],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id)
    }

    fn insert_agency(&self, agency: &Agency) -> RepositoryResult<EntityId> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO orgao (nome) VALUES (?1)",
            params![agency.name.trim()],
        )?;
        Self::generated_id(&conn, EntityKind::Agency)
    }

    fn find_city_id(
        &self,
        normalized_name: &str,
        normalized_region: &str,
    ) -> RepositoryResult<Option<EntityId>> {
        let conn = self.lock()?;
        let id = conn
            .query_row(
                r#"
                SELECT id FROM cidade
                WHERE normalize_key(nome) = ?1 AND normalize_key(uf) = ?2
                ORDER BY id
                LIMIT 1
                "#,
                params![normalized_name, normalized_region],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id)
    }

    fn insert_city(&self, city: &City) -> RepositoryResult<EntityId> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO cidade (nome, uf) VALUES (?1, ?2)",
            params![city.name.trim(), city.region.trim().to_uppercase()],
        )?;
        Self::generated_id(&conn, EntityKind::City)
    }

    fn insert_trip(&self, trip: &Trip, batch_id: &str) -> RepositoryResult<usize> {
        let agency_id = trip.agency.id.ok_or_else(|| {
            RepositoryError::InternalError(format!(
                "trip {} has an unresolved agency",
                trip.process_id
            ))
        })?;
        let city_id = trip.destination.id.ok_or_else(|| {
            RepositoryError::InternalError(format!(
                "trip {} has an unresolved destination",
                trip.process_id
            ))
        })?;

        let conn = self.lock()?;
        let affected = conn.execute(
            r#"
            INSERT INTO viagem (
                id_processo, data_inicio, valor_total, id_orgao, id_cidade,
                date_defaulted, amount_defaulted, batch_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                trip.process_id,
                trip.start_date.format("%Y-%m-%d").to_string(),
                trip.total_value,
                agency_id,
                city_id,
                trip.quality.date_defaulted as i32,
                trip.quality.amount_defaulted as i32,
                batch_id,
            ],
        )?;
        Ok(affected)
    }

    fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, file_name, file_path, rows_attempted, rows_imported,
                rows_skipped, rows_flagged, imported_at, elapsed_ms, summary_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                batch.batch_id,
                batch.file_name,
                batch.file_path,
                batch.rows_attempted,
                batch.rows_imported,
                batch.rows_skipped,
                batch.rows_flagged,
                batch.imported_at.to_rfc3339(),
                batch.elapsed_ms,
                batch.summary_json,
            ],
        )?;
        Ok(())
    }
}
