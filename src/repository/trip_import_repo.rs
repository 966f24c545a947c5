// ==========================================
// AuditGov - Trip import repository trait
// ==========================================
// Persistence gateway consumed by the import pipeline:
// transaction control + parametrized lookups/inserts
// Rule: no normalization, no caching, no business rules here
// ==========================================

use crate::domain::{Agency, City, EntityId, ImportBatch, Trip};
use crate::repository::error::RepositoryResult;

// ==========================================
// TripImportRepository Trait
// ==========================================
// Implementor: TripImportRepositoryImpl (rusqlite)
pub trait TripImportRepository: Send + Sync {
    // ===== Transaction scope =====

    /// Start the run-wide transaction (auto-commit off)
    fn begin(&self) -> RepositoryResult<()>;

    /// Make every write since `begin` durable
    fn commit(&self) -> RepositoryResult<()>;

    /// Discard every write since `begin`; a no-op outside a transaction
    fn rollback(&self) -> RepositoryResult<()>;

    /// Whether the run-wide transaction is still open
    ///
    /// SQLite may roll back on its own after some statement errors
    /// (disk full, I/O error, out of memory); later writes would then
    /// auto-commit
    fn in_transaction(&self) -> RepositoryResult<bool>;

    // ===== Agency =====

    /// Find an agency whose stored name normalizes to `normalized_name`
    ///
    /// # Returns
    /// - Ok(Some(id)): existing row
    /// - Ok(None): no match
    fn find_agency_id(&self, normalized_name: &str) -> RepositoryResult<Option<EntityId>>;

    /// Insert an agency with its original text and return the generated id
    fn insert_agency(&self, agency: &Agency) -> RepositoryResult<EntityId>;

    // ===== City =====

    /// Find a city by normalized (name, region)
    fn find_city_id(
        &self,
        normalized_name: &str,
        normalized_region: &str,
    ) -> RepositoryResult<Option<EntityId>>;

    /// Insert a city with its original text and return the generated id
    fn insert_city(&self, city: &City) -> RepositoryResult<EntityId>;

    // ===== Trip =====

    /// Insert a resolved trip
    ///
    /// # Returns
    /// - Ok(usize): affected row count
    fn insert_trip(&self, trip: &Trip, batch_id: &str) -> RepositoryResult<usize>;

    // ===== Batch audit =====

    /// Record the import batch row
    fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()>;
}
