// ==========================================
// Failing repository - fault injection for integration tests
// ==========================================
// Delegates to the real SQLite repository, failing on demand
// ==========================================

use audit_gov_import::domain::{Agency, City, EntityId, ImportBatch, Trip};
use audit_gov_import::repository::{
    RepositoryError, RepositoryResult, TripImportRepository, TripImportRepositoryImpl,
};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct Faults {
    pub fail_commit: bool,
    pub fail_city_insert: bool,
    pub fail_trip_for_process: Option<String>,
    /// Fail this trip insert the way SQLite does on a full disk:
    /// the transaction is rolled back by the store itself
    pub drop_transaction_at_process: Option<String>,
}

pub struct FailingRepository {
    inner: TripImportRepositoryImpl,
    faults: Faults,
    pub rollbacks: AtomicUsize,
}

impl FailingRepository {
    pub fn new(inner: TripImportRepositoryImpl, faults: Faults) -> Self {
        Self {
            inner,
            faults,
            rollbacks: AtomicUsize::new(0),
        }
    }
}

impl TripImportRepository for FailingRepository {
    fn begin(&self) -> RepositoryResult<()> {
        self.inner.begin()
    }

    fn commit(&self) -> RepositoryResult<()> {
        if self.faults.fail_commit {
            return Err(RepositoryError::DatabaseTransactionError(
                "disk I/O error".to_string(),
            ));
        }
        self.inner.commit()
    }

    fn rollback(&self) -> RepositoryResult<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.inner.rollback()
    }

    fn in_transaction(&self) -> RepositoryResult<bool> {
        self.inner.in_transaction()
    }

    fn find_agency_id(&self, normalized_name: &str) -> RepositoryResult<Option<EntityId>> {
        self.inner.find_agency_id(normalized_name)
    }

    fn insert_agency(&self, agency: &Agency) -> RepositoryResult<EntityId> {
        self.inner.insert_agency(agency)
    }

    fn find_city_id(
        &self,
        normalized_name: &str,
        normalized_region: &str,
    ) -> RepositoryResult<Option<EntityId>> {
        self.inner.find_city_id(normalized_name, normalized_region)
    }

    fn insert_city(&self, city: &City) -> RepositoryResult<EntityId> {
        if self.faults.fail_city_insert {
            return Err(RepositoryError::DatabaseQueryError(
                "database table is locked".to_string(),
            ));
        }
        self.inner.insert_city(city)
    }

    fn insert_trip(&self, trip: &Trip, batch_id: &str) -> RepositoryResult<usize> {
        if self.faults.fail_trip_for_process.as_deref() == Some(trip.process_id.as_str()) {
            return Err(RepositoryError::DatabaseQueryError(
                "value too large".to_string(),
            ));
        }
        if self.faults.drop_transaction_at_process.as_deref() == Some(trip.process_id.as_str()) {
            self.inner.rollback()?;
            return Err(RepositoryError::DatabaseQueryError(
                "database or disk is full".to_string(),
            ));
        }
        self.inner.insert_trip(trip, batch_id)
    }

    fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        self.inner.insert_batch(batch)
    }
}
