// ==========================================
// AuditGov - Report API
// ==========================================
// Read-only views over imported trips; formatting stays with the caller
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::{AgencySpending, DestinationFrequency, TripListing, TripStatistics};
use crate::repository::{TripReportRepository, TripReportRepositoryImpl};
use std::sync::{Arc, Mutex};

/// Largest page / top-N a caller may ask for
pub const MAX_PAGE_SIZE: i64 = 1_000;

pub struct ReportApi {
    repo: TripReportRepositoryImpl,
}

impl ReportApi {
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Ok(Self {
            repo: TripReportRepositoryImpl::new(Arc::new(Mutex::new(conn))),
        })
    }

    fn check_limit(limit: i64) -> ApiResult<i64> {
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(ApiError::InvalidInput(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, limit
            )));
        }
        Ok(limit)
    }

    pub fn statistics(&self) -> ApiResult<TripStatistics> {
        Ok(self.repo.trip_statistics()?)
    }

    pub fn count_trips(&self) -> ApiResult<i64> {
        Ok(self.repo.count_trips()?)
    }

    pub fn list_trips(&self, limit: i64, offset: i64) -> ApiResult<Vec<TripListing>> {
        let limit = Self::check_limit(limit)?;
        Ok(self.repo.list_trips(limit, offset.max(0))?)
    }

    pub fn top_spending_agencies(&self, limit: i64) -> ApiResult<Vec<AgencySpending>> {
        Ok(self.repo.top_spending_agencies(Self::check_limit(limit)?)?)
    }

    pub fn frequent_destinations(&self, limit: i64) -> ApiResult<Vec<DestinationFrequency>> {
        Ok(self.repo.frequent_destinations(Self::check_limit(limit)?)?)
    }

    pub fn cities_by_region(&self) -> ApiResult<Vec<DestinationFrequency>> {
        Ok(self.repo.cities_by_region()?)
    }
}
