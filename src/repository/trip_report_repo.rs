// ==========================================
// AuditGov - Trip report repository
// ==========================================
// Read-only aggregate queries over imported trips
// Rule: rows only, no formatting
// ==========================================

use crate::domain::{AgencySpending, DestinationFrequency, TripListing, TripStatistics};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// TripReportRepository Trait
// ==========================================
pub trait TripReportRepository: Send + Sync {
    /// Number of stored trips
    fn count_trips(&self) -> RepositoryResult<i64>;

    /// Page of trips, most recent start date first
    fn list_trips(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<TripListing>>;

    /// Count / sum / average / min / max of trip values
    fn trip_statistics(&self) -> RepositoryResult<TripStatistics>;

    /// Agencies with the highest summed trip value
    fn top_spending_agencies(&self, limit: i64) -> RepositoryResult<Vec<AgencySpending>>;

    /// Destinations with the most trips; same name in another region counts apart
    fn frequent_destinations(&self, limit: i64) -> RepositoryResult<Vec<DestinationFrequency>>;

    /// Every visited city grouped by region, busiest first within a region
    fn cities_by_region(&self) -> RepositoryResult<Vec<DestinationFrequency>>;
}

pub struct TripReportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl TripReportRepositoryImpl {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl TripReportRepository for TripReportRepositoryImpl {
    fn count_trips(&self) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM viagem", [], |row| row.get(0))?;
        Ok(count)
    }

    fn list_trips(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<TripListing>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT v.id_processo, v.data_inicio, v.valor_total, o.nome, c.nome, c.uf
            FROM viagem v
            JOIN orgao o ON o.id = v.id_orgao
            JOIN cidade c ON c.id = v.id_cidade
            ORDER BY v.data_inicio DESC, v.id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )?;

        let trips = stmt
            .query_map(params![limit, offset], |row| {
                Ok(TripListing {
                    process_id: row.get(0)?,
                    start_date: row.get(1)?,
                    total_value: row.get(2)?,
                    agency_name: row.get(3)?,
                    city_name: row.get(4)?,
                    region: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(trips)
    }

    fn trip_statistics(&self) -> RepositoryResult<TripStatistics> {
        let conn = self.lock()?;
        let stats = conn.query_row(
            r#"
            SELECT COUNT(*), SUM(valor_total), AVG(valor_total),
                   MIN(valor_total), MAX(valor_total)
            FROM viagem
            "#,
            [],
            |row| {
                Ok(TripStatistics {
                    trip_count: row.get(0)?,
                    total_value: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
                    average_value: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                    min_value: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
                    max_value: row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
                })
            },
        )?;
        Ok(stats)
    }

    fn top_spending_agencies(&self, limit: i64) -> RepositoryResult<Vec<AgencySpending>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT o.nome, SUM(v.valor_total) AS total
            FROM viagem v
            JOIN orgao o ON o.id = v.id_orgao
            GROUP BY o.id, o.nome
            ORDER BY total DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(AgencySpending {
                    agency_name: row.get(0)?,
                    total_value: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn frequent_destinations(&self, limit: i64) -> RepositoryResult<Vec<DestinationFrequency>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT normalize_key(c.nome) AS city_key, normalize_key(c.uf) AS region_key, COUNT(*) AS total
            FROM viagem v
            JOIN cidade c ON c.id = v.id_cidade
            GROUP BY city_key, region_key
            ORDER BY total DESC, city_key ASC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt
            .query_map(params![limit], map_destination)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn cities_by_region(&self) -> RepositoryResult<Vec<DestinationFrequency>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT normalize_key(c.nome) AS city_key, normalize_key(c.uf) AS region_key, COUNT(*) AS total
            FROM viagem v
            JOIN cidade c ON c.id = v.id_cidade
            GROUP BY city_key, region_key
            ORDER BY region_key ASC, total DESC
            "#,
        )?;

        let rows = stmt
            .query_map([], map_destination)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn map_destination(row: &rusqlite::Row<'_>) -> rusqlite::Result<DestinationFrequency> {
    Ok(DestinationFrequency {
        city_name: row.get(0)?,
        region: row.get(1)?,
        trip_count: row.get(2)?,
    })
}
