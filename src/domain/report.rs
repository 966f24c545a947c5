// ==========================================
// AuditGov - Report read models
// ==========================================
// Plain rows returned by the report repository; formatting is the caller's job

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trip joined with its agency and destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripListing {
    pub process_id: String,
    pub start_date: NaiveDate,
    pub total_value: f64,
    pub agency_name: String,
    pub city_name: String,
    pub region: String,
}

/// Aggregate over all stored trips
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripStatistics {
    pub trip_count: i64,
    pub total_value: f64,
    pub average_value: f64,
    pub min_value: f64,
    pub max_value: f64,
}

/// Agency ranked by summed trip value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencySpending {
    pub agency_name: String,
    pub total_value: f64,
}

/// Destination ranked by trip count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationFrequency {
    pub city_name: String,
    pub region: String,
    pub trip_count: i64,
}
