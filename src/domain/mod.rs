// ==========================================
// AuditGov - Domain model layer
// ==========================================
// Entities: Agency / City (deduplicated dimensions), Trip (fact row)
// Rule: no data access, no pipeline logic
// ==========================================

pub mod report;
pub mod trip;
pub mod types;

pub use trip::{
    Agency, City, DataQualityFlags, ImportBatch, ImportReport, RawTripRecord, SkipReason, Trip,
};
pub use report::{AgencySpending, DestinationFrequency, TripListing, TripStatistics};
pub use types::{EntityId, EntityKind, ImportPhase, SkipKind};
