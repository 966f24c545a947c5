// ==========================================
// AuditGov - Engine layer
// ==========================================
// Duty: business rules of the import, no SQL
// ==========================================

pub mod entity_resolver;
pub mod resolution_cache;

pub use entity_resolver::{EntityCandidate, EntityResolver};
pub use resolution_cache::{agency_key, city_key, ResolutionCache};
