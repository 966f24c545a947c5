// ==========================================
// AuditGov - Core library
// ==========================================
// Government travel expense ingestion:
// delimited disclosure export -> normalized SQLite store
// Stack: Rust + rusqlite + tracing
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - entity resolution rules
pub mod engine;

// Import layer - external data
pub mod importer;

// Config layer - import settings
pub mod config;

// Database infrastructure (connection setup / schema)
pub mod db;

// Logging
pub mod logging;

// API layer - entry points
pub mod api;

// ==========================================
// Re-exports
// ==========================================

pub use domain::types::{EntityId, EntityKind, ImportPhase, SkipKind};

pub use domain::{Agency, City, DataQualityFlags, ImportReport, SkipReason, Trip};

pub use engine::EntityResolver;

pub use importer::{ImportError, TripImporter, TripImporterImpl};

pub use api::{ImportApi, ImportOutcome, ReportApi};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "AuditGov";
