// ==========================================
// AuditGov - Repository layer
// ==========================================
// Rule: repositories hold no business logic
// Duty: data access behind traits, SQLite details stay here
// Constraint: every statement is parametrized
// ==========================================

pub mod error;
pub mod trip_import_repo;
pub mod trip_import_repo_impl;
pub mod trip_report_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use trip_import_repo::TripImportRepository;
pub use trip_import_repo_impl::TripImportRepositoryImpl;
pub use trip_report_repo::{TripReportRepository, TripReportRepositoryImpl};
