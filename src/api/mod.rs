// ==========================================
// AuditGov - API layer
// ==========================================
// Duty: entry points for the CLI or any other front end
// ==========================================

pub mod error;
pub mod import_api;
pub mod report_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportHandle, ImportOutcome, ImportRequest};
pub use report_api::ReportApi;
