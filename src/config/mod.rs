// ==========================================
// AuditGov - Config layer
// ==========================================
// Duty: import settings, overridable per store
// Storage: config_kv table
// ==========================================

pub mod config_manager;
pub mod db_path;
pub mod import_config_trait;
pub mod import_settings;

pub use config_manager::{config_keys, ConfigManager};
pub use db_path::{get_default_db_path, DB_PATH_ENV};
pub use import_config_trait::{ColumnPositions, ImportConfigReader};
pub use import_settings::ImportSettings;
