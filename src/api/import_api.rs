// ==========================================
// AuditGov - Import API
// ==========================================
// Duty: open the store, load settings, run one import
// Background runs go through spawn_blocking: the pipeline itself is
// synchronous and holds the connection for the whole transaction
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportSettings};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::ImportReport;
use crate::importer::{
    CancellationToken, CounterProgressSink, FanOutProgressSink, ImportError, ProgressSink,
    TracingProgressSink, TripImporter, TripImporterImpl,
};
use crate::repository::TripImportRepositoryImpl;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// What to import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub file_path: PathBuf,
    /// Overrides the configured row cap for this run
    pub max_rows: Option<usize>,
}

impl ImportRequest {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            max_rows: None,
        }
    }
}

/// Final state of a run as shown to a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportOutcome {
    Completed(ImportReport),
    Failed { message: String },
}

impl ImportOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ImportOutcome::Completed(_))
    }
}

impl From<ApiResult<ImportReport>> for ImportOutcome {
    fn from(result: ApiResult<ImportReport>) -> Self {
        match result {
            Ok(report) => ImportOutcome::Completed(report),
            Err(e) => ImportOutcome::Failed {
                message: e.to_string(),
            },
        }
    }
}

/// Caller side of a run: cancel it, poll its progress
#[derive(Debug, Clone, Default)]
pub struct ImportHandle {
    pub cancel: CancellationToken,
    pub progress: Arc<CounterProgressSink>,
}

impl ImportHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// (rows read, trips imported) so far
    pub fn progress(&self) -> (usize, usize) {
        self.progress.snapshot()
    }
}

// ==========================================
// ImportApi
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Open the store and make sure the tables exist
    fn open_store(&self) -> ApiResult<Arc<Mutex<Connection>>> {
        let conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(Arc::new(Mutex::new(conn)))
    }

    /// Settings from config_kv, with the request's overrides applied
    fn load_settings(
        &self,
        conn: &Arc<Mutex<Connection>>,
        request: &ImportRequest,
    ) -> ApiResult<ImportSettings> {
        let config = ConfigManager::from_connection(Arc::clone(conn))?;
        let mut settings = ImportSettings::load(&config)?;
        if let Some(max_rows) = request.max_rows {
            settings = settings.with_max_rows(max_rows);
        }
        Ok(settings)
    }

    /// Checks that need neither the store nor the file contents
    fn validate_request(request: &ImportRequest) -> ApiResult<()> {
        if request.max_rows == Some(0) {
            return Err(ApiError::InvalidInput("max_rows must be greater than zero".to_string()));
        }
        if !request.file_path.is_file() {
            return Err(ImportError::FileNotFound(request.file_path.display().to_string()).into());
        }
        Ok(())
    }

    /// Run one import on the calling thread
    ///
    /// A missing input file is reported before the store is opened, so a
    /// mistyped path never creates an empty database
    pub fn run_import(&self, request: &ImportRequest, handle: &ImportHandle) -> ApiResult<ImportReport> {
        Self::validate_request(request)?;
        let conn = self.open_store()?;
        let settings = self.load_settings(&conn, request)?;

        let tracing_sink: Arc<dyn ProgressSink> =
            Arc::new(TracingProgressSink::new(settings.progress_interval));
        let counter_sink: Arc<dyn ProgressSink> = handle.progress.clone();
        let progress: Arc<dyn ProgressSink> =
            Arc::new(FanOutProgressSink::new(vec![tracing_sink, counter_sink]));

        let repo = Arc::new(TripImportRepositoryImpl::from_connection(conn));
        let importer = TripImporterImpl::new(repo, settings)?.with_progress(progress);

        let report = importer.import_file(&request.file_path, &handle.cancel)?;
        Ok(report)
    }

    /// Run one import on the blocking pool; the caller keeps a clone of
    /// `handle` to cancel or poll progress
    pub async fn import_in_background(
        &self,
        request: ImportRequest,
        handle: ImportHandle,
    ) -> ImportOutcome {
        let api = self.clone();
        let result = tokio::task::spawn_blocking(move || api.run_import(&request, &handle))
            .await
            .map_err(|e| ApiError::BackgroundTaskError(e.to_string()))
            .and_then(|result| result);

        if let Err(e) = &result {
            tracing::error!(error = %e, "background import failed");
        }
        ImportOutcome::from(result)
    }

    /// Create the tables of an empty store
    pub fn init_db(&self) -> ApiResult<()> {
        self.open_store().map(|_| ())
    }
}
