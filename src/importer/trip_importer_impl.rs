// ==========================================
// AuditGov - Trip importer (orchestrator)
// ==========================================
// Idle -> Reading -> (Parsing -> Resolving -> Persisting)* -> Committing
//      -> Completed | Aborted
// - file problems abort before any transaction work
// - one transaction per run, one commit at the end
// - row shape / trip insert problems skip the row
// - resolver, batch row and commit failures roll the whole run back
// ==========================================

use crate::config::ImportSettings;
use crate::domain::{ImportBatch, ImportPhase, ImportReport, SkipReason};
use crate::domain::types::EntityKind;
use crate::engine::EntityResolver;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::TrailingFieldMapper;
use crate::importer::file_parser::{DelimitedFileParser, SourceRow};
use crate::importer::row_assembler::RowAssembler;
use crate::importer::row_outcome::RowOutcome;
use crate::importer::run_control::{CancellationToken, ProgressSink, TracingProgressSink};
use crate::importer::trip_importer_trait::{FieldMapper, FileParser, TripImporter};
use crate::repository::{RepositoryError, TripImportRepository};
use chrono::Utc;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// TripImporterImpl
// ==========================================
pub struct TripImporterImpl {
    repo: Arc<dyn TripImportRepository>,
    parser: Box<dyn FileParser>,
    mapper: Box<dyn FieldMapper>,
    assembler: RowAssembler,
    settings: ImportSettings,
    progress: Arc<dyn ProgressSink>,
    phase: Mutex<ImportPhase>,
}

/// Mutable state of one run
struct RunState {
    batch_id: String,
    report: ImportReport,
    resolver: EntityResolver,
}

impl TripImporterImpl {
    /// Build the default pipeline from settings
    ///
    /// # Errors
    /// - UnsupportedEncoding when the configured encoding label is unknown
    pub fn new(repo: Arc<dyn TripImportRepository>, settings: ImportSettings) -> ImportResult<Self> {
        let parser = DelimitedFileParser::new(&settings.input_encoding, settings.delimiter)?;
        let mapper = TrailingFieldMapper::new(settings.columns, settings.min_columns);
        let progress = Arc::new(TracingProgressSink::new(settings.progress_interval));

        Ok(Self {
            repo,
            parser: Box::new(parser),
            mapper: Box::new(mapper),
            assembler: RowAssembler::from_settings(&settings),
            settings,
            progress,
            phase: Mutex::new(ImportPhase::Idle),
        })
    }

    /// Replace the progress sink
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    fn set_phase(&self, next: ImportPhase) {
        if let Ok(mut phase) = self.phase.lock() {
            if *phase != next {
                match next {
                    ImportPhase::Parsing | ImportPhase::Resolving | ImportPhase::Persisting => {
                        tracing::trace!(from = %*phase, to = %next, "phase");
                    }
                    _ => debug!(from = %*phase, to = %next, "import phase changed"),
                }
                *phase = next;
            }
        }
    }

    // ==========================================
    // Per-row pipeline
    // ==========================================
    fn process_row(&self, row: &SourceRow, state: &mut RunState) -> RowOutcome {
        self.set_phase(ImportPhase::Parsing);
        let raw = match self.mapper.map_row(&row.cells, row.line) {
            Ok(raw) => raw,
            Err(reason) => return RowOutcome::Skipped(reason),
        };
        let trip = self.assembler.prepare(&raw);

        self.set_phase(ImportPhase::Resolving);
        let trip = match self.assembler.resolve(trip, &mut state.resolver) {
            Ok(trip) => trip,
            Err(e) => return RowOutcome::Fatal(e),
        };

        self.set_phase(ImportPhase::Persisting);
        match self.repo.insert_trip(&trip, &state.batch_id) {
            Ok(0) => RowOutcome::Skipped(SkipReason::PersistenceFailed {
                message: "no row inserted".to_string(),
            }),
            Ok(_) => RowOutcome::Imported(trip),
            Err(e) => match self.repo.in_transaction() {
                Ok(true) => RowOutcome::Skipped(SkipReason::PersistenceFailed {
                    message: e.to_string(),
                }),
                // the store dropped the transaction; later writes would auto-commit
                Ok(false) => RowOutcome::Fatal(ImportError::DatabaseTransactionError(format!(
                    "transaction lost at row {}: {}",
                    row.line, e
                ))),
                Err(state_err) => RowOutcome::Fatal(state_err.into()),
            },
        }
    }

    /// Drive every row; Err means the run must roll back
    fn process_rows(
        &self,
        rows: impl Iterator<Item = ImportResult<SourceRow>>,
        state: &mut RunState,
        cancel: &CancellationToken,
    ) -> ImportResult<()> {
        for row in rows {
            if cancel.is_cancelled() {
                return Err(ImportError::Cancelled {
                    rows_read: state.report.rows_attempted,
                });
            }

            // Cap counts stored trips; skipped lines do not use it up
            if state.report.rows_imported >= self.settings.max_rows {
                state.report.cap_reached = true;
                warn!(max_rows = self.settings.max_rows, "row limit reached, stopping read");
                break;
            }

            let row = row?;
            state.report.rows_attempted += 1;

            match self.process_row(&row, state) {
                RowOutcome::Imported(trip) => {
                    state.report.rows_imported += 1;
                    if trip.quality.any() {
                        state.report.rows_flagged += 1;
                    }
                }
                RowOutcome::Skipped(reason) => {
                    match &reason {
                        SkipReason::TooFewColumns { .. } => {
                            debug!(row = row.line, reason = %reason, "row skipped")
                        }
                        SkipReason::PersistenceFailed { .. } => {
                            warn!(row = row.line, reason = %reason, "row skipped")
                        }
                    }
                    state.report.record_skip(reason.kind());
                }
                RowOutcome::Fatal(e) => return Err(e),
            }

            self.progress
                .on_progress(state.report.rows_attempted, state.report.rows_imported);
        }
        Ok(())
    }

    /// Batch audit row + commit
    fn finish(&self, file_path: &Path, state: &mut RunState, started: Instant) -> ImportResult<()> {
        self.set_phase(ImportPhase::Committing);

        state.report.agencies_created = state.resolver.created(EntityKind::Agency);
        state.report.cities_created = state.resolver.created(EntityKind::City);
        state.report.elapsed_ms = started.elapsed().as_millis() as u64;

        let summary_json = serde_json::to_string(&state.report)
            .map_err(|e| ImportError::InternalError(format!("summary serialization: {}", e)))?;

        let batch = ImportBatch {
            batch_id: state.batch_id.clone(),
            file_name: state.report.file_name.clone(),
            file_path: Some(file_path.display().to_string()),
            rows_attempted: state.report.rows_attempted as i64,
            rows_imported: state.report.rows_imported as i64,
            rows_skipped: state.report.rows_skipped() as i64,
            rows_flagged: state.report.rows_flagged as i64,
            imported_at: Utc::now(),
            elapsed_ms: state.report.elapsed_ms as i64,
            summary_json: Some(summary_json),
        };
        self.repo.insert_batch(&batch)?;

        self.repo.commit().map_err(|e| match e {
            RepositoryError::DatabaseTransactionError(msg) => {
                ImportError::DatabaseTransactionError(msg)
            }
            other => ImportError::DatabaseTransactionError(other.to_string()),
        })
    }

    fn abort(&self, err: ImportError) -> ImportError {
        if let Err(rollback_err) = self.repo.rollback() {
            error!(error = %rollback_err, "rollback failed");
        }
        self.set_phase(ImportPhase::Aborted);
        if err.is_cancelled() {
            warn!(error = %err, "import cancelled, transaction rolled back");
        } else {
            error!(error = %err, "import aborted, transaction rolled back");
        }
        err
    }
}

impl TripImporter for TripImporterImpl {
    #[instrument(skip(self, file_path, cancel), fields(file = %file_path.display()))]
    fn import_file(
        &self,
        file_path: &Path,
        cancel: &CancellationToken,
    ) -> ImportResult<ImportReport> {
        let started = Instant::now();
        self.set_phase(ImportPhase::Reading);

        let rows = match self.parser.open_rows(file_path) {
            Ok(rows) => rows,
            Err(e) => {
                self.set_phase(ImportPhase::Aborted);
                error!(error = %e, "input file unusable, nothing imported");
                return Err(e);
            }
        };

        if let Err(e) = self.repo.begin() {
            self.set_phase(ImportPhase::Aborted);
            return Err(e.into());
        }

        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, "import started");

        let mut state = RunState {
            batch_id,
            report: ImportReport {
                file_name: file_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string()),
                ..Default::default()
            },
            resolver: EntityResolver::new(Arc::clone(&self.repo)),
        };
        state.report.batch_id = state.batch_id.clone();

        if let Err(e) = self.process_rows(rows, &mut state, cancel) {
            return Err(self.abort(e));
        }

        if let Err(e) = self.finish(file_path, &mut state, started) {
            return Err(self.abort(e));
        }

        self.set_phase(ImportPhase::Completed);
        self.progress
            .on_progress(state.report.rows_attempted, state.report.rows_imported);
        info!(batch_id = %state.batch_id, summary = %state.report.summary(), "import committed");

        Ok(state.report)
    }

    fn phase(&self) -> ImportPhase {
        self.phase
            .lock()
            .map(|phase| *phase)
            .unwrap_or(ImportPhase::Aborted)
    }
}
