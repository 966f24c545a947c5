// ==========================================
// Trip importer integration tests
// ==========================================
// Goal: whole runs against a real SQLite file
// ==========================================

mod helpers;

use audit_gov_import::config::ImportSettings;
use audit_gov_import::domain::{ImportPhase, SkipKind};
use audit_gov_import::importer::{
    CancellationToken, ImportError, ProgressSink, TripImporter, TripImporterImpl,
};
use audit_gov_import::logging;
use audit_gov_import::repository::{TripImportRepository, TripImportRepositoryImpl};
use audit_gov_import::EntityKind;
use chrono::NaiveDate;
use helpers::failing_repository::{FailingRepository, Faults};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use test_helpers::{
    count_rows, create_test_db, open_test_connection, short_line, trip_line, write_latin1_csv,
};

const NO_AMOUNTS: [&str; 4] = ["0,00", "0,00", "0,00", "0,00"];

fn importer_for(db_path: &str, settings: ImportSettings) -> TripImporterImpl {
    let repo = Arc::new(TripImportRepositoryImpl::new(db_path).unwrap());
    TripImporterImpl::new(repo, settings).unwrap()
}

fn importer_with_faults(db_path: &str, faults: Faults) -> (TripImporterImpl, Arc<FailingRepository>) {
    let inner = TripImportRepositoryImpl::new(db_path).unwrap();
    let repo = Arc::new(FailingRepository::new(inner, faults));
    let importer = TripImporterImpl::new(
        repo.clone() as Arc<dyn TripImportRepository>,
        ImportSettings::default(),
    )
    .unwrap();
    (importer, repo)
}

#[test]
fn test_short_row_skipped_and_agency_variants_collapse() {
    logging::init_test();
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();

    let file = write_latin1_csv(
        dir.path(),
        "trips.csv",
        &[
            trip_line("P1", "Ministério da Saúde", "10/01/2024", "Brasília/DF", ["100,00", "0", "0", "0"]),
            short_line(10),
            trip_line("P3", "  ministério   da saúde ", "11/01/2024", "Recife/PE", ["50,00", "0", "0", "0"]),
        ],
    );

    let importer = importer_for(&db_path, ImportSettings::default());
    let report = importer
        .import_file(&file, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.rows_attempted, 3);
    assert_eq!(report.rows_imported, 2);
    assert_eq!(report.rows_skipped(), 1);
    assert_eq!(report.skipped_for(SkipKind::TooFewColumns), 1);
    assert_eq!(report.agencies_created, 1);
    assert_eq!(report.cities_created, 2);
    assert!(!report.cap_reached);
    assert_eq!(importer.phase(), ImportPhase::Completed);

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_rows(&conn, "viagem"), 2);
    assert_eq!(count_rows(&conn, "orgao"), 1);
    assert_eq!(count_rows(&conn, "cidade"), 2);
    assert_eq!(count_rows(&conn, "import_batch"), 1);

    let agency: String = conn
        .query_row("SELECT nome FROM orgao", [], |r| r.get(0))
        .unwrap();
    assert_eq!(agency, "MINISTERIO DA SAUDE");

    let summary = report.summary();
    assert!(summary.contains("3 rows attempted"));
    assert!(summary.contains("2 trips imported"));
    assert!(summary.contains("1 rows skipped"));
}

#[test]
fn test_regional_amount_total() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_latin1_csv(
        dir.path(),
        "amount.csv",
        &[trip_line("P1", "AGENCIA", "01/02/2024", "Natal/RN", ["1.500,00", "0", "0", "0"])],
    );

    importer_for(&db_path, ImportSettings::default())
        .import_file(&file, &CancellationToken::new())
        .unwrap();

    let conn = open_test_connection(&db_path).unwrap();
    let (total, date): (f64, NaiveDate) = conn
        .query_row("SELECT valor_total, data_inicio FROM viagem", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!(total, 1500.0);
    assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
}

#[test]
fn test_total_subtracts_refund() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_latin1_csv(
        dir.path(),
        "refund.csv",
        &[trip_line("P1", "AGENCIA", "01/02/2024", "Natal/RN", ["1.000,00", "250,50", "100,00", "49,50"])],
    );

    importer_for(&db_path, ImportSettings::default())
        .import_file(&file, &CancellationToken::new())
        .unwrap();

    let conn = open_test_connection(&db_path).unwrap();
    let total: f64 = conn
        .query_row("SELECT valor_total FROM viagem", [], |r| r.get(0))
        .unwrap();
    assert_eq!(total, 1200.0);
}

#[test]
fn test_accented_destination_decoded_and_stripped() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_latin1_csv(
        dir.path(),
        "latin1.csv",
        &[trip_line("P1", "AGENCIA", "01/02/2024", "São Paulo/SP", NO_AMOUNTS)],
    );

    importer_for(&db_path, ImportSettings::default())
        .import_file(&file, &CancellationToken::new())
        .unwrap();

    let conn = open_test_connection(&db_path).unwrap();
    let (city, region): (String, String) = conn
        .query_row("SELECT nome, uf FROM cidade", [], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap();
    assert_eq!(city, "SAO PAULO");
    assert_eq!(region, "SP");
}

#[test]
fn test_commit_failure_leaves_nothing_durable() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_latin1_csv(
        dir.path(),
        "commit.csv",
        &[
            trip_line("P1", "AGENCIA A", "01/02/2024", "Natal/RN", NO_AMOUNTS),
            trip_line("P2", "AGENCIA B", "02/02/2024", "Natal/RN", NO_AMOUNTS),
        ],
    );

    let (importer, repo) = importer_with_faults(
        &db_path,
        Faults {
            fail_commit: true,
            ..Default::default()
        },
    );
    let err = importer
        .import_file(&file, &CancellationToken::new())
        .unwrap_err();

    assert!(matches!(err, ImportError::DatabaseTransactionError(_)));
    assert_eq!(importer.phase(), ImportPhase::Aborted);
    assert_eq!(repo.rollbacks.load(Ordering::SeqCst), 1);

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_rows(&conn, "viagem"), 0);
    assert_eq!(count_rows(&conn, "orgao"), 0);
    assert_eq!(count_rows(&conn, "cidade"), 0);
    assert_eq!(count_rows(&conn, "import_batch"), 0);

    // the next run re-creates the agencies from the store state, not from old ids
    let report = importer_for(&db_path, ImportSettings::default())
        .import_file(&file, &CancellationToken::new())
        .unwrap();
    assert_eq!(report.agencies_created, 2);
    assert_eq!(count_rows(&conn, "orgao"), 2);
}

#[test]
fn test_resolver_failure_aborts_run() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_latin1_csv(
        dir.path(),
        "resolve.csv",
        &[trip_line("P1", "AGENCIA", "01/02/2024", "Natal/RN", NO_AMOUNTS)],
    );

    let (importer, _repo) = importer_with_faults(
        &db_path,
        Faults {
            fail_city_insert: true,
            ..Default::default()
        },
    );
    let err = importer
        .import_file(&file, &CancellationToken::new())
        .unwrap_err();

    assert!(matches!(
        err,
        ImportError::EntityResolutionError { kind: EntityKind::City, row: 2, .. }
    ));

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_rows(&conn, "orgao"), 0);
    assert_eq!(count_rows(&conn, "viagem"), 0);
}

#[test]
fn test_trip_insert_failure_skips_row_only() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_latin1_csv(
        dir.path(),
        "persist.csv",
        &[
            trip_line("P1", "AGENCIA", "01/02/2024", "Natal/RN", NO_AMOUNTS),
            trip_line("P2", "AGENCIA", "02/02/2024", "Natal/RN", NO_AMOUNTS),
            trip_line("P3", "AGENCIA", "03/02/2024", "Natal/RN", NO_AMOUNTS),
        ],
    );

    let (importer, _repo) = importer_with_faults(
        &db_path,
        Faults {
            fail_trip_for_process: Some("P2".to_string()),
            ..Default::default()
        },
    );
    let report = importer
        .import_file(&file, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.rows_imported, 2);
    assert_eq!(report.skipped_for(SkipKind::PersistenceFailed), 1);

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_rows(&conn, "viagem"), 2);
}

#[test]
fn test_lost_transaction_aborts_run() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_latin1_csv(
        dir.path(),
        "disk_full.csv",
        &[
            trip_line("P1", "AGENCIA", "01/02/2024", "Natal/RN", NO_AMOUNTS),
            trip_line("P2", "AGENCIA", "02/02/2024", "Natal/RN", NO_AMOUNTS),
            trip_line("P3", "AGENCIA", "03/02/2024", "Natal/RN", NO_AMOUNTS),
        ],
    );

    let (importer, _repo) = importer_with_faults(
        &db_path,
        Faults {
            drop_transaction_at_process: Some("P2".to_string()),
            ..Default::default()
        },
    );
    let err = importer
        .import_file(&file, &CancellationToken::new())
        .unwrap_err();

    assert!(matches!(err, ImportError::DatabaseTransactionError(_)));
    assert!(err.to_string().contains("row 3"));
    assert_eq!(importer.phase(), ImportPhase::Aborted);

    // P3 must not have been written in auto-commit mode
    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_rows(&conn, "viagem"), 0);
    assert_eq!(count_rows(&conn, "orgao"), 0);
    assert_eq!(count_rows(&conn, "import_batch"), 0);
}

#[test]
fn test_row_cap_stops_reading() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (1..=5)
        .map(|i| trip_line(&format!("P{}", i), "AGENCIA", "01/02/2024", "Natal/RN", NO_AMOUNTS))
        .collect();
    let file = write_latin1_csv(dir.path(), "cap.csv", &lines);

    let report = importer_for(&db_path, ImportSettings::default().with_max_rows(3))
        .import_file(&file, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.rows_attempted, 3);
    assert_eq!(report.rows_imported, 3);
    assert!(report.cap_reached);
    assert!(report.summary().contains("row limit reached"));

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_rows(&conn, "viagem"), 3);
}

#[test]
fn test_cap_equal_to_input_is_not_reached() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (1..=3)
        .map(|i| trip_line(&format!("P{}", i), "AGENCIA", "01/02/2024", "Natal/RN", NO_AMOUNTS))
        .collect();
    let file = write_latin1_csv(dir.path(), "exact.csv", &lines);

    let report = importer_for(&db_path, ImportSettings::default().with_max_rows(3))
        .import_file(&file, &CancellationToken::new())
        .unwrap();
    assert_eq!(report.rows_imported, 3);
    assert!(!report.cap_reached);
}

#[test]
fn test_skipped_rows_do_not_use_up_cap() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_latin1_csv(
        dir.path(),
        "junk_first.csv",
        &[
            short_line(5),
            trip_line("P1", "AGENCIA", "01/02/2024", "Natal/RN", NO_AMOUNTS),
            trip_line("P2", "AGENCIA", "02/02/2024", "Natal/RN", NO_AMOUNTS),
            trip_line("P3", "AGENCIA", "03/02/2024", "Natal/RN", NO_AMOUNTS),
        ],
    );

    let report = importer_for(&db_path, ImportSettings::default().with_max_rows(2))
        .import_file(&file, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.rows_imported, 2);
    assert_eq!(report.rows_attempted, 3);
    assert_eq!(report.skipped_for(SkipKind::TooFewColumns), 1);
    assert!(report.cap_reached);

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_rows(&conn, "viagem"), 2);
}

/// Cancels the run once `after` rows were read
struct CancelAfter {
    token: CancellationToken,
    after: usize,
}

impl ProgressSink for CancelAfter {
    fn on_progress(&self, processed: usize, _imported: usize) {
        if processed >= self.after {
            self.token.cancel();
        }
    }
}

#[test]
fn test_cancellation_rolls_back() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (1..=5)
        .map(|i| trip_line(&format!("P{}", i), &format!("AGENCIA {}", i), "01/02/2024", "Natal/RN", NO_AMOUNTS))
        .collect();
    let file = write_latin1_csv(dir.path(), "cancel.csv", &lines);

    let token = CancellationToken::new();
    let importer = importer_for(&db_path, ImportSettings::default()).with_progress(Arc::new(
        CancelAfter {
            token: token.clone(),
            after: 2,
        },
    ));

    let err = importer.import_file(&file, &token).unwrap_err();
    assert!(matches!(err, ImportError::Cancelled { rows_read: 2 }));
    assert_eq!(importer.phase(), ImportPhase::Aborted);

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_rows(&conn, "viagem"), 0);
    assert_eq!(count_rows(&conn, "orgao"), 0);
}

#[test]
fn test_rerun_reuses_stored_entities() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_latin1_csv(
        dir.path(),
        "rerun.csv",
        &[trip_line("P1", "Agencia X", "01/02/2024", "Natal/RN", NO_AMOUNTS)],
    );

    let first = importer_for(&db_path, ImportSettings::default())
        .import_file(&file, &CancellationToken::new())
        .unwrap();
    let second = importer_for(&db_path, ImportSettings::default())
        .import_file(&file, &CancellationToken::new())
        .unwrap();

    assert_eq!(first.agencies_created, 1);
    assert_eq!(second.agencies_created, 0);
    assert_eq!(second.cities_created, 0);
    assert_ne!(first.batch_id, second.batch_id);

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_rows(&conn, "orgao"), 1);
    assert_eq!(count_rows(&conn, "cidade"), 1);
    assert_eq!(count_rows(&conn, "viagem"), 2);
    assert_eq!(count_rows(&conn, "import_batch"), 2);
}

#[test]
fn test_defaulted_values_flagged() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_latin1_csv(
        dir.path(),
        "flags.csv",
        &[
            trip_line("P1", "AGENCIA", "sem data", "Natal/RN", ["10,00", "x", "0", "0"]),
            trip_line("P2", "AGENCIA", "01/02/2024", "Natal/RN", ["10,00", "", "0", "0"]),
        ],
    );

    let report = importer_for(&db_path, ImportSettings::default())
        .import_file(&file, &CancellationToken::new())
        .unwrap();
    assert_eq!(report.rows_imported, 2);
    assert_eq!(report.rows_flagged, 1);

    let conn = open_test_connection(&db_path).unwrap();
    let (date_flag, amount_flag, total): (i64, i64, f64) = conn
        .query_row(
            "SELECT date_defaulted, amount_defaulted, valor_total FROM viagem WHERE id_processo = 'P1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!((date_flag, amount_flag), (1, 1));
    assert_eq!(total, 10.0);
}

#[test]
fn test_missing_file_is_fatal_before_transaction() {
    let (_db, db_path) = create_test_db().unwrap();
    let importer = importer_for(&db_path, ImportSettings::default());

    let err = importer
        .import_file(std::path::Path::new("/no/such/trips.csv"), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
    assert_eq!(importer.phase(), ImportPhase::Aborted);

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_rows(&conn, "import_batch"), 0);
}

#[test]
fn test_batch_row_records_counts() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_latin1_csv(
        dir.path(),
        "batch.csv",
        &[
            trip_line("P1", "AGENCIA", "01/02/2024", "Natal/RN", NO_AMOUNTS),
            short_line(3),
        ],
    );

    let report = importer_for(&db_path, ImportSettings::default())
        .import_file(&file, &CancellationToken::new())
        .unwrap();

    let conn = open_test_connection(&db_path).unwrap();
    let (batch_id, file_name, attempted, imported, skipped, summary): (
        String,
        String,
        i64,
        i64,
        i64,
        String,
    ) = conn
        .query_row(
            "SELECT batch_id, file_name, rows_attempted, rows_imported, rows_skipped, summary_json FROM import_batch",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
        )
        .unwrap();

    assert_eq!(batch_id, report.batch_id);
    assert_eq!(file_name, "batch.csv");
    assert_eq!((attempted, imported, skipped), (2, 1, 1));

    let json: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(json["rows_imported"], 1);
    assert_eq!(json["skipped"]["TOO_FEW_COLUMNS"], 1);

    let trip_batch: String = conn
        .query_row("SELECT batch_id FROM viagem", [], |r| r.get(0))
        .unwrap();
    assert_eq!(trip_batch, report.batch_id);
}
