// ==========================================
// AuditGov - command line entry point
// ==========================================

use anyhow::{bail, Context};
use audit_gov_import::api::{ImportApi, ImportHandle, ImportOutcome, ImportRequest, ReportApi};
use audit_gov_import::config::get_default_db_path;
use audit_gov_import::{logging, APP_NAME, VERSION};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "audit-gov-import", version, about = "Import government travel expense exports")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import one `;`-separated export file
    Import {
        file: PathBuf,
        /// Database file (default: AUDIT_GOV_DB_PATH or the user data directory)
        #[arg(long)]
        db: Option<String>,
        /// Stop after this many data lines
        #[arg(long)]
        max_rows: Option<usize>,
    },
    /// Create the tables of an empty database
    InitDb {
        #[arg(long)]
        db: Option<String>,
    },
    /// Print aggregate figures of the imported trips
    Report {
        #[arg(long)]
        db: Option<String>,
        #[arg(long, default_value_t = 10)]
        top: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }
    tracing::info!(app = APP_NAME, version = VERSION, "starting");

    match cli.command {
        Command::Import { file, db, max_rows } => {
            let db_path = db.unwrap_or_else(get_default_db_path);
            tracing::info!(db = %db_path, "using database");

            let api = ImportApi::new(db_path);
            let handle = ImportHandle::new();

            let cancel = handle.cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received, cancelling import");
                    cancel.cancel();
                }
            });

            let request = ImportRequest { file_path: file, max_rows };
            match api.import_in_background(request, handle).await {
                ImportOutcome::Completed(report) => {
                    println!("{}", report.summary());
                }
                ImportOutcome::Failed { message } => bail!("import failed: {}", message),
            }
        }
        Command::InitDb { db } => {
            let db_path = db.unwrap_or_else(get_default_db_path);
            ImportApi::new(db_path.clone())
                .init_db()
                .with_context(|| format!("initializing {}", db_path))?;
            println!("database ready: {}", db_path);
        }
        Command::Report { db, top } => {
            let db_path = db.unwrap_or_else(get_default_db_path);
            let api = ReportApi::new(&db_path).context("opening database")?;

            let stats = api.statistics()?;
            println!(
                "trips: {}  total: {:.2}  average: {:.2}  min: {:.2}  max: {:.2}",
                stats.trip_count,
                stats.total_value,
                stats.average_value,
                stats.min_value,
                stats.max_value
            );

            println!("\ntop spending agencies:");
            for row in api.top_spending_agencies(top)? {
                println!("  {:<60} {:>15.2}", row.agency_name, row.total_value);
            }

            println!("\nfrequent destinations:");
            for row in api.frequent_destinations(top)? {
                println!("  {:<40} {:<3} {:>8}", row.city_name, row.region, row.trip_count);
            }
        }
    }

    Ok(())
}
