//! Subcommand bodies, kept apart from argument parsing so they can be tested.

use std::io::Write;
use std::path::{Path, PathBuf};
use temperature_db::DbPool;
use temperature_loader::{LoadSummary, LoaderError, RecordLoader};
use temperature_telemetry::report::{write_report, ImportReport};
use temperature_telemetry::Metrics;
use tracing::{info, warn};

/// Open the database at `db_path`, creating and migrating it as needed.
pub async fn open_database(db_path: &str) -> anyhow::Result<DbPool> {
    let db = DbPool::new(db_path).await?;
    db.migrate().await?;
    Ok(db)
}

/// Import a CSV file, writing the user-facing progress messages to `out`.
///
/// The file is checked before the database is opened, so a missing file
/// leaves no database behind.
pub async fn load_records<W: Write>(
    csv_file: &Path,
    db_path: &str,
    report_path: Option<PathBuf>,
    out: &mut W,
) -> anyhow::Result<LoadSummary> {
    writeln!(out, "Will import dataset from file: {}", csv_file.display())?;

    if !csv_file.exists() {
        return Err(LoaderError::FileNotFound(csv_file.to_path_buf()).into());
    }

    let db = open_database(db_path).await?;
    let mut loader = RecordLoader::new(db, Metrics::new()?).await?;
    let summary = loader.load_file(csv_file).await?;

    let report = ImportReport::new(csv_file.display().to_string(), summary);
    if let Err(e) = write_report(report_path.as_ref(), &report) {
        warn!("Failed to write import report: {}", e);
    }

    info!(
        inserted = summary.records_inserted,
        skipped = summary.duplicates_skipped,
        "Import finished"
    );
    writeln!(out, "Temperature dataset has been successfully imported")?;
    Ok(summary)
}
