//! CSV import of temperature records.

use crate::country_cache::CountryCache;
use crate::error::{LoaderError, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use temperature_db::models::parse_decimal;
use temperature_db::{records, DbPool, NewRecord};
use temperature_telemetry::Metrics;
use tracing::{debug, info};

/// Columns of an import file, in order: date, temperature, uncertainty, country.
const COLUMN_COUNT: usize = 4;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Counts gathered over one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub rows_read: u64,
    pub records_inserted: u64,
    pub duplicates_skipped: u64,
    pub countries_created: u64,
}

/// Parse a strict `YYYY-MM-DD` date: four-digit year, no sign.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Loads temperature records from CSV files into the database.
///
/// Every cell is trimmed before use. Each row is an independent insert: a
/// failing row leaves the rows before it stored, and a row whose
/// (date, country) pair is already stored is skipped, so re-running an
/// import is harmless.
pub struct RecordLoader {
    db: DbPool,
    metrics: Metrics,
    countries: CountryCache,
}

impl RecordLoader {
    /// Create a new loader.
    ///
    /// # Arguments
    /// * `db` - Database pool
    /// * `metrics` - Metrics collector
    pub async fn new(db: DbPool, metrics: Metrics) -> Result<Self> {
        let countries = CountryCache::new(&db).await?;
        Ok(Self {
            db,
            metrics,
            countries,
        })
    }

    /// Import every row of the CSV file at `path`.
    ///
    /// Fails with [`LoaderError::FileNotFound`] before reading anything when
    /// the file is missing.
    pub async fn load_file(&mut self, path: &Path) -> Result<LoadSummary> {
        if !path.exists() {
            return Err(LoaderError::FileNotFound(path.to_path_buf()));
        }

        info!("Importing records from {}", path.display());
        let file = std::fs::File::open(path)?;
        self.load_reader(file).await
    }

    /// Import every row from a CSV stream whose first line is a header.
    pub async fn load_reader<R: Read>(&mut self, source: R) -> Result<LoadSummary> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(source);

        let mut summary = LoadSummary::default();
        let mut row = StringRecord::new();
        while reader.read_record(&mut row)? {
            summary.rows_read += 1;
            self.metrics.inc_rows_read();
            self.import_row(&row, &mut summary).await?;
        }

        info!(
            "Imported {} records from {} rows ({} duplicates skipped, {} countries created)",
            summary.records_inserted,
            summary.rows_read,
            summary.duplicates_skipped,
            summary.countries_created
        );
        Ok(summary)
    }

    async fn import_row(&mut self, row: &StringRecord, summary: &mut LoadSummary) -> Result<()> {
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.len() != COLUMN_COUNT {
            return Err(LoaderError::ColumnCount {
                line,
                expected: COLUMN_COUNT,
                found: row.len(),
            });
        }

        let raw_date = row[0].trim();
        let date = parse_date(raw_date).ok_or_else(|| LoaderError::Date {
            line,
            value: raw_date.to_string(),
        })?;
        let row_error = |source| LoaderError::Row { line, source };
        let temperature = parse_decimal(&row[1]).map_err(row_error)?;
        let uncertainty = parse_decimal(&row[2]).map_err(row_error)?;

        let (country_id, created) = self
            .countries
            .resolve(&self.db, row[3].trim())
            .await
            .map_err(row_error)?;
        if created {
            summary.countries_created += 1;
            self.metrics.inc_countries_created();
        }

        let new = NewRecord {
            date,
            temperature,
            uncertainty,
            country_id,
        };
        match records::insert_if_absent(&self.db, new)
            .await
            .map_err(row_error)?
        {
            Some(record) => {
                debug!("Line {}: stored record {}", line, record.id);
                summary.records_inserted += 1;
                self.metrics.inc_records_imported();
            }
            None => {
                debug!("Line {}: record already loaded, skipping", line);
                summary.duplicates_skipped += 1;
                self.metrics.inc_duplicates_skipped();
            }
        }

        Ok(())
    }
}
