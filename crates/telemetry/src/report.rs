//! Import reports appended after each CSV load.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Summary of one import run, written as a JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport<T: Serialize> {
    pub source: String,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: T,
}

impl<T: Serialize> ImportReport<T> {
    pub fn new(source: impl Into<String>, summary: T) -> Self {
        Self {
            source: source.into(),
            finished_at: Utc::now(),
            summary,
        }
    }
}

/// Append a report to the given file, one JSON document per line.
///
/// Does nothing when `path` is `None`.
pub fn write_report<P: AsRef<Path>, T: Serialize>(
    path: Option<P>,
    report: &ImportReport<T>,
) -> anyhow::Result<()> {
    if let Some(report_path) = path {
        let json = serde_json::to_string(report)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)?;
        writeln!(file, "{}", json)?;
        info!("Wrote import report to {:?}", report_path.as_ref());
    }
    Ok(())
}
