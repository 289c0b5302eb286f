//! Prometheus metrics for the temperature records service.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Metrics collector for imports and page views.
///
/// Each instance owns its registry, so several collectors can coexist in
/// one process.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    rows_read: IntCounter,
    records_imported: IntCounter,
    duplicates_skipped: IntCounter,
    countries_created: IntCounter,
    pages_served: IntCounterVec,
}

impl Metrics {
    /// Create a new metrics instance.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let rows_read = IntCounter::new(
            "temperature_csv_rows_read_total",
            "Total number of CSV rows read by the loader",
        )?;
        let records_imported = IntCounter::new(
            "temperature_records_imported_total",
            "Total number of records inserted by the loader",
        )?;
        let duplicates_skipped = IntCounter::new(
            "temperature_duplicates_skipped_total",
            "Total number of rows skipped because the record already existed",
        )?;
        let countries_created = IntCounter::new(
            "temperature_countries_created_total",
            "Total number of countries created on first reference",
        )?;
        let pages_served = IntCounterVec::new(
            Opts::new("temperature_pages_served_total", "Total number of pages served"),
            &["view"],
        )?;

        registry.register(Box::new(rows_read.clone()))?;
        registry.register(Box::new(records_imported.clone()))?;
        registry.register(Box::new(duplicates_skipped.clone()))?;
        registry.register(Box::new(countries_created.clone()))?;
        registry.register(Box::new(pages_served.clone()))?;

        Ok(Self {
            registry,
            rows_read,
            records_imported,
            duplicates_skipped,
            countries_created,
            pages_served,
        })
    }

    pub fn inc_rows_read(&self) {
        self.rows_read.inc();
    }

    pub fn inc_records_imported(&self) {
        self.records_imported.inc();
    }

    pub fn inc_duplicates_skipped(&self) {
        self.duplicates_skipped.inc();
    }

    pub fn inc_countries_created(&self) {
        self.countries_created.inc();
    }

    /// Count one page served by the named view.
    pub fn inc_pages_served(&self, view: &str) {
        self.pages_served.with_label_values(&[view]).inc();
    }

    /// Get Prometheus metrics as a string.
    pub fn gather(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
