use temperature_db::DbPool;
use temperature_telemetry::Metrics;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(db: DbPool, metrics: Metrics) -> Self {
        Self { db, metrics }
    }
}
