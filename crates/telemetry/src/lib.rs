//! Observability for the temperature records service.

pub mod logging;
pub mod metrics;
pub mod report;

pub use logging::init_logging;
pub use metrics::Metrics;
