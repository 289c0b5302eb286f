//! CSV import of temperature records.

pub mod country_cache;
pub mod csv_loader;
pub mod error;

pub use country_cache::CountryCache;
pub use csv_loader::{LoadSummary, RecordLoader};
pub use error::LoaderError;
