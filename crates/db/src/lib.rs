//! Database layer for temperature records.
//!
//! Provides SQLite storage for countries and their daily temperature
//! records, with embedded schema migrations.

pub mod countries;
pub mod error;
pub mod models;
pub mod pagination;
pub mod pool;
pub mod records;

pub use error::DbError;
pub use models::{Country, NewRecord, Record, RecordRow};
pub use pagination::{Page, PageNumber};
pub use pool::DbPool;
pub use records::RecordFilter;
