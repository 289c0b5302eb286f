use std::path::PathBuf;
use temperature_db::DbError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoaderError>;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("CSV file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: invalid date {value:?}, expected YYYY-MM-DD")]
    Date { line: u64, value: String },

    #[error("Line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: DbError,
    },

    #[error(transparent)]
    Db(#[from] DbError),
}
