use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Convenience result type used across generation, storage and analysis.
pub type OlapResult<T> = Result<T, OlapError>;

/// Error type returned by the generator, the storage layer and the analyzer backends.
#[derive(Debug, Error)]
pub enum OlapError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by Polars (DataFrame construction, lazy execution, SQL, readers/writers).
    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Parquet footer inspection error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// CSV header inspection error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Generation report serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored table does not conform to its expected schema.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// One or more of the five star-schema files is absent.
    #[error("OLAP data files not found in {}: {}", dir.display(), missing.join(", "))]
    MissingData { dir: PathBuf, missing: Vec<String> },

    /// The time dimension was asked for an empty or inverted date range.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// The fact generator cannot sample foreign keys from an empty dimension.
    #[error("cannot generate facts: dimension '{table}' has no rows")]
    EmptyDimension { table: String },

    /// Invalid generator/analyzer configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The tracing subscriber could not be installed.
    #[error("logging error: {0}")]
    Logging(String),
}

impl OlapError {
    /// Returns `true` for the "run the generator first" failure mode.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, Self::MissingData { .. })
    }
}
