//! Fixed run parameters.
//!
//! The generator and analyzer have no configuration files and read no environment variables
//! (other than `RUST_LOG` for logging). Every constant lives here and is gathered into
//! [`GeneratorConfig`] / [`AnalyzerConfig`], whose [`Default`] impls reproduce the canonical run.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{OlapError, OlapResult};
use crate::storage::TableFormat;

/// Seed used for every randomized table.
pub const DEFAULT_SEED: u64 = 42;
/// Number of rows in the customer dimension.
pub const DEFAULT_CUSTOMER_COUNT: usize = 1_000;
/// Number of rows in the sales fact table.
pub const DEFAULT_SALES_RECORDS: usize = 1_000_000;
/// Directory for the columnar copy of the tables.
pub const DEFAULT_PARQUET_DIR: &str = "olap_data";
/// Directory for the delimited-text copy of the tables.
pub const DEFAULT_CSV_DIR: &str = "csv_data";
/// Customers register on a uniformly drawn day in `[start, start + window]`.
pub const REGISTRATION_WINDOW_DAYS: i64 = 1_825;

pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

pub fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default()
}

pub fn registration_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default()
}

/// Parameters of a generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Seed for the product, customer and sales random streams.
    pub seed: u64,
    /// First day of the time dimension (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the time dimension (inclusive).
    pub end_date: NaiveDate,
    /// Rows in the customer dimension.
    pub customer_count: usize,
    /// Rows in the sales fact table.
    pub sales_records: usize,
    /// Output directory for Parquet files.
    pub parquet_dir: PathBuf,
    /// Output directory for CSV files.
    pub csv_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            start_date: default_start_date(),
            end_date: default_end_date(),
            customer_count: DEFAULT_CUSTOMER_COUNT,
            sales_records: DEFAULT_SALES_RECORDS,
            parquet_dir: PathBuf::from(DEFAULT_PARQUET_DIR),
            csv_dir: PathBuf::from(DEFAULT_CSV_DIR),
        }
    }
}

impl GeneratorConfig {
    /// Reject configurations that cannot produce a well-formed star schema.
    pub fn validate(&self) -> OlapResult<()> {
        if self.start_date > self.end_date {
            return Err(OlapError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.customer_count == 0 {
            return Err(OlapError::InvalidConfig(
                "customer_count must be > 0".to_string(),
            ));
        }
        if self.parquet_dir == self.csv_dir {
            return Err(OlapError::InvalidConfig(format!(
                "parquet and csv output directories must differ ({})",
                self.parquet_dir.display()
            )));
        }
        Ok(())
    }
}

/// Which analyzer backend executes the query catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// Polars lazy relational algebra.
    Lazy,
    /// Polars SQL over registered tables.
    Sql,
}

/// Parameters of an analyzer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Directory holding the five table files.
    pub data_dir: PathBuf,
    /// File format of the tables in `data_dir`.
    pub format: TableFormat,
    /// Backend used to run the queries.
    pub backend: BackendKind,
    /// Row limit for the "top N" queries.
    pub top_n: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_PARQUET_DIR),
            format: TableFormat::Parquet,
            backend: BackendKind::Lazy,
            top_n: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_canonical_run() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.customer_count, 1_000);
        assert_eq!(cfg.sales_records, 1_000_000);
        assert_eq!(cfg.start_date.to_string(), "2020-01-01");
        assert_eq!(cfg.end_date.to_string(), "2024-12-31");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let cfg = GeneratorConfig {
            start_date: default_end_date(),
            end_date: default_start_date(),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(OlapError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn validate_rejects_shared_output_dir() {
        let cfg = GeneratorConfig {
            csv_dir: PathBuf::from(DEFAULT_PARQUET_DIR),
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }
}
