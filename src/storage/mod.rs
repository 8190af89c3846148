//! Persistence of the star-schema tables.
//!
//! Every table lives in its own file named after [`StarTable::file_stem`] inside an output
//! directory, e.g. `olap_data/fact_sales.parquet` or `csv_data/dim_time.csv`.
//!
//! - Writers take the frames as produced by the generator and emit them unchanged.
//! - Readers validate the file against [`StarTable::schema`] (Parquet footer or CSV header) and
//!   then select and cast the columns to that schema, so both formats load into identical frames.
//! - If a [`StorageObserver`] is configured, every read and write reports success/failure/alerts
//!   to it.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use olap_sample_data::storage::{
//!     StorageOptions, StorageSeverity, TableFormat, TracingObserver, load_star_frames,
//! };
//!
//! # fn main() -> Result<(), olap_sample_data::OlapError> {
//! let opts = StorageOptions {
//!     observer: Some(Arc::new(TracingObserver)),
//!     alert_at_or_above: StorageSeverity::Critical,
//! };
//! let frames = load_star_frames("olap_data", TableFormat::Parquet, &opts)?;
//! println!("facts={}", frames.sales.height());
//! # Ok(())
//! # }
//! ```

pub mod csv;
pub mod observability;
pub mod parquet;

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use polars::prelude::{DataFrame, Expr, IntoLazy, PolarsError, col};
use serde::{Deserialize, Serialize};

use crate::error::{OlapError, OlapResult};
use crate::types::{StarFrames, StarTable, TableSchema};

pub use observability::{
    CompositeObserver, StorageContext, StorageObserver, StorageSeverity, StorageStats,
    TracingObserver,
};

/// Supported table file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableFormat {
    /// Apache Parquet.
    Parquet,
    /// Comma-separated values with a header row.
    Csv,
}

impl TableFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "parquet" | "pq" => Some(Self::Parquet),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Extension used when writing files of this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Direction of a storage operation, reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Write,
    Read,
}

/// Options controlling observer reporting for reads and writes.
///
/// Use [`Default`] for silent operation.
#[derive(Clone)]
pub struct StorageOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn StorageObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: StorageSeverity,
}

impl fmt::Debug for StorageOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: StorageSeverity::Critical,
        }
    }
}

/// Path of `table` inside `dir` for the given format.
pub fn table_path(dir: impl AsRef<Path>, table: StarTable, format: TableFormat) -> PathBuf {
    dir.as_ref()
        .join(format!("{}.{}", table.file_stem(), format.extension()))
}

/// Write a single table.
pub fn write_table(
    df: &mut DataFrame,
    path: impl AsRef<Path>,
    table: StarTable,
    format: TableFormat,
    options: &StorageOptions,
) -> OlapResult<()> {
    let path = path.as_ref();
    let ctx = StorageContext {
        path: path.to_path_buf(),
        table,
        format,
        operation: StorageOperation::Write,
    };

    let result = match format {
        TableFormat::Parquet => parquet::write_parquet(df, path),
        TableFormat::Csv => csv::write_csv(df, path),
    };

    report(options, &ctx, result.as_ref().map(|_| df.height()));
    result
}

/// Write all five tables into `dir`, creating it if needed.
///
/// Returns the written paths in [`StarTable::ALL`] order.
pub fn write_star_frames(
    frames: &mut StarFrames,
    dir: impl AsRef<Path>,
    format: TableFormat,
    options: &StorageOptions,
) -> OlapResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(StarTable::ALL.len());
    for table in StarTable::ALL {
        let path = table_path(dir, table, format);
        write_table(frames.get_mut(table), &path, table, format, options)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Read a single table, inferring the format from the file extension.
pub fn load_table(
    path: impl AsRef<Path>,
    table: StarTable,
    options: &StorageOptions,
) -> OlapResult<DataFrame> {
    let path = path.as_ref();
    let format = infer_format_from_path(path)?;
    load_table_as(path, table, format, options)
}

/// Read a single table in an explicit format.
pub fn load_table_as(
    path: impl AsRef<Path>,
    table: StarTable,
    format: TableFormat,
    options: &StorageOptions,
) -> OlapResult<DataFrame> {
    let path = path.as_ref();
    let ctx = StorageContext {
        path: path.to_path_buf(),
        table,
        format,
        operation: StorageOperation::Read,
    };

    let schema = table.schema();
    let result = match format {
        TableFormat::Parquet => parquet::read_parquet(path, &schema),
        TableFormat::Csv => csv::read_csv(path, &schema),
    };

    report(options, &ctx, result.as_ref().map(DataFrame::height));
    result
}

/// File stems of the tables that have no file in `dir`.
pub fn missing_tables(dir: impl AsRef<Path>, format: TableFormat) -> Vec<String> {
    let dir = dir.as_ref();
    StarTable::ALL
        .iter()
        .filter(|t| !table_path(dir, **t, format).is_file())
        .map(|t| format!("{}.{}", t.file_stem(), format.extension()))
        .collect()
}

/// Load all five tables from `dir`.
///
/// Fails with [`OlapError::MissingData`] before reading anything if any file is absent.
pub fn load_star_frames(
    dir: impl AsRef<Path>,
    format: TableFormat,
    options: &StorageOptions,
) -> OlapResult<StarFrames> {
    let dir = dir.as_ref();
    let missing = missing_tables(dir, format);
    if !missing.is_empty() {
        return Err(OlapError::MissingData {
            dir: dir.to_path_buf(),
            missing,
        });
    }

    let load = |table: StarTable| load_table_as(table_path(dir, table, format), table, format, options);
    Ok(StarFrames {
        time: load(StarTable::Time)?,
        geography: load(StarTable::Geography)?,
        product: load(StarTable::Product)?,
        customer: load(StarTable::Customer)?,
        sales: load(StarTable::Sales)?,
    })
}

/// Select the schema's columns in order and cast each to its logical type.
pub(crate) fn conform_to_schema(df: DataFrame, schema: &TableSchema) -> OlapResult<DataFrame> {
    let exprs: Vec<Expr> = schema
        .fields
        .iter()
        .map(|f| col(f.name.as_str()).cast(f.column_type.to_polars()))
        .collect();
    Ok(df.lazy().select(exprs).collect()?)
}

fn report(options: &StorageOptions, ctx: &StorageContext, result: Result<usize, &OlapError>) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(rows) => obs.on_success(ctx, StorageStats { rows }),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

fn severity_for_error(e: &OlapError) -> StorageSeverity {
    match e {
        OlapError::Io(_) | OlapError::MissingData { .. } => StorageSeverity::Critical,
        OlapError::Parquet(err) => {
            // Parquet wraps I/O failures without a structured kind.
            if error_chain_contains_io(err) {
                StorageSeverity::Critical
            } else {
                StorageSeverity::Error
            }
        }
        OlapError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => StorageSeverity::Critical,
            _ => StorageSeverity::Error,
        },
        OlapError::Polars(PolarsError::IO { .. }) => StorageSeverity::Critical,
        _ => StorageSeverity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

fn infer_format_from_path(path: &Path) -> OlapResult<TableFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| OlapError::SchemaMismatch {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    TableFormat::from_extension(ext).ok_or_else(|| OlapError::SchemaMismatch {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}
