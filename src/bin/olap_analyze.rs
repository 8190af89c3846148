//! Run the OLAP report over tables written by `olap_generate`.
//!
//! ## Usage
//!
//! ```bash
//! # Polars lazy backend over olap_data/*.parquet
//! olap_analyze
//!
//! # SQL backend over the CSV copy
//! olap_analyze --backend sql --format csv --data-dir csv_data
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use olap_sample_data::analysis::{LazyBackend, QueryBackend, build_report};
use olap_sample_data::config::{AnalyzerConfig, BackendKind, DEFAULT_PARQUET_DIR};
use olap_sample_data::logging::init_tracing;
use olap_sample_data::storage::{
    StorageOptions, StorageSeverity, TableFormat, TracingObserver, load_star_frames,
};
use olap_sample_data::OlapResult;

const MISSING_DATA_MESSAGE: &str =
    "Error: OLAP data files not found. Please run olap_generate first.";

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    /// Polars lazy plans
    Lazy,
    /// Polars SQL
    Sql,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Parquet,
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "olap_analyze")]
#[command(version, about = "Run the OLAP sales report over generated star-schema files")]
struct Cli {
    /// Query backend
    #[arg(long, value_enum, default_value_t = BackendArg::Lazy)]
    backend: BackendArg,

    /// File format of the tables
    #[arg(long, value_enum, default_value_t = FormatArg::Parquet)]
    format: FormatArg,

    /// Directory holding the five table files
    #[arg(long, default_value = DEFAULT_PARQUET_DIR)]
    data_dir: PathBuf,

    /// Row limit of the top-N rankings
    #[arg(long, default_value_t = 10)]
    top: u32,
}

impl Cli {
    fn config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            data_dir: self.data_dir.clone(),
            format: match self.format {
                FormatArg::Parquet => TableFormat::Parquet,
                FormatArg::Csv => TableFormat::Csv,
            },
            backend: match self.backend {
                BackendArg::Lazy => BackendKind::Lazy,
                BackendArg::Sql => BackendKind::Sql,
            },
            top_n: self.top,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_tracing() {
        eprintln!("warning: {err}");
    }

    match run(&cli.config()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_missing_data() => {
            println!("{MISSING_DATA_MESSAGE}");
            ExitCode::FAILURE
        }
        Err(err) => {
            println!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AnalyzerConfig) -> OlapResult<()> {
    println!(
        "Loading OLAP data from {} files in {}...",
        config.format,
        config.data_dir.display()
    );
    let options = StorageOptions {
        observer: Some(Arc::new(TracingObserver)),
        alert_at_or_above: StorageSeverity::Critical,
    };
    let frames = load_star_frames(&config.data_dir, config.format, &options)?;

    let report = match config.backend {
        BackendKind::Lazy => build_report(&LazyBackend::new(&frames), config.top_n)?,
        BackendKind::Sql => build_report(&*sql_backend(&frames)?, config.top_n)?,
    };
    print!("\n{report}");
    Ok(())
}

#[cfg(feature = "sql")]
fn sql_backend(
    frames: &olap_sample_data::types::StarFrames,
) -> OlapResult<Box<dyn QueryBackend + '_>> {
    Ok(Box::new(olap_sample_data::analysis::SqlBackend::new(frames)))
}

#[cfg(not(feature = "sql"))]
fn sql_backend(
    _frames: &olap_sample_data::types::StarFrames,
) -> OlapResult<Box<dyn QueryBackend + '_>> {
    Err(olap_sample_data::OlapError::InvalidConfig(
        "sql backend not enabled (enable cargo feature 'sql')".to_string(),
    ))
}
