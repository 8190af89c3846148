//! Generate the sales star schema as Parquet and CSV files.
//!
//! ## Usage
//!
//! ```bash
//! # Canonical run: seed 42, 1M facts, olap_data/ and csv_data/
//! olap_generate
//!
//! # Small reproducible run with a JSON summary
//! olap_generate --records 10000 --customers 50 --report generation.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use olap_sample_data::analysis::{
    LazyBackend, Query, QueryBackend, format_count, format_money, render_table,
};
use olap_sample_data::config::{
    DEFAULT_CSV_DIR, DEFAULT_CUSTOMER_COUNT, DEFAULT_PARQUET_DIR, DEFAULT_SALES_RECORDS,
    DEFAULT_SEED, GeneratorConfig,
};
use olap_sample_data::generate::{GenerationRun, StarSchemaGenerator};
use olap_sample_data::logging::init_tracing;
use olap_sample_data::storage::{StorageOptions, StorageSeverity, TracingObserver};
use olap_sample_data::types::StarTable;
use olap_sample_data::{OlapError, OlapResult};

const SAMPLE_ROWS: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "olap_generate")]
#[command(version, about = "Generate a seeded sales star schema (Parquet + CSV)")]
struct Cli {
    /// Seed for the product, customer and sales tables
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Number of sales fact rows
    #[arg(long, default_value_t = DEFAULT_SALES_RECORDS)]
    records: usize,

    /// Number of customers
    #[arg(long, default_value_t = DEFAULT_CUSTOMER_COUNT)]
    customers: usize,

    /// Output directory for Parquet files
    #[arg(long, default_value = DEFAULT_PARQUET_DIR)]
    parquet_dir: PathBuf,

    /// Output directory for CSV files
    #[arg(long, default_value = DEFAULT_CSV_DIR)]
    csv_dir: PathBuf,

    /// Write a JSON generation summary to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            seed: self.seed,
            customer_count: self.customers,
            sales_records: self.records,
            parquet_dir: self.parquet_dir.clone(),
            csv_dir: self.csv_dir.clone(),
            ..Default::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_tracing() {
        eprintln!("warning: {err}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> OlapResult<()> {
    let config = cli.config();
    println!("Generating OLAP sample data...");

    let options = StorageOptions {
        observer: Some(Arc::new(TracingObserver)),
        alert_at_or_above: StorageSeverity::Critical,
    };
    let generated = StarSchemaGenerator::new(config).run(&options)?;

    print_summary(&generated)?;

    if let Some(path) = &cli.report {
        fs::write(path, generated.report.to_json_pretty()?)?;
        println!("\nGeneration report written to: {}", path.display());
    }
    Ok(())
}

fn print_summary(generated: &GenerationRun) -> OlapResult<()> {
    let report = &generated.report;
    let rows = |table: StarTable| {
        report
            .tables
            .iter()
            .find(|t| t.table == table.file_stem())
            .map_or(0, |t| t.rows)
    };

    println!("\n{}", "=".repeat(50));
    println!("OLAP Data Generation Complete!");
    println!("{}", "=".repeat(50));
    for (label, table) in [
        ("Time dimension", StarTable::Time),
        ("Geography dimension", StarTable::Geography),
        ("Product dimension", StarTable::Product),
        ("Customer dimension", StarTable::Customer),
        ("Sales fact table", StarTable::Sales),
    ] {
        println!("{label}: {} records", format_count(rows(table) as i64));
    }
    println!(
        "\nParquet files saved to: {}",
        absolute(&report.config.parquet_dir).display()
    );
    println!(
        "CSV files saved to: {}",
        absolute(&report.config.csv_dir).display()
    );

    println!("\nSample Sales Data (first {SAMPLE_ROWS} records):");
    print!("{}", render_table(&generated.frames.sales.head(Some(SAMPLE_ROWS)))?);

    println!("\nTotal Sales by Year:");
    let yearly = LazyBackend::new(&generated.frames).run(&Query::SalesByYear)?;
    let years = yearly.column("year")?.cast(&polars::prelude::DataType::Int64)?;
    let totals = yearly.column("total_sales")?;
    for (year, total) in years
        .as_materialized_series()
        .i64()?
        .into_iter()
        .zip(totals.as_materialized_series().f64()?.into_iter())
    {
        match (year, total) {
            (Some(year), Some(total)) => println!("{year}: {}", format_money(total)),
            _ => return Err(OlapError::SchemaMismatch {
                message: "null in yearly totals".to_string(),
            }),
        }
    }
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
