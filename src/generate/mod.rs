//! Star-schema data generation.
//!
//! [`StarSchemaGenerator`] builds the four dimensions and the sales fact table from a
//! [`GeneratorConfig`] and, via [`StarSchemaGenerator::run`], writes them to the Parquet and CSV
//! output directories.
//!
//! Randomness is confined to the product, customer and sales tables. Each of them draws from its
//! own [`ChaCha8Rng`] seeded by [`table_rng`], so regenerating with the same seed reproduces
//! every table exactly, and changing e.g. the number of facts leaves the dimensions untouched.
//!
//! ## Example
//!
//! ```rust
//! use olap_sample_data::config::GeneratorConfig;
//! use olap_sample_data::generate::StarSchemaGenerator;
//!
//! # fn main() -> Result<(), olap_sample_data::OlapError> {
//! let config = GeneratorConfig {
//!     customer_count: 5,
//!     sales_records: 100,
//!     ..Default::default()
//! };
//! let schema = StarSchemaGenerator::new(config).generate()?;
//! assert_eq!(schema.sales.len(), 100);
//! assert_eq!(schema.customers.len(), 5);
//! # Ok(())
//! # }
//! ```

pub mod customer;
pub mod geography;
pub mod product;
pub mod sales;
pub mod time;

use std::path::PathBuf;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{GeneratorConfig, registration_start_date};
use crate::error::OlapResult;
use crate::storage::{StorageOptions, TableFormat, write_star_frames};
use crate::types::{StarFrames, StarTable};

pub use customer::{CustomerRow, customer_frame, generate_customer_dimension};
pub use geography::{GeographyRow, generate_geography_dimension, geography_frame};
pub use product::{ProductRow, generate_product_dimension, product_frame};
pub use sales::{Dimensions, SaleRow, generate_sales_fact, sales_frame};
pub use time::{DateRow, fiscal_year, generate_time_dimension, time_frame};

/// Round half away from zero to 2 decimals (cents).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Random stream dedicated to `table` for a given run seed.
pub fn table_rng(seed: u64, table: StarTable) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash_seed(seed, table.file_stem()))
}

// FNV-1a over the table name, starting from the run seed.
fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = 0xcbf29ce484222325_u64 ^ seed;
    for byte in key.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// All generated rows of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct StarSchema {
    pub dates: Vec<DateRow>,
    pub geographies: Vec<GeographyRow>,
    pub products: Vec<ProductRow>,
    pub customers: Vec<CustomerRow>,
    pub sales: Vec<SaleRow>,
}

impl StarSchema {
    /// Number of rows generated for `table`.
    pub fn row_count(&self, table: StarTable) -> usize {
        match table {
            StarTable::Time => self.dates.len(),
            StarTable::Geography => self.geographies.len(),
            StarTable::Product => self.products.len(),
            StarTable::Customer => self.customers.len(),
            StarTable::Sales => self.sales.len(),
        }
    }

    /// Borrow the dimensions in the shape the fact generator samples from.
    pub fn dimensions(&self) -> Dimensions<'_> {
        Dimensions {
            dates: &self.dates,
            geographies: &self.geographies,
            products: &self.products,
            customers: &self.customers,
        }
    }

    /// Convert every table to a Polars frame.
    pub fn to_frames(&self) -> OlapResult<StarFrames> {
        Ok(StarFrames {
            time: time_frame(&self.dates)?,
            geography: geography_frame(&self.geographies)?,
            product: product_frame(&self.products)?,
            customer: customer_frame(&self.customers)?,
            sales: sales_frame(&self.sales)?,
        })
    }
}

/// Per-table outcome of [`StarSchemaGenerator::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub rows: usize,
    pub parquet_path: PathBuf,
    pub csv_path: PathBuf,
}

/// Serializable summary of a generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub config: GeneratorConfig,
    pub tables: Vec<TableReport>,
    pub elapsed_ms: u64,
}

impl GenerationReport {
    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> OlapResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Frames and report produced by [`StarSchemaGenerator::run`].
#[derive(Debug, Clone)]
pub struct GenerationRun {
    pub frames: StarFrames,
    pub report: GenerationReport,
}

/// Entry point for generating and persisting the star schema.
#[derive(Debug, Clone)]
pub struct StarSchemaGenerator {
    config: GeneratorConfig,
}

impl StarSchemaGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate all five tables in memory.
    pub fn generate(&self) -> OlapResult<StarSchema> {
        let cfg = &self.config;
        cfg.validate()?;

        let dates = generate_time_dimension(cfg.start_date, cfg.end_date)?;
        info!(table = %StarTable::Time, rows = dates.len(), "generated dimension");

        let geographies = generate_geography_dimension();
        info!(table = %StarTable::Geography, rows = geographies.len(), "generated dimension");

        let products = generate_product_dimension(&mut table_rng(cfg.seed, StarTable::Product));
        info!(table = %StarTable::Product, rows = products.len(), "generated dimension");

        let customers = generate_customer_dimension(
            &mut table_rng(cfg.seed, StarTable::Customer),
            cfg.customer_count,
            registration_start_date(),
        );
        info!(table = %StarTable::Customer, rows = customers.len(), "generated dimension");

        let mut schema = StarSchema {
            dates,
            geographies,
            products,
            customers,
            sales: Vec::new(),
        };

        info!(rows = cfg.sales_records, seed = cfg.seed, "generating sales facts");
        let sales = generate_sales_fact(
            &mut table_rng(cfg.seed, StarTable::Sales),
            schema.dimensions(),
            cfg.sales_records,
        )?;
        info!(table = %StarTable::Sales, rows = sales.len(), "generated fact table");
        schema.sales = sales;

        Ok(schema)
    }

    /// Generate the star schema and write it to both output directories.
    pub fn run(&self, options: &StorageOptions) -> OlapResult<GenerationRun> {
        let start = Instant::now();
        let schema = self.generate()?;
        let mut frames = schema.to_frames()?;

        let parquet_paths = write_star_frames(
            &mut frames,
            &self.config.parquet_dir,
            TableFormat::Parquet,
            options,
        )?;
        let csv_paths =
            write_star_frames(&mut frames, &self.config.csv_dir, TableFormat::Csv, options)?;

        let tables = StarTable::ALL
            .iter()
            .zip(parquet_paths.into_iter().zip(csv_paths))
            .map(|(table, (parquet_path, csv_path))| TableReport {
                table: table.file_stem().to_string(),
                rows: schema.row_count(*table),
                parquet_path,
                csv_path,
            })
            .collect();

        let elapsed_ms = start.elapsed().as_millis().min(u64::MAX as u128) as u64;
        info!(elapsed_ms, "generation finished");

        Ok(GenerationRun {
            frames,
            report: GenerationReport {
                config: self.config.clone(),
                tables,
                elapsed_ms,
            },
        })
    }
}
