//! `olap-sample-data` generates a seeded sales star schema and runs a fixed OLAP report over it.
//!
//! The crate has two halves that meet only through files on disk:
//!
//! - **Generation** ([`generate`]): builds four dimensions (time, geography, product, customer)
//!   and a sales fact table, then writes each table as Parquet (`olap_data/`) and CSV
//!   (`csv_data/`). Output is fully determined by [`config::GeneratorConfig::seed`].
//! - **Analysis** ([`analysis`]): loads the tables back ([`storage::load_star_frames`]) and runs
//!   the report catalogue through one of two interchangeable backends, Polars lazy plans or
//!   Polars SQL (cargo feature `sql`, on by default).
//!
//! ## Tables
//!
//! | File stem | Key | Rows (default run) |
//! | --- | --- | --- |
//! | `dim_time` | `date_key` | one per day, 2020-01-01 to 2024-12-31 |
//! | `dim_geography` | `geography_key` | 63 cities |
//! | `dim_product` | `product_key` | 3 to 8 SKUs per product type |
//! | `dim_customer` | `customer_key` | 1,000 |
//! | `fact_sales` | `sales_key` | 1,000,000 |
//!
//! Column layouts are defined once in [`types::StarTable::schema`].
//!
//! ## Quick example: generate, then analyze
//!
//! ```no_run
//! use olap_sample_data::analysis::{LazyBackend, build_report};
//! use olap_sample_data::config::GeneratorConfig;
//! use olap_sample_data::generate::StarSchemaGenerator;
//! use olap_sample_data::storage::{StorageOptions, TableFormat, load_star_frames};
//!
//! # fn main() -> Result<(), olap_sample_data::OlapError> {
//! let options = StorageOptions::default();
//! StarSchemaGenerator::new(GeneratorConfig::default()).run(&options)?;
//!
//! let frames = load_star_frames("olap_data", TableFormat::Parquet, &options)?;
//! let report = build_report(&LazyBackend::new(&frames), 10)?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The library emits [`tracing`] events and never installs a subscriber. The binaries call
//! [`logging::init_tracing`], which honours `RUST_LOG` and writes to stderr.

pub mod analysis;
pub mod config;
pub mod error;
pub mod generate;
pub mod logging;
pub mod storage;
pub mod types;

pub use error::{OlapError, OlapResult};
