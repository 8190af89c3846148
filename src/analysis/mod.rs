//! Aggregation queries over the star schema.
//!
//! A [`Query`] names one report query; a [`QueryBackend`] executes it against loaded
//! [`crate::types::StarFrames`]. Two backends exist:
//!
//! - [`LazyBackend`]: Polars lazy joins, group-bys and sorts.
//! - [`SqlBackend`] (cargo feature `sql`): the same queries as SQL text run by `polars-sql`.
//!
//! Both return frames with the same column names, column order and row order, so their results
//! can be compared cell by cell. Money columns are rounded to 2 decimals.

pub mod lazy;
pub mod report;
#[cfg(feature = "sql")]
pub mod sql;

use std::fmt;

use polars::prelude::DataFrame;

use crate::error::OlapResult;
use crate::types::StarTable;

pub use lazy::LazyBackend;
pub use report::{
    Report, ReportBlock, ReportSection, build_report, format_count, format_money, render_table,
    trend_lines,
};
#[cfg(feature = "sql")]
pub use sql::SqlBackend;

/// Output column names shared by both backends.
pub mod columns {
    pub const ROW_COUNT: &str = "row_count";
    pub const TOTAL_SALES: &str = "total_sales";
    pub const TOTAL_PROFIT: &str = "total_profit";
    pub const TOTAL_QUANTITY: &str = "total_quantity";
    pub const AVG_SALES: &str = "avg_sales";
    pub const AVG_QUANTITY: &str = "avg_quantity";
    pub const PROFIT_MARGIN_PCT: &str = "profit_margin_pct";
    pub const AVG_SALES_PER_ORDER: &str = "avg_sales_per_order";
    pub const AVG_PROFIT_PER_ORDER: &str = "avg_profit_per_order";
    pub const UNIQUE_CUSTOMERS: &str = "unique_customers";
    pub const DAY_TYPE: &str = "day_type";
}

/// Label of weekend rows in [`Query::WeekendVsWeekday`].
pub const WEEKEND: &str = "Weekend";
/// Label of weekday rows in [`Query::WeekendVsWeekday`].
pub const WEEKDAY: &str = "Weekday";

/// One query of the report catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Number of rows in a table.
    RowCount(StarTable),
    SalesByYear,
    SalesByQuarter,
    WeekendVsWeekday,
    SalesByRegion,
    TopCountries { limit: u32 },
    SalesByCategory,
    ProfitMarginByCategory,
    TopProducts { limit: u32 },
    SalesByCustomerType,
    /// Distinct product categories, sorted.
    Categories,
    /// Gross sales per region with one column per listed category (0 when a region has none).
    RegionCategoryPivot { categories: Vec<String> },
    /// The region with the highest gross sales.
    TopRegion,
    /// Gross sales per (year, month) for one region.
    MonthlyTrend { region: String },
}

impl Query {
    /// Short human-readable name, used in logs and report headings.
    pub fn title(&self) -> String {
        match self {
            Self::RowCount(table) => format!("Row count of {table}"),
            Self::SalesByYear => "Sales by Year".to_string(),
            Self::SalesByQuarter => "Sales by Quarter".to_string(),
            Self::WeekendVsWeekday => "Weekend vs Weekday Analysis".to_string(),
            Self::SalesByRegion => "Sales by Region".to_string(),
            Self::TopCountries { limit } => format!("Top {limit} Countries by Sales"),
            Self::SalesByCategory => "Sales by Category".to_string(),
            Self::ProfitMarginByCategory => "Profit Margin by Category (%)".to_string(),
            Self::TopProducts { limit } => format!("Top {limit} Products by Sales"),
            Self::SalesByCustomerType => "Sales by Customer Type".to_string(),
            Self::Categories => "Product Categories".to_string(),
            Self::RegionCategoryPivot { .. } => "Sales by Region and Product Category".to_string(),
            Self::TopRegion => "Top Region by Sales".to_string(),
            Self::MonthlyTrend { region } => format!("Monthly Sales Trend for {region}"),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title())
    }
}

/// Executes catalogue queries.
pub trait QueryBackend {
    /// Backend name shown in logs and the report header.
    fn name(&self) -> &'static str;

    /// Run `query` and return its result frame.
    fn run(&self, query: &Query) -> OlapResult<DataFrame>;
}
