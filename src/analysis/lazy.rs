//! Query backend built on the Polars lazy API.

use polars::prelude::*;

use super::columns::*;
use super::{Query, QueryBackend, WEEKDAY, WEEKEND};
use crate::error::OlapResult;
use crate::generate::round2;
use crate::types::{StarFrames, StarTable};

/// Runs the catalogue as Polars lazy plans over borrowed frames.
#[derive(Debug, Clone, Copy)]
pub struct LazyBackend<'a> {
    frames: &'a StarFrames,
}

impl<'a> LazyBackend<'a> {
    pub fn new(frames: &'a StarFrames) -> Self {
        Self { frames }
    }

    /// The fact table inner-joined to each of `dims` on its key column.
    fn facts_with(&self, dims: &[StarTable]) -> LazyFrame {
        dims.iter().fold(self.frames.sales.clone().lazy(), |lf, dim| {
            let key = dim.key_column();
            lf.join(
                self.frames.get(*dim).clone().lazy(),
                [col(key)],
                [col(key)],
                JoinArgs::new(JoinType::Inner),
            )
        })
    }

    fn plan(&self, query: &Query) -> OlapResult<LazyFrame> {
        let by_sales_desc = |key: &str| {
            (
                [TOTAL_SALES.to_string(), key.to_string()],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
        };

        let lf = match query {
            Query::RowCount(table) => {
                let rows = self.frames.get(*table).height() as i64;
                df!(ROW_COUNT => [rows])?.lazy()
            }
            Query::SalesByYear => self
                .facts_with(&[StarTable::Time])
                .group_by([col("year")])
                .agg([
                    col("gross_sales").sum().alias(TOTAL_SALES),
                    col("profit").sum().alias(TOTAL_PROFIT),
                    col("quantity").sum().alias(TOTAL_QUANTITY),
                ])
                .sort(["year"], SortMultipleOptions::default()),
            Query::SalesByQuarter => self
                .facts_with(&[StarTable::Time])
                .group_by([col("year"), col("quarter")])
                .agg([
                    col("gross_sales").sum().alias(TOTAL_SALES),
                    col("profit").sum().alias(TOTAL_PROFIT),
                ])
                .sort(["year", "quarter"], SortMultipleOptions::default()),
            Query::WeekendVsWeekday => self
                .facts_with(&[StarTable::Time])
                .with_column(
                    when(col("is_weekend"))
                        .then(lit(WEEKEND))
                        .otherwise(lit(WEEKDAY))
                        .alias(DAY_TYPE),
                )
                .group_by([col(DAY_TYPE)])
                .agg([
                    col("gross_sales").sum().alias(TOTAL_SALES),
                    col("gross_sales").mean().alias(AVG_SALES),
                    col("quantity").sum().alias(TOTAL_QUANTITY),
                    col("quantity").cast(DataType::Float64).mean().alias(AVG_QUANTITY),
                ])
                .sort([DAY_TYPE], SortMultipleOptions::default()),
            Query::SalesByRegion => {
                let (by, opts) = by_sales_desc("region");
                self.facts_with(&[StarTable::Geography])
                    .group_by([col("region")])
                    .agg([
                        col("gross_sales").sum().alias(TOTAL_SALES),
                        col("profit").sum().alias(TOTAL_PROFIT),
                        col("quantity").sum().alias(TOTAL_QUANTITY),
                    ])
                    .sort(by, opts)
            }
            Query::TopCountries { limit } => {
                let (by, opts) = by_sales_desc("country");
                self.facts_with(&[StarTable::Geography])
                    .group_by([col("country")])
                    .agg([
                        col("gross_sales").sum().alias(TOTAL_SALES),
                        col("profit").sum().alias(TOTAL_PROFIT),
                    ])
                    .sort(by, opts)
                    .limit(*limit as IdxSize)
            }
            Query::SalesByCategory => {
                let (by, opts) = by_sales_desc("category");
                self.facts_with(&[StarTable::Product])
                    .group_by([col("category")])
                    .agg([
                        col("gross_sales").sum().alias(TOTAL_SALES),
                        col("profit").sum().alias(TOTAL_PROFIT),
                        col("quantity").sum().alias(TOTAL_QUANTITY),
                    ])
                    .sort(by, opts)
            }
            Query::ProfitMarginByCategory => self
                .facts_with(&[StarTable::Product])
                .group_by([col("category")])
                .agg([
                    (col("profit").sum() / col("gross_sales").sum() * lit(100.0))
                        .alias(PROFIT_MARGIN_PCT),
                ])
                .sort(
                    [PROFIT_MARGIN_PCT, "category"],
                    SortMultipleOptions::default().with_order_descending_multi([true, false]),
                ),
            Query::TopProducts { limit } => {
                let (by, opts) = by_sales_desc("product_name");
                self.facts_with(&[StarTable::Product])
                    .group_by([col("product_name")])
                    .agg([
                        col("gross_sales").sum().alias(TOTAL_SALES),
                        col("quantity").sum().alias(TOTAL_QUANTITY),
                    ])
                    .sort(by, opts)
                    .limit(*limit as IdxSize)
            }
            Query::SalesByCustomerType => {
                let (by, opts) = by_sales_desc("customer_type");
                self.facts_with(&[StarTable::Customer])
                    .group_by([col("customer_type")])
                    .agg([
                        col("gross_sales").sum().alias(TOTAL_SALES),
                        col("gross_sales").mean().alias(AVG_SALES_PER_ORDER),
                        col("profit").sum().alias(TOTAL_PROFIT),
                        col("profit").mean().alias(AVG_PROFIT_PER_ORDER),
                        col("customer_key")
                            .n_unique()
                            .cast(DataType::Int64)
                            .alias(UNIQUE_CUSTOMERS),
                    ])
                    .sort(by, opts)
            }
            Query::Categories => self
                .frames
                .product
                .clone()
                .lazy()
                .select([col("category").unique()])
                .sort(["category"], SortMultipleOptions::default()),
            Query::RegionCategoryPivot { categories } => {
                let cells: Vec<Expr> = categories
                    .iter()
                    .map(|category| {
                        when(col("category").eq(lit(category.as_str())))
                            .then(col("gross_sales"))
                            .otherwise(lit(0.0))
                            .sum()
                            .alias(category.as_str())
                    })
                    .collect();
                self.facts_with(&[StarTable::Geography, StarTable::Product])
                    .group_by([col("region")])
                    .agg(cells)
                    .sort(["region"], SortMultipleOptions::default())
            }
            Query::TopRegion => {
                let (by, opts) = by_sales_desc("region");
                self.facts_with(&[StarTable::Geography])
                    .group_by([col("region")])
                    .agg([col("gross_sales").sum().alias(TOTAL_SALES)])
                    .sort(by, opts)
                    .limit(1)
            }
            Query::MonthlyTrend { region } => self
                .facts_with(&[StarTable::Time, StarTable::Geography])
                .filter(col("region").eq(lit(region.as_str())))
                .group_by([col("year"), col("month")])
                .agg([col("gross_sales").sum().alias(TOTAL_SALES)])
                .sort(["year", "month"], SortMultipleOptions::default()),
        };
        Ok(lf)
    }
}

impl QueryBackend for LazyBackend<'_> {
    fn name(&self) -> &'static str {
        "lazy"
    }

    fn run(&self, query: &Query) -> OlapResult<DataFrame> {
        let df = self.plan(query)?.collect()?;
        round_money(df)
    }
}

/// Round every `Float64` column to cents.
pub fn round_money(mut df: DataFrame) -> OlapResult<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    for name in names {
        let column = df.column(&name)?;
        if column.dtype() != &DataType::Float64 {
            continue;
        }
        let rounded = column
            .as_materialized_series()
            .f64()?
            .apply_values(round2)
            .into_series()
            .with_name(name.as_str().into());
        df.with_column(rounded.into())?;
    }
    Ok(df)
}
