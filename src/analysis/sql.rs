//! Query backend that runs the catalogue as SQL text through `polars-sql`.
//!
//! The five frames are registered under their file stems (`fact_sales`, `dim_time`, ...), so the
//! statements read like queries against the stored files.

use polars::prelude::{DataFrame, IntoLazy};
use polars_sql::SQLContext;
use tracing::debug;

use super::columns::*;
use super::lazy::round_money;
use super::{Query, QueryBackend, WEEKDAY, WEEKEND};
use crate::error::OlapResult;
use crate::types::{StarFrames, StarTable};

const FACTS_WITH_TIME: &str =
    "FROM fact_sales s JOIN dim_time t ON s.date_key = t.date_key";
const FACTS_WITH_GEOGRAPHY: &str =
    "FROM fact_sales s JOIN dim_geography g ON s.geography_key = g.geography_key";
const FACTS_WITH_PRODUCT: &str =
    "FROM fact_sales s JOIN dim_product p ON s.product_key = p.product_key";
const FACTS_WITH_CUSTOMER: &str =
    "FROM fact_sales s JOIN dim_customer c ON s.customer_key = c.customer_key";

/// Runs the catalogue through a [`SQLContext`].
#[derive(Debug, Clone, Copy)]
pub struct SqlBackend<'a> {
    frames: &'a StarFrames,
}

impl<'a> SqlBackend<'a> {
    pub fn new(frames: &'a StarFrames) -> Self {
        Self { frames }
    }

    fn context(&self) -> SQLContext {
        let ctx = SQLContext::new();
        for table in StarTable::ALL {
            ctx.register(table.file_stem(), self.frames.get(table).clone().lazy());
        }
        ctx
    }
}

impl QueryBackend for SqlBackend<'_> {
    fn name(&self) -> &'static str {
        "sql"
    }

    fn run(&self, query: &Query) -> OlapResult<DataFrame> {
        let sql = query_sql(query);
        debug!(query = %query, %sql, "executing sql");
        let mut ctx = self.context();
        round_money(ctx.execute(&sql)?.collect()?)
    }
}

/// SQL text for `query`.
pub fn query_sql(query: &Query) -> String {
    match query {
        Query::RowCount(table) => format!(
            "SELECT CAST(COUNT(*) AS BIGINT) AS {ROW_COUNT} FROM {}",
            table.file_stem()
        ),
        Query::SalesByYear => format!(
            "SELECT t.year, \
             SUM(s.gross_sales) AS {TOTAL_SALES}, \
             SUM(s.profit) AS {TOTAL_PROFIT}, \
             SUM(s.quantity) AS {TOTAL_QUANTITY} \
             {FACTS_WITH_TIME} \
             GROUP BY t.year \
             ORDER BY year"
        ),
        Query::SalesByQuarter => format!(
            "SELECT t.year, t.quarter, \
             SUM(s.gross_sales) AS {TOTAL_SALES}, \
             SUM(s.profit) AS {TOTAL_PROFIT} \
             {FACTS_WITH_TIME} \
             GROUP BY t.year, t.quarter \
             ORDER BY year, quarter"
        ),
        Query::WeekendVsWeekday => format!(
            "WITH facts AS ( \
               SELECT CASE WHEN t.is_weekend = TRUE THEN '{WEEKEND}' ELSE '{WEEKDAY}' END \
                 AS {DAY_TYPE}, s.gross_sales, s.quantity \
               {FACTS_WITH_TIME} \
             ) \
             SELECT {DAY_TYPE}, \
             SUM(gross_sales) AS {TOTAL_SALES}, \
             AVG(gross_sales) AS {AVG_SALES}, \
             SUM(quantity) AS {TOTAL_QUANTITY}, \
             AVG(CAST(quantity AS DOUBLE)) AS {AVG_QUANTITY} \
             FROM facts \
             GROUP BY {DAY_TYPE} \
             ORDER BY {DAY_TYPE}"
        ),
        Query::SalesByRegion => format!(
            "SELECT g.region, \
             SUM(s.gross_sales) AS {TOTAL_SALES}, \
             SUM(s.profit) AS {TOTAL_PROFIT}, \
             SUM(s.quantity) AS {TOTAL_QUANTITY} \
             {FACTS_WITH_GEOGRAPHY} \
             GROUP BY g.region \
             ORDER BY {TOTAL_SALES} DESC, region"
        ),
        Query::TopCountries { limit } => format!(
            "SELECT g.country, \
             SUM(s.gross_sales) AS {TOTAL_SALES}, \
             SUM(s.profit) AS {TOTAL_PROFIT} \
             {FACTS_WITH_GEOGRAPHY} \
             GROUP BY g.country \
             ORDER BY {TOTAL_SALES} DESC, country \
             LIMIT {limit}"
        ),
        Query::SalesByCategory => format!(
            "SELECT p.category, \
             SUM(s.gross_sales) AS {TOTAL_SALES}, \
             SUM(s.profit) AS {TOTAL_PROFIT}, \
             SUM(s.quantity) AS {TOTAL_QUANTITY} \
             {FACTS_WITH_PRODUCT} \
             GROUP BY p.category \
             ORDER BY {TOTAL_SALES} DESC, category"
        ),
        Query::ProfitMarginByCategory => format!(
            "SELECT p.category, \
             SUM(s.profit) / SUM(s.gross_sales) * 100.0 AS {PROFIT_MARGIN_PCT} \
             {FACTS_WITH_PRODUCT} \
             GROUP BY p.category \
             ORDER BY {PROFIT_MARGIN_PCT} DESC, category"
        ),
        Query::TopProducts { limit } => format!(
            "SELECT p.product_name, \
             SUM(s.gross_sales) AS {TOTAL_SALES}, \
             SUM(s.quantity) AS {TOTAL_QUANTITY} \
             {FACTS_WITH_PRODUCT} \
             GROUP BY p.product_name \
             ORDER BY {TOTAL_SALES} DESC, product_name \
             LIMIT {limit}"
        ),
        Query::SalesByCustomerType => format!(
            "SELECT c.customer_type, \
             SUM(s.gross_sales) AS {TOTAL_SALES}, \
             AVG(s.gross_sales) AS {AVG_SALES_PER_ORDER}, \
             SUM(s.profit) AS {TOTAL_PROFIT}, \
             AVG(s.profit) AS {AVG_PROFIT_PER_ORDER}, \
             CAST(COUNT(DISTINCT s.customer_key) AS BIGINT) AS {UNIQUE_CUSTOMERS} \
             {FACTS_WITH_CUSTOMER} \
             GROUP BY c.customer_type \
             ORDER BY {TOTAL_SALES} DESC, customer_type"
        ),
        Query::Categories => {
            "SELECT DISTINCT category FROM dim_product ORDER BY category".to_string()
        }
        Query::RegionCategoryPivot { categories } => {
            let cells: String = categories
                .iter()
                .map(|category| {
                    format!(
                        ", SUM(CASE WHEN p.category = {} THEN s.gross_sales ELSE 0.0 END) AS {}",
                        quote_literal(category),
                        quote_ident(category)
                    )
                })
                .collect();
            format!(
                "SELECT g.region{cells} \
                 FROM fact_sales s \
                 JOIN dim_geography g ON s.geography_key = g.geography_key \
                 JOIN dim_product p ON s.product_key = p.product_key \
                 GROUP BY g.region \
                 ORDER BY region"
            )
        }
        Query::TopRegion => format!(
            "SELECT g.region, \
             SUM(s.gross_sales) AS {TOTAL_SALES} \
             {FACTS_WITH_GEOGRAPHY} \
             GROUP BY g.region \
             ORDER BY {TOTAL_SALES} DESC, region \
             LIMIT 1"
        ),
        Query::MonthlyTrend { region } => format!(
            "SELECT t.year, t.month, \
             SUM(s.gross_sales) AS {TOTAL_SALES} \
             FROM fact_sales s \
             JOIN dim_time t ON s.date_key = t.date_key \
             JOIN dim_geography g ON s.geography_key = g.geography_key \
             WHERE g.region = {} \
             GROUP BY t.year, t.month \
             ORDER BY year, month",
            quote_literal(region)
        ),
    }
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
