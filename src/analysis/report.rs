//! The analyzer report: a fixed sequence of catalogue queries grouped into sections.

use std::fmt;
use std::time::{Duration, Instant};

use polars::prelude::{AnyValue, DataFrame, DataType};
use tracing::info;

use super::columns::TOTAL_SALES;
use super::{Query, QueryBackend};
use crate::error::OlapResult;
use crate::types::StarTable;

/// Quarters shown in the quarterly table.
pub const QUARTERS_SHOWN: usize = 8;
/// Months shown in the monthly trend.
pub const MONTHS_SHOWN: usize = 12;

const RULE_WIDTH: usize = 40;
const FOOTER_WIDTH: usize = 50;

/// Content of one titled block inside a section.
#[derive(Debug, Clone)]
pub enum ReportBlock {
    /// A query result rendered as a table.
    Table { heading: String, frame: DataFrame },
    /// Free-form lines (e.g. the monthly trend).
    Lines { heading: String, lines: Vec<String> },
}

/// A titled group of blocks, e.g. "SALES ANALYSIS BY TIME".
#[derive(Debug, Clone)]
pub struct ReportSection {
    pub title: String,
    pub blocks: Vec<ReportBlock>,
}

/// Full analyzer output.
#[derive(Debug, Clone)]
pub struct Report {
    /// Backend that produced the report.
    pub backend: &'static str,
    /// Row counts of the loaded tables, fact table first.
    pub data_info: Vec<(StarTable, i64)>,
    pub sections: Vec<ReportSection>,
    /// Wall time of one extra [`Query::SalesByYear`] run, measured after the sections.
    pub yearly_query: Duration,
}

impl Report {
    /// Find a section by title.
    pub fn section(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title == title)
    }
}

fn run_timed(backend: &dyn QueryBackend, query: &Query) -> OlapResult<DataFrame> {
    let start = Instant::now();
    let df = backend.run(query)?;
    info!(
        backend = backend.name(),
        query = %query,
        rows = df.height(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "query finished"
    );
    Ok(df)
}

/// Run the report catalogue on `backend`.
///
/// `top_n` limits the country and product rankings.
pub fn build_report(backend: &dyn QueryBackend, top_n: u32) -> OlapResult<Report> {
    let mut data_info = Vec::with_capacity(StarTable::ALL.len());
    for table in [
        StarTable::Sales,
        StarTable::Time,
        StarTable::Geography,
        StarTable::Product,
        StarTable::Customer,
    ] {
        let df = run_timed(backend, &Query::RowCount(table))?;
        data_info.push((table, first_i64(&df, super::columns::ROW_COUNT)?.unwrap_or(0)));
    }

    let table = |query: Query| -> OlapResult<ReportBlock> {
        Ok(ReportBlock::Table {
            heading: query.title(),
            frame: run_timed(backend, &query)?,
        })
    };

    let time = ReportSection {
        title: "SALES ANALYSIS BY TIME".to_string(),
        blocks: vec![
            table(Query::SalesByYear)?,
            ReportBlock::Table {
                heading: format!("Sales by Quarter (last {QUARTERS_SHOWN} quarters)"),
                frame: run_timed(backend, &Query::SalesByQuarter)?.tail(Some(QUARTERS_SHOWN)),
            },
            table(Query::WeekendVsWeekday)?,
        ],
    };

    let geography = ReportSection {
        title: "SALES ANALYSIS BY GEOGRAPHY".to_string(),
        blocks: vec![
            table(Query::SalesByRegion)?,
            table(Query::TopCountries { limit: top_n })?,
        ],
    };

    let product = ReportSection {
        title: "SALES ANALYSIS BY PRODUCT".to_string(),
        blocks: vec![
            table(Query::SalesByCategory)?,
            table(Query::ProfitMarginByCategory)?,
            table(Query::TopProducts { limit: top_n })?,
        ],
    };

    let customer = ReportSection {
        title: "CUSTOMER SEGMENT ANALYSIS".to_string(),
        blocks: vec![table(Query::SalesByCustomerType)?],
    };

    let categories = string_column(&run_timed(backend, &Query::Categories)?, "category")?;
    let mut multidimensional = ReportSection {
        title: "MULTIDIMENSIONAL ANALYSIS".to_string(),
        blocks: vec![table(Query::RegionCategoryPivot { categories })?],
    };

    let top_region = string_column(&run_timed(backend, &Query::TopRegion)?, "region")?
        .into_iter()
        .next();
    if let Some(region) = top_region {
        let trend = run_timed(backend, &Query::MonthlyTrend { region: region.clone() })?
            .tail(Some(MONTHS_SHOWN));
        multidimensional.blocks.push(ReportBlock::Lines {
            heading: format!("Monthly Sales Trend for {region} (last {MONTHS_SHOWN} months)"),
            lines: trend_lines(&trend)?,
        });
    }

    let start = Instant::now();
    backend.run(&Query::SalesByYear)?;
    let yearly_query = start.elapsed();

    Ok(Report {
        backend: backend.name(),
        data_info,
        sections: vec![time, geography, product, customer, multidimensional],
        yearly_query,
    })
}

/// `YYYY-MM: $1,234.56` lines from a year/month/total_sales frame.
pub fn trend_lines(df: &DataFrame) -> OlapResult<Vec<String>> {
    let years = i64_column(df, "year")?;
    let months = i64_column(df, "month")?;
    let sales = df
        .column(TOTAL_SALES)?
        .cast(&DataType::Float64)?;
    let sales = sales.as_materialized_series().f64()?;

    Ok(years
        .into_iter()
        .zip(months)
        .zip(sales.into_iter())
        .map(|((year, month), total)| {
            format!("{year}-{month:02}: {}", format_money(total.unwrap_or(0.0)))
        })
        .collect())
}

fn i64_column(df: &DataFrame, name: &str) -> OlapResult<Vec<i64>> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    Ok(column
        .as_materialized_series()
        .i64()?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect())
}

fn first_i64(df: &DataFrame, name: &str) -> OlapResult<Option<i64>> {
    Ok(i64_column(df, name)?.into_iter().next())
}

fn string_column(df: &DataFrame, name: &str) -> OlapResult<Vec<String>> {
    Ok(df
        .column(name)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}

/// Format an amount as dollars with thousands separators, e.g. `$1,234.56`.
pub fn format_money(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// Format a count with thousands separators, e.g. `1,000,000`.
pub fn format_count(count: i64) -> String {
    let sign = if count < 0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(count.unsigned_abs()))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn cell_text(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => "null".to_string(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::Float32(v) => format!("{v:.2}"),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Render a frame as a right-aligned text table.
pub fn render_table(df: &DataFrame) -> OlapResult<String> {
    let columns = df.columns();
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(columns.len());
    for column in columns {
        let mut col_cells = Vec::with_capacity(df.height() + 1);
        col_cells.push(column.name().to_string());
        for row in 0..df.height() {
            col_cells.push(cell_text(column.get(row)?));
        }
        cells.push(col_cells);
    }

    let widths: Vec<usize> = cells
        .iter()
        .map(|c| c.iter().map(|s| s.chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for row in 0..=df.height() {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>w$}", c[row], w = *w))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    Ok(out)
}

impl fmt::Display for ReportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { heading, frame } => {
                writeln!(f, "\n{heading}:")?;
                match render_table(frame) {
                    Ok(text) => f.write_str(&text),
                    Err(e) => writeln!(f, "<unrenderable: {e}>"),
                }
            }
            Self::Lines { heading, lines } => {
                writeln!(f, "\n{heading}:")?;
                for line in lines {
                    writeln!(f, "{line}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ReportSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n\n{}", self.title)?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data loaded successfully! (backend: {})", self.backend)?;
        for (table, rows) in &self.data_info {
            let label = match table {
                StarTable::Sales => "Sales records",
                StarTable::Time => "Time periods",
                StarTable::Geography => "Geographies",
                StarTable::Product => "Products",
                StarTable::Customer => "Customers",
            };
            writeln!(f, "{label}: {}", format_count(*rows))?;
        }
        for section in &self.sections {
            write!(f, "{section}")?;
        }
        writeln!(f, "\n{}", "=".repeat(FOOTER_WIDTH))?;
        writeln!(
            f,
            "Yearly aggregation ({}): {:.2} ms",
            self.backend,
            self.yearly_query.as_secs_f64() * 1000.0
        )?;
        writeln!(f, "Analysis complete!")
    }
}

#[cfg(test)]
mod tests {
    use polars::df;

    use super::*;

    #[test]
    fn money_has_separators_and_cents() {
        assert_eq!(format_money(1234.5), "$1,234.50");
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_money(-12.346), "-$12.35");
        assert_eq!(format_money(999.999), "$1,000.00");
    }

    #[test]
    fn counts_have_separators() {
        assert_eq!(format_count(1_000_000), "1,000,000");
        assert_eq!(format_count(1826), "1,826");
        assert_eq!(format_count(63), "63");
    }

    #[test]
    fn trend_lines_pad_months() {
        let df = df!(
            "year" => [2024_i32, 2024],
            "month" => [9_i32, 10],
            "total_sales" => [1234.56_f64, 98765.4],
        )
        .unwrap();
        assert_eq!(
            trend_lines(&df).unwrap(),
            vec!["2024-09: $1,234.56", "2024-10: $98,765.40"]
        );
    }

    #[test]
    fn tables_are_right_aligned() {
        let df = df!(
            "region" => ["Europe", "Asia Pacific"],
            "total_sales" => [10.5_f64, 2.0],
        )
        .unwrap();
        let text = render_table(&df).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "      region  total_sales");
        assert_eq!(lines[1], "      Europe        10.50");
        assert_eq!(lines[2], "Asia Pacific         2.00");
    }
}
