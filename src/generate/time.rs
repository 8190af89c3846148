//! Time dimension: one row per calendar day.

use chrono::{Datelike, NaiveDate, Weekday};
use polars::prelude::*;

use crate::error::{OlapError, OlapResult};

/// A single day of the time dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRow {
    pub date_key: i64,
    pub date: NaiveDate,
    pub year: i32,
    pub quarter: i32,
    pub month: i32,
    pub month_name: String,
    pub day: i32,
    /// Monday = 1 ... Sunday = 7.
    pub day_of_week: i32,
    pub day_name: String,
    /// ISO 8601 week number.
    pub week_of_year: i32,
    pub is_weekend: bool,
    pub fiscal_year: i32,
}

/// Fiscal years start in April: April..December belong to the next calendar year's fiscal year.
pub fn fiscal_year(year: i32, month: u32) -> i32 {
    if month >= 4 { year + 1 } else { year }
}

/// Expand `[start, end]` (inclusive) into one [`DateRow`] per day, keyed from 0.
pub fn generate_time_dimension(start: NaiveDate, end: NaiveDate) -> OlapResult<Vec<DateRow>> {
    if start > end {
        return Err(OlapError::InvalidDateRange { start, end });
    }

    let rows = start
        .iter_days()
        .take_while(|d| *d <= end)
        .enumerate()
        .map(|(idx, date)| date_row(idx as i64, date))
        .collect();
    Ok(rows)
}

fn date_row(date_key: i64, date: NaiveDate) -> DateRow {
    let weekday = date.weekday();
    DateRow {
        date_key,
        date,
        year: date.year(),
        quarter: ((date.month0() / 3) + 1) as i32,
        month: date.month() as i32,
        month_name: date.format("%B").to_string(),
        day: date.day() as i32,
        day_of_week: weekday.number_from_monday() as i32,
        day_name: date.format("%A").to_string(),
        week_of_year: date.iso_week().week() as i32,
        is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        fiscal_year: fiscal_year(date.year(), date.month()),
    }
}

/// Build the `dim_time` frame in schema column order.
pub fn time_frame(rows: &[DateRow]) -> OlapResult<DataFrame> {
    let df = df!(
        "date_key" => rows.iter().map(|r| r.date_key).collect::<Vec<_>>(),
        "date" => rows.iter().map(|r| r.date).collect::<Vec<_>>(),
        "year" => rows.iter().map(|r| r.year).collect::<Vec<_>>(),
        "quarter" => rows.iter().map(|r| r.quarter).collect::<Vec<_>>(),
        "month" => rows.iter().map(|r| r.month).collect::<Vec<_>>(),
        "month_name" => rows.iter().map(|r| r.month_name.as_str()).collect::<Vec<_>>(),
        "day" => rows.iter().map(|r| r.day).collect::<Vec<_>>(),
        "day_of_week" => rows.iter().map(|r| r.day_of_week).collect::<Vec<_>>(),
        "day_name" => rows.iter().map(|r| r.day_name.as_str()).collect::<Vec<_>>(),
        "week_of_year" => rows.iter().map(|r| r.week_of_year).collect::<Vec<_>>(),
        "is_weekend" => rows.iter().map(|r| r.is_weekend).collect::<Vec<_>>(),
        "fiscal_year" => rows.iter().map(|r| r.fiscal_year).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn covers_range_inclusively_with_sequential_keys() {
        let rows = generate_time_dimension(ymd(2020, 1, 1), ymd(2020, 12, 31)).unwrap();
        assert_eq!(rows.len(), 366);
        assert_eq!(rows[0].date_key, 0);
        assert_eq!(rows[365].date_key, 365);
        assert_eq!(rows[365].date, ymd(2020, 12, 31));
    }

    #[test]
    fn single_day_range_is_allowed() {
        let rows = generate_time_dimension(ymd(2021, 3, 14), ymd(2021, 3, 14)).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = generate_time_dimension(ymd(2021, 1, 2), ymd(2021, 1, 1)).unwrap_err();
        assert!(matches!(err, OlapError::InvalidDateRange { .. }));
    }

    #[test]
    fn calendar_attributes_are_derived_from_the_date() {
        // 2020-01-01 was a Wednesday, ISO week 1.
        let rows = generate_time_dimension(ymd(2020, 1, 1), ymd(2020, 1, 5)).unwrap();
        let wed = &rows[0];
        assert_eq!(wed.day_of_week, 3);
        assert_eq!(wed.day_name, "Wednesday");
        assert_eq!(wed.month_name, "January");
        assert_eq!(wed.quarter, 1);
        assert_eq!(wed.week_of_year, 1);
        assert!(!wed.is_weekend);

        let sat = &rows[3];
        assert_eq!(sat.day_name, "Saturday");
        assert_eq!(sat.day_of_week, 6);
        assert!(sat.is_weekend);
        assert!(rows[4].is_weekend);
    }

    #[test]
    fn fiscal_year_rolls_over_in_april() {
        assert_eq!(fiscal_year(2022, 1), 2022);
        assert_eq!(fiscal_year(2022, 3), 2022);
        assert_eq!(fiscal_year(2022, 4), 2023);
        assert_eq!(fiscal_year(2022, 12), 2023);
    }

    #[test]
    fn frame_has_one_row_per_day() {
        let rows = generate_time_dimension(ymd(2024, 2, 1), ymd(2024, 2, 29)).unwrap();
        let df = time_frame(&rows).unwrap();
        assert_eq!(df.height(), 29);
        assert_eq!(df.width(), 12);
    }
}
