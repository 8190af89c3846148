#![allow(dead_code)]

use chrono::NaiveDate;
use polars::prelude::*;

use olap_sample_data::config::GeneratorConfig;
use olap_sample_data::generate::{
    CustomerRow, GeographyRow, ProductRow, SaleRow, StarSchema, StarSchemaGenerator,
    generate_time_dimension, round2,
};
use olap_sample_data::types::StarFrames;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn geo(key: i64, city: &str, country: &str, region: &str) -> GeographyRow {
    GeographyRow {
        geography_key: key,
        city: city.to_string(),
        country: country.to_string(),
        region: region.to_string(),
    }
}

fn product(key: i64, name: &str, ty: &str, sub: &str, category: &str) -> ProductRow {
    ProductRow {
        product_key: key,
        sku: format!("{}{key:04}", &ty[..3].to_uppercase()),
        product_name: name.to_string(),
        product_type: ty.to_string(),
        subcategory: sub.to_string(),
        category: category.to_string(),
        unit_cost: 10.0,
        unit_price: 20.0,
    }
}

fn customer(key: i64, ty: &str) -> CustomerRow {
    CustomerRow {
        customer_key: key,
        customer_id: format!("CUST{key:06}"),
        customer_type: ty.to_string(),
        registration_date: date(2020, 6, 1),
    }
}

#[allow(clippy::too_many_arguments)]
fn sale(
    key: i64,
    date_key: i64,
    geography_key: i64,
    product_key: i64,
    customer_key: i64,
    quantity: i64,
    unit_price: f64,
    unit_cost: f64,
) -> SaleRow {
    let gross_sales = round2(quantity as f64 * unit_price);
    let total_cost = round2(quantity as f64 * unit_cost);
    SaleRow {
        sales_key: key,
        date_key,
        geography_key,
        product_key,
        customer_key,
        quantity,
        unit_price,
        unit_cost,
        gross_sales,
        total_cost,
        profit: round2(gross_sales - total_cost),
    }
}

/// Four sales over 2023-12-29 (Fri) .. 2024-01-01 (Mon).
///
/// | key | date | city | product | customer | qty | gross | profit |
/// | --- | --- | --- | --- | --- | --- | --- | --- |
/// | 1 | Fri | London | Laptop | Individual | 2 | 200 | 80 |
/// | 2 | Sat | Paris | Desk | Enterprise | 1 | 50 | 15 |
/// | 3 | Sun | Tokyo | Laptop | Individual | 3 | 300 | 120 |
/// | 4 | Mon | London | Desk | Enterprise | 4 | 200 | 80 |
pub fn fixture_schema() -> StarSchema {
    StarSchema {
        dates: generate_time_dimension(date(2023, 12, 29), date(2024, 1, 1)).unwrap(),
        geographies: vec![
            geo(1, "London", "UK", "Europe"),
            geo(2, "Paris", "France", "Europe"),
            geo(3, "Tokyo", "Japan", "Asia Pacific"),
        ],
        products: vec![
            product(1, "Laptop Model A", "Laptops", "Computers", "Electronics"),
            product(2, "Desk Model A", "Desks", "Office Furniture", "Furniture"),
        ],
        customers: vec![customer(1, "Individual"), customer(2, "Enterprise")],
        sales: vec![
            sale(1, 0, 1, 1, 1, 2, 100.0, 60.0),
            sale(2, 1, 2, 2, 2, 1, 50.0, 35.0),
            sale(3, 2, 3, 1, 1, 3, 100.0, 60.0),
            sale(4, 3, 1, 2, 2, 4, 50.0, 30.0),
        ],
    }
}

pub fn fixture_frames() -> StarFrames {
    fixture_schema().to_frames().unwrap()
}

pub fn generated_frames() -> StarFrames {
    let cfg = GeneratorConfig {
        customer_count: 30,
        sales_records: 3_000,
        ..Default::default()
    };
    StarSchemaGenerator::new(cfg)
        .generate()
        .unwrap()
        .to_frames()
        .unwrap()
}

pub fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect()
}

pub fn str_values(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap().to_string())
        .collect()
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect()
}
