//! Geography dimension: a static region -> country -> city hierarchy.

use polars::prelude::*;

use crate::error::OlapResult;

type Country = (&'static str, &'static [&'static str]);

/// Regions in key-assignment order, each with its countries and cities.
pub const REGIONS: &[(&str, &[Country])] = &[
    (
        "North America",
        &[
            ("USA", &["New York", "Los Angeles", "Chicago", "Houston", "Phoenix"]),
            ("Canada", &["Toronto", "Vancouver", "Montreal", "Calgary"]),
            ("Mexico", &["Mexico City", "Guadalajara", "Monterrey"]),
        ],
    ),
    (
        "Europe",
        &[
            ("Germany", &["Berlin", "Munich", "Hamburg", "Frankfurt"]),
            ("France", &["Paris", "Lyon", "Marseille", "Toulouse"]),
            ("UK", &["London", "Manchester", "Birmingham", "Glasgow"]),
            ("Italy", &["Rome", "Milan", "Naples", "Turin"]),
            ("Spain", &["Madrid", "Barcelona", "Valencia", "Seville"]),
        ],
    ),
    (
        "Asia Pacific",
        &[
            ("China", &["Beijing", "Shanghai", "Guangzhou", "Shenzhen"]),
            ("Japan", &["Tokyo", "Osaka", "Nagoya", "Fukuoka"]),
            ("Australia", &["Sydney", "Melbourne", "Brisbane", "Perth"]),
            ("India", &["Mumbai", "Delhi", "Bangalore", "Chennai"]),
            ("South Korea", &["Seoul", "Busan", "Incheon"]),
        ],
    ),
    (
        "Latin America",
        &[
            ("Brazil", &["São Paulo", "Rio de Janeiro", "Brasília"]),
            ("Argentina", &["Buenos Aires", "Córdoba", "Rosario"]),
            ("Chile", &["Santiago", "Valparaíso", "Concepción"]),
            ("Colombia", &["Bogotá", "Medellín", "Cali"]),
        ],
    ),
];

/// A single city of the geography dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeographyRow {
    pub geography_key: i64,
    pub city: String,
    pub country: String,
    pub region: String,
}

/// Flatten [`REGIONS`] into one row per city, keyed from 1 in iteration order.
pub fn generate_geography_dimension() -> Vec<GeographyRow> {
    let mut rows = Vec::new();
    for (region, countries) in REGIONS {
        for (country, cities) in *countries {
            for city in *cities {
                rows.push(GeographyRow {
                    geography_key: rows.len() as i64 + 1,
                    city: (*city).to_string(),
                    country: (*country).to_string(),
                    region: (*region).to_string(),
                });
            }
        }
    }
    rows
}

/// Build the `dim_geography` frame in schema column order.
pub fn geography_frame(rows: &[GeographyRow]) -> OlapResult<DataFrame> {
    let df = df!(
        "geography_key" => rows.iter().map(|r| r.geography_key).collect::<Vec<_>>(),
        "city" => rows.iter().map(|r| r.city.as_str()).collect::<Vec<_>>(),
        "country" => rows.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
        "region" => rows.iter().map(|r| r.region.as_str()).collect::<Vec<_>>(),
    )?;
    Ok(df)
}
