//! Sales fact table.
//!
//! Rows are generated one at a time from a single seeded random stream. The per-row draw order
//! is fixed (see [`generate_sales_fact`]), so a given seed and set of dimensions always yields
//! the same facts. A column-at-a-time generator drawing the same distributions would consume
//! the stream in a different order and produce different rows; no equivalence with such a
//! strategy is implied.

use polars::prelude::*;
use rand::Rng;

use super::customer::CustomerRow;
use super::geography::GeographyRow;
use super::product::ProductRow;
use super::round2;
use super::time::DateRow;
use crate::error::{OlapError, OlapResult};
use crate::types::StarTable;

pub const QUANTITY_RANGE: (i64, i64) = (1, 10);
pub const WEEKEND_BOOST_RANGE: (f64, f64) = (1.2, 1.8);
pub const PRICE_MODIFIER_RANGE: (f64, f64) = (0.8, 1.1);

/// One sales transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRow {
    pub sales_key: i64,
    pub date_key: i64,
    pub geography_key: i64,
    pub product_key: i64,
    pub customer_key: i64,
    pub quantity: i64,
    /// Base price of the product after the per-sale price modifier.
    pub unit_price: f64,
    /// Base cost of the product.
    pub unit_cost: f64,
    pub gross_sales: f64,
    pub total_cost: f64,
    pub profit: f64,
}

/// Borrowed view of the four dimensions the fact generator samples from.
#[derive(Debug, Clone, Copy)]
pub struct Dimensions<'a> {
    pub dates: &'a [DateRow],
    pub geographies: &'a [GeographyRow],
    pub products: &'a [ProductRow],
    pub customers: &'a [CustomerRow],
}

impl Dimensions<'_> {
    fn ensure_non_empty(&self) -> OlapResult<()> {
        let sizes = [
            (StarTable::Time, self.dates.len()),
            (StarTable::Geography, self.geographies.len()),
            (StarTable::Product, self.products.len()),
            (StarTable::Customer, self.customers.len()),
        ];
        match sizes.iter().find(|(_, len)| *len == 0) {
            Some((table, _)) => Err(OlapError::EmptyDimension {
                table: table.file_stem().to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Generate `num_records` facts keyed from 1.
///
/// Draw order per row: date, geography, product, customer, base quantity, weekend boost (only
/// on weekend dates), price modifier. Foreign keys are drawn uniformly from the rows passed in,
/// so they always exist in their dimension.
pub fn generate_sales_fact<R: Rng + ?Sized>(
    rng: &mut R,
    dims: Dimensions<'_>,
    num_records: usize,
) -> OlapResult<Vec<SaleRow>> {
    dims.ensure_non_empty()?;

    let mut rows = Vec::with_capacity(num_records);
    for idx in 0..num_records {
        let date = &dims.dates[rng.random_range(0..dims.dates.len())];
        let geography = &dims.geographies[rng.random_range(0..dims.geographies.len())];
        let product = &dims.products[rng.random_range(0..dims.products.len())];
        let customer = &dims.customers[rng.random_range(0..dims.customers.len())];

        let base_quantity = rng.random_range(QUANTITY_RANGE.0..=QUANTITY_RANGE.1);
        let quantity = if date.is_weekend {
            let boost = rng.random_range(WEEKEND_BOOST_RANGE.0..WEEKEND_BOOST_RANGE.1);
            ((base_quantity as f64 * boost).floor() as i64).max(1)
        } else {
            base_quantity
        };

        let modifier = rng.random_range(PRICE_MODIFIER_RANGE.0..PRICE_MODIFIER_RANGE.1);
        let unit_price = round2(product.unit_price * modifier);
        let gross_sales = round2(quantity as f64 * unit_price);
        let total_cost = round2(quantity as f64 * product.unit_cost);

        rows.push(SaleRow {
            sales_key: idx as i64 + 1,
            date_key: date.date_key,
            geography_key: geography.geography_key,
            product_key: product.product_key,
            customer_key: customer.customer_key,
            quantity,
            unit_price,
            unit_cost: product.unit_cost,
            gross_sales,
            total_cost,
            profit: round2(gross_sales - total_cost),
        });
    }
    Ok(rows)
}

/// Build the `fact_sales` frame in schema column order.
pub fn sales_frame(rows: &[SaleRow]) -> OlapResult<DataFrame> {
    let df = df!(
        "sales_key" => rows.iter().map(|r| r.sales_key).collect::<Vec<_>>(),
        "date_key" => rows.iter().map(|r| r.date_key).collect::<Vec<_>>(),
        "geography_key" => rows.iter().map(|r| r.geography_key).collect::<Vec<_>>(),
        "product_key" => rows.iter().map(|r| r.product_key).collect::<Vec<_>>(),
        "customer_key" => rows.iter().map(|r| r.customer_key).collect::<Vec<_>>(),
        "quantity" => rows.iter().map(|r| r.quantity).collect::<Vec<_>>(),
        "unit_price" => rows.iter().map(|r| r.unit_price).collect::<Vec<_>>(),
        "unit_cost" => rows.iter().map(|r| r.unit_cost).collect::<Vec<_>>(),
        "gross_sales" => rows.iter().map(|r| r.gross_sales).collect::<Vec<_>>(),
        "total_cost" => rows.iter().map(|r| r.total_cost).collect::<Vec<_>>(),
        "profit" => rows.iter().map(|r| r.profit).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::config::registration_start_date;
    use crate::generate::{
        generate_customer_dimension, generate_geography_dimension, generate_product_dimension,
        generate_time_dimension,
    };

    struct Fixture {
        dates: Vec<DateRow>,
        geographies: Vec<GeographyRow>,
        products: Vec<ProductRow>,
        customers: Vec<CustomerRow>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            Self {
                dates: generate_time_dimension(
                    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                    NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
                )
                .unwrap(),
                geographies: generate_geography_dimension(),
                products: generate_product_dimension(&mut rng),
                customers: generate_customer_dimension(&mut rng, 5, registration_start_date()),
            }
        }

        fn dims(&self) -> Dimensions<'_> {
            Dimensions {
                dates: &self.dates,
                geographies: &self.geographies,
                products: &self.products,
                customers: &self.customers,
            }
        }
    }

    fn facts(fx: &Fixture, n: usize) -> Vec<SaleRow> {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        generate_sales_fact(&mut rng, fx.dims(), n).unwrap()
    }

    #[test]
    fn generates_exactly_the_requested_rows() {
        let fx = Fixture::new();
        let rows = facts(&fx, 321);
        assert_eq!(rows.len(), 321);
        assert_eq!(rows[0].sales_key, 1);
        assert_eq!(rows[320].sales_key, 321);
        assert!(facts(&fx, 0).is_empty());
    }

    #[test]
    fn measures_are_consistent() {
        let fx = Fixture::new();
        for row in facts(&fx, 2_000) {
            assert!(row.quantity >= 1);
            assert!((row.profit - (row.gross_sales - row.total_cost)).abs() < 1e-6);
            assert!((row.gross_sales - round2(row.quantity as f64 * row.unit_price)).abs() < 1e-9);
            let product = &fx.products[(row.product_key - 1) as usize];
            assert_eq!(row.unit_cost, product.unit_cost);
            let lo = round2(product.unit_price * PRICE_MODIFIER_RANGE.0);
            let hi = round2(product.unit_price * PRICE_MODIFIER_RANGE.1);
            assert!(row.unit_price >= lo && row.unit_price <= hi);
        }
    }

    #[test]
    fn weekday_quantities_stay_in_base_range() {
        let fx = Fixture::new();
        for row in facts(&fx, 2_000) {
            let date = &fx.dates[row.date_key as usize];
            if date.is_weekend {
                // floor(10 * 1.8) is the largest possible boosted quantity.
                assert!(row.quantity <= 18);
            } else {
                assert!((QUANTITY_RANGE.0..=QUANTITY_RANGE.1).contains(&row.quantity));
            }
        }
    }

    #[test]
    fn empty_dimension_is_an_error() {
        let fx = Fixture::new();
        let dims = Dimensions {
            customers: &[],
            ..fx.dims()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let err = generate_sales_fact(&mut rng, dims, 10).unwrap_err();
        assert!(err.to_string().contains("dim_customer"));
    }

    #[test]
    fn same_seed_same_facts() {
        let fx = Fixture::new();
        assert_eq!(facts(&fx, 500), facts(&fx, 500));
    }
}
