//! Customer dimension.

use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use rand::Rng;

use crate::config::REGISTRATION_WINDOW_DAYS;
use crate::error::OlapResult;

pub const CUSTOMER_TYPES: [&str; 3] = ["Individual", "Small Business", "Enterprise"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRow {
    pub customer_key: i64,
    pub customer_id: String,
    pub customer_type: String,
    pub registration_date: NaiveDate,
}

/// Draw `count` customers keyed from 1.
///
/// Draw order per customer: type, then registration day offset from `registration_start`.
pub fn generate_customer_dimension<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    registration_start: NaiveDate,
) -> Vec<CustomerRow> {
    (1..=count as i64)
        .map(|customer_key| {
            let customer_type = CUSTOMER_TYPES[rng.random_range(0..CUSTOMER_TYPES.len())];
            let offset = rng.random_range(0..=REGISTRATION_WINDOW_DAYS);
            CustomerRow {
                customer_key,
                customer_id: format!("CUST{customer_key:06}"),
                customer_type: customer_type.to_string(),
                registration_date: registration_start + Duration::days(offset),
            }
        })
        .collect()
}

/// Build the `dim_customer` frame in schema column order.
pub fn customer_frame(rows: &[CustomerRow]) -> OlapResult<DataFrame> {
    let df = df!(
        "customer_key" => rows.iter().map(|r| r.customer_key).collect::<Vec<_>>(),
        "customer_id" => rows.iter().map(|r| r.customer_id.as_str()).collect::<Vec<_>>(),
        "customer_type" => rows.iter().map(|r| r.customer_type.as_str()).collect::<Vec<_>>(),
        "registration_date" => rows.iter().map(|r| r.registration_date).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::config::registration_start_date;

    #[test]
    fn ids_types_and_dates_follow_the_rules() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let start = registration_start_date();
        let rows = generate_customer_dimension(&mut rng, 250, start);

        assert_eq!(rows.len(), 250);
        assert_eq!(rows[0].customer_id, "CUST000001");
        assert_eq!(rows[249].customer_id, "CUST000250");

        let last_day = start + Duration::days(REGISTRATION_WINDOW_DAYS);
        for row in &rows {
            assert!(CUSTOMER_TYPES.contains(&row.customer_type.as_str()));
            assert!(row.registration_date >= start && row.registration_date <= last_day);
        }
        // 250 uniform draws over three types hit all of them.
        for ty in CUSTOMER_TYPES {
            assert!(rows.iter().any(|r| r.customer_type == ty), "{ty} never drawn");
        }
    }

    #[test]
    fn zero_customers_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(generate_customer_dimension(&mut rng, 0, registration_start_date()).is_empty());
    }
}
