//! Product dimension: a static category -> subcategory -> product type hierarchy, expanded into
//! 3-8 randomly priced SKUs per product type.

use polars::prelude::*;
use rand::Rng;

use super::round2;
use crate::error::OlapResult;

type Subcategory = (&'static str, &'static [&'static str]);

/// Categories in key-assignment order, each with its subcategories and product types.
pub const CATALOG: &[(&str, &[Subcategory])] = &[
    (
        "Electronics",
        &[
            ("Computers", &["Laptop", "Desktop", "Tablet", "Monitor"]),
            ("Mobile", &["Smartphone", "Feature Phone", "Accessories"]),
            ("Audio", &["Headphones", "Speakers", "Microphone"]),
        ],
    ),
    (
        "Clothing",
        &[
            ("Men", &["Shirts", "Pants", "Shoes", "Accessories"]),
            ("Women", &["Dresses", "Tops", "Shoes", "Accessories"]),
            ("Kids", &["Clothing", "Shoes", "Toys"]),
        ],
    ),
    (
        "Home & Garden",
        &[
            ("Furniture", &["Chairs", "Tables", "Sofas", "Storage"]),
            ("Kitchen", &["Appliances", "Cookware", "Utensils"]),
            ("Garden", &["Tools", "Plants", "Outdoor Furniture"]),
        ],
    ),
];

pub const MIN_SKUS_PER_TYPE: usize = 3;
pub const MAX_SKUS_PER_TYPE: usize = 8;
pub const UNIT_COST_RANGE: (f64, f64) = (10.0, 500.0);
pub const UNIT_PRICE_RANGE: (f64, f64) = (15.0, 750.0);

/// A single SKU of the product dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub product_key: i64,
    pub sku: String,
    pub product_name: String,
    pub product_type: String,
    pub subcategory: String,
    pub category: String,
    pub unit_cost: f64,
    pub unit_price: f64,
}

/// `"LAP0001"`: the first three characters of the product type, upper-cased, plus the key.
pub fn sku_code(product_type: &str, product_key: i64) -> String {
    let prefix: String = product_type.chars().take(3).collect::<String>().to_uppercase();
    format!("{prefix}{product_key:04}")
}

/// Walk [`CATALOG`] and draw SKUs for every product type.
///
/// Draw order per product type: SKU count, then `(unit_cost, unit_price)` per SKU.
pub fn generate_product_dimension<R: Rng + ?Sized>(rng: &mut R) -> Vec<ProductRow> {
    let mut rows = Vec::new();
    for (category, subcategories) in CATALOG {
        for (subcategory, product_types) in *subcategories {
            for product_type in *product_types {
                let skus = rng.random_range(MIN_SKUS_PER_TYPE..=MAX_SKUS_PER_TYPE);
                for i in 0..skus {
                    let product_key = rows.len() as i64 + 1;
                    let model = char::from(b'A' + i as u8);
                    rows.push(ProductRow {
                        product_key,
                        sku: sku_code(product_type, product_key),
                        product_name: format!("{product_type} Model {model}"),
                        product_type: (*product_type).to_string(),
                        subcategory: (*subcategory).to_string(),
                        category: (*category).to_string(),
                        unit_cost: round2(rng.random_range(UNIT_COST_RANGE.0..UNIT_COST_RANGE.1)),
                        unit_price: round2(
                            rng.random_range(UNIT_PRICE_RANGE.0..UNIT_PRICE_RANGE.1),
                        ),
                    });
                }
            }
        }
    }
    rows
}

/// Build the `dim_product` frame in schema column order.
pub fn product_frame(rows: &[ProductRow]) -> OlapResult<DataFrame> {
    let df = df!(
        "product_key" => rows.iter().map(|r| r.product_key).collect::<Vec<_>>(),
        "sku" => rows.iter().map(|r| r.sku.as_str()).collect::<Vec<_>>(),
        "product_name" => rows.iter().map(|r| r.product_name.as_str()).collect::<Vec<_>>(),
        "product_type" => rows.iter().map(|r| r.product_type.as_str()).collect::<Vec<_>>(),
        "subcategory" => rows.iter().map(|r| r.subcategory.as_str()).collect::<Vec<_>>(),
        "category" => rows.iter().map(|r| r.category.as_str()).collect::<Vec<_>>(),
        "unit_cost" => rows.iter().map(|r| r.unit_cost).collect::<Vec<_>>(),
        "unit_price" => rows.iter().map(|r| r.unit_price).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn products() -> Vec<ProductRow> {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        generate_product_dimension(&mut rng)
    }

    #[test]
    fn sku_code_uses_type_prefix_and_padded_key() {
        assert_eq!(sku_code("Laptop", 1), "LAP0001");
        assert_eq!(sku_code("Feature Phone", 27), "FEA0027");
        assert_eq!(sku_code("Tv", 12345), "TV12345");
    }

    #[test]
    fn every_product_type_gets_three_to_eight_skus() {
        let rows = products();
        let mut start = 0;
        let mut types = 0;
        while start < rows.len() {
            let key = (&rows[start].subcategory, &rows[start].product_type);
            let run = rows[start..]
                .iter()
                .take_while(|r| (&r.subcategory, &r.product_type) == key)
                .count();
            assert!((MIN_SKUS_PER_TYPE..=MAX_SKUS_PER_TYPE).contains(&run), "{key:?}: {run}");
            assert_eq!(rows[start].product_name, format!("{} Model A", key.1));
            start += run;
            types += 1;
        }
        assert_eq!(types, 31);
    }

    #[test]
    fn keys_are_sequential_and_prices_in_range() {
        let rows = products();
        for (idx, row) in rows.iter().enumerate() {
            assert_eq!(row.product_key, idx as i64 + 1);
            assert!((UNIT_COST_RANGE.0..=UNIT_COST_RANGE.1).contains(&row.unit_cost));
            assert!((UNIT_PRICE_RANGE.0..=UNIT_PRICE_RANGE.1).contains(&row.unit_price));
            assert_eq!(row.unit_cost, round2(row.unit_cost));
            assert_eq!(row.unit_price, round2(row.unit_price));
        }
    }

    #[test]
    fn same_seed_same_catalog() {
        assert_eq!(products(), products());
    }
}
