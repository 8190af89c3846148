//! Logical schemas of the star-schema tables.
//!
//! Every table written by the generator and read by the analyzer is described by a
//! [`TableSchema`] (an ordered list of typed [`Field`]s). The schema is the contract between the
//! two pipelines: the storage layer validates files against it and casts loaded frames to it.

use std::fmt;

use polars::prelude::{DataFrame, DataType as PolarsDataType};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit signed integer (keys, quantities).
    Int64,
    /// 32-bit signed integer (calendar attributes).
    Int32,
    /// 64-bit floating point number (money).
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Calendar date without time zone.
    Date,
}

impl ColumnType {
    /// The Polars dtype a loaded column is cast to.
    pub fn to_polars(self) -> PolarsDataType {
        match self {
            Self::Int64 => PolarsDataType::Int64,
            Self::Int32 => PolarsDataType::Int32,
            Self::Float64 => PolarsDataType::Float64,
            Self::Bool => PolarsDataType::Boolean,
            Self::Utf8 => PolarsDataType::String,
            Self::Date => PolarsDataType::Date,
        }
    }
}

/// A single named, typed field in a [`TableSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Column name.
    pub name: String,
    /// Column type.
    pub column_type: ColumnType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered list of fields describing a stored table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Fields in file order.
    pub fields: Vec<Field>,
}

impl TableSchema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// The five tables of the sales star schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StarTable {
    Time,
    Geography,
    Product,
    Customer,
    Sales,
}

impl StarTable {
    /// All tables, dimensions first and the fact table last.
    pub const ALL: [StarTable; 5] = [
        StarTable::Time,
        StarTable::Geography,
        StarTable::Product,
        StarTable::Customer,
        StarTable::Sales,
    ];

    /// The four dimension tables.
    pub const DIMENSIONS: [StarTable; 4] = [
        StarTable::Time,
        StarTable::Geography,
        StarTable::Product,
        StarTable::Customer,
    ];

    /// File name without extension; also the table name registered with the SQL backend.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Time => "dim_time",
            Self::Geography => "dim_geography",
            Self::Product => "dim_product",
            Self::Customer => "dim_customer",
            Self::Sales => "fact_sales",
        }
    }

    /// Primary key column. For dimensions this is also the fact table's foreign key column.
    pub fn key_column(self) -> &'static str {
        match self {
            Self::Time => "date_key",
            Self::Geography => "geography_key",
            Self::Product => "product_key",
            Self::Customer => "customer_key",
            Self::Sales => "sales_key",
        }
    }

    /// Returns `true` for the four dimension tables.
    pub fn is_dimension(self) -> bool {
        !matches!(self, Self::Sales)
    }

    /// Column layout of the table, in file order.
    pub fn schema(self) -> TableSchema {
        use ColumnType::*;

        let fields: &[(&str, ColumnType)] = match self {
            Self::Time => &[
                ("date_key", Int64),
                ("date", Date),
                ("year", Int32),
                ("quarter", Int32),
                ("month", Int32),
                ("month_name", Utf8),
                ("day", Int32),
                ("day_of_week", Int32),
                ("day_name", Utf8),
                ("week_of_year", Int32),
                ("is_weekend", Bool),
                ("fiscal_year", Int32),
            ],
            Self::Geography => &[
                ("geography_key", Int64),
                ("city", Utf8),
                ("country", Utf8),
                ("region", Utf8),
            ],
            Self::Product => &[
                ("product_key", Int64),
                ("sku", Utf8),
                ("product_name", Utf8),
                ("product_type", Utf8),
                ("subcategory", Utf8),
                ("category", Utf8),
                ("unit_cost", Float64),
                ("unit_price", Float64),
            ],
            Self::Customer => &[
                ("customer_key", Int64),
                ("customer_id", Utf8),
                ("customer_type", Utf8),
                ("registration_date", Date),
            ],
            Self::Sales => &[
                ("sales_key", Int64),
                ("date_key", Int64),
                ("geography_key", Int64),
                ("product_key", Int64),
                ("customer_key", Int64),
                ("quantity", Int64),
                ("unit_price", Float64),
                ("unit_cost", Float64),
                ("gross_sales", Float64),
                ("total_cost", Float64),
                ("profit", Float64),
            ],
        };

        TableSchema::new(
            fields
                .iter()
                .map(|(name, ty)| Field::new(*name, *ty))
                .collect(),
        )
    }
}

impl fmt::Display for StarTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// The five tables as Polars frames, in [`StarTable::schema`] column order.
///
/// Produced by the generator ([`crate::generate::StarSchema::to_frames`]) or by loading stored
/// files ([`crate::storage::load_star_frames`]); consumed by the analyzer backends.
#[derive(Debug, Clone)]
pub struct StarFrames {
    pub time: DataFrame,
    pub geography: DataFrame,
    pub product: DataFrame,
    pub customer: DataFrame,
    pub sales: DataFrame,
}

impl StarFrames {
    /// Borrow the frame of `table`.
    pub fn get(&self, table: StarTable) -> &DataFrame {
        match table {
            StarTable::Time => &self.time,
            StarTable::Geography => &self.geography,
            StarTable::Product => &self.product,
            StarTable::Customer => &self.customer,
            StarTable::Sales => &self.sales,
        }
    }

    /// Mutably borrow the frame of `table` (writers need `&mut DataFrame`).
    pub fn get_mut(&mut self, table: StarTable) -> &mut DataFrame {
        match table {
            StarTable::Time => &mut self.time,
            StarTable::Geography => &mut self.geography,
            StarTable::Product => &mut self.product,
            StarTable::Customer => &mut self.customer,
            StarTable::Sales => &mut self.sales,
        }
    }
}
