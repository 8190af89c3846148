//! CSV persistence.

use std::fs::File;
use std::path::Path;

use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};

use super::conform_to_schema;
use crate::error::{OlapError, OlapResult};
use crate::types::TableSchema;

/// Write `df` as a comma-separated file with a header row.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> OlapResult<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Read a CSV table and cast it to `schema`.
///
/// Rules:
///
/// - The file must have a header row.
/// - Headers must contain all schema fields (order can differ; extra columns are dropped).
/// - ISO dates (`YYYY-MM-DD`) are parsed into `Date` columns.
pub fn read_csv(path: impl AsRef<Path>, schema: &TableSchema) -> OlapResult<DataFrame> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    validate_csv_headers(&mut rdr, schema)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|opts| opts.with_try_parse_dates(true))
        .into_reader_with_file_handle(File::open(path)?)
        .finish()?;
    conform_to_schema(df, schema)
}

/// Check that a CSV reader's header row names every field of `schema`.
pub fn validate_csv_headers<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &TableSchema,
) -> OlapResult<()> {
    let headers = rdr.headers()?.clone();
    for field in &schema.fields {
        if !headers.iter().any(|h| h == field.name) {
            return Err(OlapError::SchemaMismatch {
                message: format!(
                    "missing required column '{field}'. headers={:?}",
                    headers.iter().collect::<Vec<_>>(),
                    field = field.name
                ),
            });
        }
    }
    Ok(())
}
