//! Parquet persistence.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use polars::prelude::{DataFrame, ParquetReader, ParquetWriter, SerReader};

use super::conform_to_schema;
use crate::error::{OlapError, OlapResult};
use crate::types::TableSchema;

/// Write `df` as a Parquet file with the writer's default compression.
pub fn write_parquet(df: &mut DataFrame, path: impl AsRef<Path>) -> OlapResult<()> {
    let mut file = File::create(path)?;
    ParquetWriter::new(&mut file).finish(df)?;
    Ok(())
}

/// Read a Parquet table and cast it to `schema`.
///
/// The footer is inspected first so a file missing a schema column fails with
/// [`OlapError::SchemaMismatch`] before any data is decoded.
pub fn read_parquet(path: impl AsRef<Path>, schema: &TableSchema) -> OlapResult<DataFrame> {
    let path = path.as_ref();
    validate_parquet_columns(path, schema)?;

    let df = ParquetReader::new(File::open(path)?).finish()?;
    conform_to_schema(df, schema)
}

/// Check that every field of `schema` exists as a Parquet leaf column.
pub fn validate_parquet_columns(path: impl AsRef<Path>, schema: &TableSchema) -> OlapResult<()> {
    let reader = SerializedFileReader::new(File::open(path)?)?;
    let available = parquet_leaf_column_paths(&reader);
    for field in &schema.fields {
        if !available.contains(field.name.as_str()) {
            return Err(OlapError::SchemaMismatch {
                message: format!("missing required column '{}'", field.name),
            });
        }
    }
    Ok(())
}

/// Row count from the file footer, without decoding any data pages.
pub fn parquet_row_count(path: impl AsRef<Path>) -> OlapResult<i64> {
    let reader = SerializedFileReader::new(File::open(path)?)?;
    Ok(reader.metadata().file_metadata().num_rows())
}

fn parquet_leaf_column_paths<R: ChunkReader + 'static>(
    reader: &SerializedFileReader<R>,
) -> HashSet<String> {
    reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.path().string())
        .collect()
}
