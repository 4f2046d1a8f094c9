//! JSON table IO helpers.
//!
//! Tables are stored as one JSON document: an array of row objects.
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

/// Read a JSON table (array of row objects) into a DataFrame.
pub fn read_json_table(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let df = JsonReader::new(file)
        .with_json_format(JsonFormat::Json)
        .finish()
        .with_context(|| format!("Failed to parse JSON table {}", path.display()))?;
    Ok(df)
}

/// Write a DataFrame to `path` as a single JSON document.
pub fn write_json_table(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    JsonWriter::new(&mut file)
        .with_json_format(JsonFormat::Json)
        .finish(df)
        .with_context(|| format!("Failed to write JSON table {}", path.display()))?;
    Ok(())
}
