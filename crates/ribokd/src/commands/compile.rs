use std::path::Path;

use anyhow::Result;
use ribokd_core::{compile_z_metadata, write_json_table, DEFAULT_METADATA_COLS};

pub fn execute(
    data_directory: &Path,
    output: &Path,
    metadata_cols: Option<Vec<String>>,
) -> Result<()> {
    let cols: Vec<&str> = match &metadata_cols {
        Some(cols) => cols.iter().map(String::as_str).collect(),
        None => DEFAULT_METADATA_COLS.to_vec(),
    };

    let mut compiled = compile_z_metadata(data_directory, &cols)?;
    write_json_table(output, &mut compiled)?;
    println!("Saved to {}", output.display());

    let prediction_cols = compiled
        .get_column_names()
        .iter()
        .filter(|name| name.contains("log_kfold"))
        .count();
    println!();
    println!("{}", "=".repeat(50));
    println!("SUMMARY");
    println!("{}", "=".repeat(50));
    println!("Total sequences: {}", compiled.height());
    println!("Total prediction columns: {prediction_cols}");
    Ok(())
}
