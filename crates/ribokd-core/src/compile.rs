//! Compiles per-model prediction archives into one wide Z-metadata table.
//!
//! Each `*_Z.json.zip` archive holds a single JSON table of cross-validation
//! predictions from one trained model. The compiler seeds an output table
//! from the first usable archive (sequence + metadata + its prediction pair)
//! and inner-joins every later archive's prediction pair onto it, keyed by
//! `sequence`. The inner join drops sequences absent from any one archive;
//! see DESIGN.md before changing that policy.
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use itertools::Itertools;
use polars::prelude::*;

/// Metadata columns retained from the seed archive when none are specified.
pub const DEFAULT_METADATA_COLS: &[&str] = &[
    "Puzzle_Name",
    "Design",
    "Player",
    "Round",
    "Dataset",
    "logkd_nolig_scaled",
];

const ARCHIVE_SUFFIX: &str = "_Z.json.zip";

/// The pair of prediction columns contributed by one model, keyed by the
/// package identifier embedded in the archive filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelColumns {
    /// Identifier derived from the filename, e.g. `foo` for `RS_foo_Z.json.zip`.
    pub package: String,
    /// Ligand-bound estimate column, e.g. `log_kfold_est_lig_Z_foo`.
    pub lig: String,
    /// Ligand-free estimate column, e.g. `log_kfold_est_nolig_Z_foo`. Required.
    pub nolig: String,
}

impl ModelColumns {
    pub fn from_package(package: &str) -> Self {
        Self {
            package: package.to_string(),
            lig: format!("log_kfold_est_lig_Z_{package}"),
            nolig: format!("log_kfold_est_nolig_Z_{package}"),
        }
    }

    /// Derive the package identifier by stripping the fixed `RS_` prefix and
    /// `_Z.json.zip` suffix from the archive filename.
    pub fn from_archive_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("Archive path has no filename: {}", path.display()))?;
        let stem = name
            .strip_suffix(ARCHIVE_SUFFIX)
            .or_else(|| name.strip_suffix(".json.zip"))
            .map(|s| s.strip_suffix("_Z").unwrap_or(s))
            .ok_or_else(|| anyhow!("Not a *_Z.json.zip archive: {name}"))?;
        let package = stem.strip_prefix("RS_").unwrap_or(stem);
        Ok(Self::from_package(package))
    }
}

/// List `*_Z.json.zip` archives in `directory`, lexicographic filename order.
pub fn discover_archives(directory: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(directory)
        .with_context(|| format!("Failed to read directory {}", directory.display()))?;
    let archives = entries
        .filter_map_ok(|entry| {
            let path = entry.path();
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(ARCHIVE_SUFFIX))
                .then_some(path)
        })
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .sorted()
        .collect();
    Ok(archives)
}

/// Read the single JSON table contained in a zip archive.
fn read_archive_table(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive =
        ::zip::ZipArchive::new(file).with_context(|| format!("Malformed zip {}", path.display()))?;
    if archive.is_empty() {
        bail!("Archive {} contains no files", path.display());
    }
    let mut buf = Vec::new();
    archive.by_index(0)?.read_to_end(&mut buf)?;
    let df = JsonReader::new(Cursor::new(buf))
        .with_json_format(JsonFormat::Json)
        .finish()
        .with_context(|| format!("Failed to parse JSON table in {}", path.display()))?;
    Ok(df)
}

/// Compile all prediction archives under `directory` into one wide table.
///
/// `metadata_cols` names the columns to carry over from the seed archive, in
/// order; names absent from that archive are silently dropped. Archives whose
/// no-ligand column is missing are skipped with a warning. Errors if the
/// directory yields no usable archive.
pub fn compile_z_metadata(directory: &Path, metadata_cols: &[&str]) -> Result<DataFrame> {
    let archives = discover_archives(directory)?;
    if archives.is_empty() {
        bail!(
            "No *_Z.json.zip archives found in {}",
            directory.display()
        );
    }

    let mut merged: Option<DataFrame> = None;
    for path in &archives {
        let columns = ModelColumns::from_archive_path(path)?;
        tracing::info!(
            archive = %path.display(),
            package = %columns.package,
            "Processing archive"
        );
        let df = read_archive_table(path)?;

        if df.column(&columns.nolig).is_err() {
            tracing::warn!(
                archive = %path.display(),
                column = %columns.nolig,
                "No-ligand prediction column not found, skipping archive"
            );
            continue;
        }
        let has_lig = df.column(&columns.lig).is_ok();

        merged = Some(match merged.take() {
            // The first usable archive seeds the table and keeps metadata.
            None => {
                let mut keep: Vec<String> = vec!["sequence".to_string()];
                keep.extend(
                    metadata_cols
                        .iter()
                        .filter(|c| df.column(c).is_ok())
                        .map(|c| c.to_string()),
                );
                keep.push(columns.nolig.clone());
                if has_lig {
                    keep.push(columns.lig.clone());
                }
                df.select(keep)?
            }
            // Later archives contribute only their prediction pair.
            Some(acc) => {
                let mut keep = vec!["sequence".to_string(), columns.nolig.clone()];
                if has_lig {
                    keep.push(columns.lig.clone());
                }
                let predictions = df.select(keep)?;
                acc.lazy()
                    .join(
                        predictions.lazy(),
                        [col("sequence")],
                        [col("sequence")],
                        JoinArgs::new(JoinType::Inner),
                    )
                    .collect()?
            }
        });
    }

    merged.ok_or_else(|| {
        anyhow!(
            "No archive in {} contained its no-ligand prediction column",
            directory.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_columns_from_archive_name() -> Result<()> {
        let cols = ModelColumns::from_archive_path(Path::new("/data/RS_foo_Z.json.zip"))?;
        assert_eq!(cols.package, "foo");
        assert_eq!(cols.nolig, "log_kfold_est_nolig_Z_foo");
        assert_eq!(cols.lig, "log_kfold_est_lig_Z_foo");
        Ok(())
    }

    #[test]
    fn test_model_columns_without_prefix() -> Result<()> {
        // The RS_ prefix is optional; only the suffix pattern is required.
        let cols = ModelColumns::from_archive_path(Path::new("bar_Z.json.zip"))?;
        assert_eq!(cols.package, "bar");
        Ok(())
    }

    #[test]
    fn test_non_archive_name_rejected() {
        assert!(ModelColumns::from_archive_path(Path::new("RS_foo.json")).is_err());
    }
}
