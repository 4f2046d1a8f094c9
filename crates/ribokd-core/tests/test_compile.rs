//! Metadata compiler integration tests over zip/JSON fixtures.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use ribokd_core::{compile_z_metadata, discover_archives, DEFAULT_METADATA_COLS};
use serde_json::{json, Value};
use zip::write::SimpleFileOptions;

/// Write a `*_Z.json.zip` archive containing one JSON table.
fn write_archive(dir: &Path, name: &str, rows: Value) {
    let file = File::create(dir.join(name)).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let inner = name.strip_suffix(".zip").unwrap();
    writer
        .start_file(inner, SimpleFileOptions::default())
        .unwrap();
    writer.write_all(rows.to_string().as_bytes()).unwrap();
    writer.finish().unwrap();
}

#[test]
fn test_two_archives_three_of_five_shared() {
    let dir = tempfile::tempdir().unwrap();
    // foo and bar share AAAA/CCCC/GGGG; each has one private sequence,
    // 5 distinct sequences overall.
    write_archive(
        dir.path(),
        "RS_foo_Z.json.zip",
        json!([
            {"sequence": "AAAA", "log_kfold_est_nolig_Z_foo": 0.1, "log_kfold_est_lig_Z_foo": 1.1},
            {"sequence": "CCCC", "log_kfold_est_nolig_Z_foo": 0.2, "log_kfold_est_lig_Z_foo": 1.2},
            {"sequence": "GGGG", "log_kfold_est_nolig_Z_foo": 0.3, "log_kfold_est_lig_Z_foo": 1.3},
            {"sequence": "UUUU", "log_kfold_est_nolig_Z_foo": 0.4, "log_kfold_est_lig_Z_foo": 1.4},
        ]),
    );
    write_archive(
        dir.path(),
        "RS_bar_Z.json.zip",
        json!([
            {"sequence": "AAAA", "log_kfold_est_nolig_Z_bar": 2.1, "log_kfold_est_lig_Z_bar": 3.1},
            {"sequence": "CCCC", "log_kfold_est_nolig_Z_bar": 2.2, "log_kfold_est_lig_Z_bar": 3.2},
            {"sequence": "GGGG", "log_kfold_est_nolig_Z_bar": 2.3, "log_kfold_est_lig_Z_bar": 3.3},
            {"sequence": "ACGU", "log_kfold_est_nolig_Z_bar": 2.4, "log_kfold_est_lig_Z_bar": 3.4},
        ]),
    );

    let compiled = compile_z_metadata(dir.path(), DEFAULT_METADATA_COLS).unwrap();

    // sequence + two prediction columns per archive; no metadata columns in
    // the fixture.
    assert_eq!(compiled.height(), 3);
    assert_eq!(compiled.width(), 5);

    let mut sequences: Vec<String> = compiled
        .column("sequence")
        .unwrap()
        .str()
        .unwrap()
        .into_no_null_iter()
        .map(str::to_string)
        .collect();
    sequences.sort();
    assert_eq!(sequences, vec!["AAAA", "CCCC", "GGGG"]);

    for col in [
        "log_kfold_est_nolig_Z_foo",
        "log_kfold_est_lig_Z_foo",
        "log_kfold_est_nolig_Z_bar",
        "log_kfold_est_lig_Z_bar",
    ] {
        assert!(compiled.column(col).is_ok(), "missing column {col}");
    }
}

#[test]
fn test_inner_join_shrinkage_bound() {
    let dir = tempfile::tempdir().unwrap();
    write_archive(
        dir.path(),
        "RS_a_Z.json.zip",
        json!([
            {"sequence": "AAAA", "log_kfold_est_nolig_Z_a": 0.1, "log_kfold_est_lig_Z_a": 0.2},
            {"sequence": "CCCC", "log_kfold_est_nolig_Z_a": 0.1, "log_kfold_est_lig_Z_a": 0.2},
            {"sequence": "GGGG", "log_kfold_est_nolig_Z_a": 0.1, "log_kfold_est_lig_Z_a": 0.2},
        ]),
    );
    // Smallest archive: 2 rows.
    write_archive(
        dir.path(),
        "RS_b_Z.json.zip",
        json!([
            {"sequence": "AAAA", "log_kfold_est_nolig_Z_b": 0.3, "log_kfold_est_lig_Z_b": 0.4},
            {"sequence": "UUUU", "log_kfold_est_nolig_Z_b": 0.3, "log_kfold_est_lig_Z_b": 0.4},
        ]),
    );
    write_archive(
        dir.path(),
        "RS_c_Z.json.zip",
        json!([
            {"sequence": "AAAA", "log_kfold_est_nolig_Z_c": 0.5, "log_kfold_est_lig_Z_c": 0.6},
            {"sequence": "CCCC", "log_kfold_est_nolig_Z_c": 0.5, "log_kfold_est_lig_Z_c": 0.6},
            {"sequence": "GGGG", "log_kfold_est_nolig_Z_c": 0.5, "log_kfold_est_lig_Z_c": 0.6},
        ]),
    );

    let compiled = compile_z_metadata(dir.path(), DEFAULT_METADATA_COLS).unwrap();
    assert!(compiled.height() <= 2);
    // Only AAAA appears in all three archives.
    assert_eq!(compiled.height(), 1);
}

#[test]
fn test_missing_ligand_column_still_contributes_nolig() {
    let dir = tempfile::tempdir().unwrap();
    // Seed archive carries a metadata column and a full prediction pair.
    write_archive(
        dir.path(),
        "RS_foo_Z.json.zip",
        json!([
            {"sequence": "AAAA", "Design": "d1", "log_kfold_est_nolig_Z_foo": 0.1, "log_kfold_est_lig_Z_foo": 1.1},
            {"sequence": "CCCC", "Design": "d2", "log_kfold_est_nolig_Z_foo": 0.2, "log_kfold_est_lig_Z_foo": 1.2},
        ]),
    );
    // Second archive has no ligand column.
    write_archive(
        dir.path(),
        "RS_nolig_Z.json.zip",
        json!([
            {"sequence": "AAAA", "log_kfold_est_nolig_Z_nolig": 2.1},
            {"sequence": "CCCC", "log_kfold_est_nolig_Z_nolig": 2.2},
        ]),
    );

    let compiled = compile_z_metadata(dir.path(), &["Design", "Player"]).unwrap();

    // 1 (sequence) + 1 (Design; Player absent) + 2 (foo pair) + 1 (nolig only).
    assert_eq!(compiled.width(), 5);
    assert_eq!(compiled.height(), 2);
    assert!(compiled.column("Design").is_ok());
    assert!(compiled.column("Player").is_err());
    assert!(compiled.column("log_kfold_est_nolig_Z_nolig").is_ok());
}

#[test]
fn test_archive_without_nolig_column_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_archive(
        dir.path(),
        "RS_bad_Z.json.zip",
        json!([
            {"sequence": "AAAA", "log_kfold_est_lig_Z_bad": 1.0},
        ]),
    );
    write_archive(
        dir.path(),
        "RS_good_Z.json.zip",
        json!([
            {"sequence": "AAAA", "log_kfold_est_nolig_Z_good": 0.1, "log_kfold_est_lig_Z_good": 1.1},
            {"sequence": "CCCC", "log_kfold_est_nolig_Z_good": 0.2, "log_kfold_est_lig_Z_good": 1.2},
        ]),
    );

    let compiled = compile_z_metadata(dir.path(), DEFAULT_METADATA_COLS).unwrap();
    // The bad archive was skipped; the good one seeds the table on its own.
    assert_eq!(compiled.height(), 2);
    assert_eq!(compiled.width(), 3);
    assert!(compiled.column("log_kfold_est_lig_Z_bad").is_err());
}

#[test]
fn test_discovery_is_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    write_archive(dir.path(), "RS_zzz_Z.json.zip", json!([]));
    write_archive(dir.path(), "RS_aaa_Z.json.zip", json!([]));
    std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

    let archives = discover_archives(dir.path()).unwrap();
    let names: Vec<_> = archives
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["RS_aaa_Z.json.zip", "RS_zzz_Z.json.zip"]);
}

#[test]
fn test_empty_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(compile_z_metadata(dir.path(), DEFAULT_METADATA_COLS).is_err());
}
