//! Integration tests for TableFilterService with CSV-backed frames

use std::io::Write;
use std::path::PathBuf;

use firefly_filter::filter::{ColumnDef, FilterSet};
use firefly_filter::TableFilterService;
use polars::prelude::*;
use tempfile::NamedTempFile;

fn write_catalog() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "name,ra,dec,mag,band").unwrap();
    writeln!(file, "M31,10.68,41.27,3.44,J").unwrap();
    writeln!(file, "M33,23.46,30.66,5.72,H").unwrap();
    writeln!(file, "NGC 253,11.89,-25.29,7.1,K").unwrap();
    writeln!(file, "M81,148.89,69.07,6.94,J").unwrap();
    writeln!(file, "Centaurus A,201.37,-43.02,6.84,null").unwrap();
    file.flush().unwrap();
    file
}

fn read_frame(path: PathBuf) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .unwrap()
        .finish()
        .unwrap()
}

fn names(df: &DataFrame) -> Vec<String> {
    df.column("name")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

fn view_for(df: &DataFrame) -> FilterSet {
    let defs: Vec<ColumnDef> = df
        .get_column_names()
        .iter()
        .map(|n| ColumnDef::new(n.as_str()))
        .collect();
    FilterSet::new(&defs)
}

#[test]
fn column_filters_select_rows() {
    let file = write_catalog();
    let df = read_frame(file.path().to_path_buf());
    let mut view = view_for(&df);
    view.set_column_text("dec", "< 0");
    view.set_column_text("mag", "> 7");

    let wire = view.get_filters(true).unwrap();
    let out = TableFilterService::filter_dataframe(&df, &wire).unwrap();
    assert_eq!(names(&out), vec!["NGC 253"]);
}

#[test]
fn in_and_like_filters() {
    let file = write_catalog();
    let df = read_frame(file.path().to_path_buf());
    let mut view = view_for(&df);
    view.set_column_text("band", "j,h");
    view.set_column_text("name", "m3");

    let wire = view.get_filters(false).unwrap();
    assert_eq!(wire, vec!["name LIKE m3", "band IN (j,h)"]);
    let out = TableFilterService::filter_dataframe(&df, &wire).unwrap();
    assert_eq!(names(&out), vec!["M31", "M33"]);
}

#[test]
fn system_filters_apply_when_included() {
    let file = write_catalog();
    let df = read_frame(file.path().to_path_buf());
    let mut view = view_for(&df);
    view.set_filters(["#band = null"]);

    let without = view.get_filters(false).unwrap();
    assert_eq!(TableFilterService::filter_dataframe(&df, &without).unwrap().height(), 5);

    let with = view.get_filters(true).unwrap();
    let out = TableFilterService::filter_dataframe(&df, &with).unwrap();
    assert_eq!(names(&out), vec!["Centaurus A"]);
}

#[test]
fn hidden_filter_on_missing_column_is_reported() {
    let file = write_catalog();
    let df = read_frame(file.path().to_path_buf());
    let mut view = view_for(&df);
    view.set_filters(["redshift > 0.1"]);

    let wire = view.get_filters(false).unwrap();
    assert!(TableFilterService::filter_dataframe(&df, &wire).is_err());
}
