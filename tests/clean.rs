use kira_geoclean::clean::{DataCleaner, default_missing_values};
use kira_geoclean::table::{MetadataTable, RawExpressionTable};

fn row(values: &[Option<&str>]) -> Vec<Option<String>> {
    values.iter().map(|value| value.map(str::to_string)).collect()
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn messy_table() -> MetadataTable {
    MetadataTable::from_rows(
        columns(&["Sample ID", "Cell-Type", "Notes"]),
        vec![
            row(&[Some("GSM1"), Some("  T   cell "), Some("N/A")]),
            row(&[Some("GSM2"), Some("B\u{0007}cell"), Some(" N/A ")]),
            row(&[Some("NA"), Some("--"), Some("")]),
            row(&[Some("GSM1"), Some("T cell"), Some("NULL")]),
            row(&[Some("GSM3"), Some("unknown"), Some("tab\tseparated")]),
        ],
    )
}

#[test]
fn column_names_are_normalized() {
    let cleaned = DataCleaner::default().clean_metadata(&messy_table());
    assert_eq!(cleaned.columns(), ["sample_id", "cell_type", "notes"]);
}

#[test]
fn sentinels_and_whitespace_are_cleaned() {
    let cleaned = DataCleaner::default().clean_metadata(&messy_table());
    assert_eq!(cleaned.row_count(), 3);
    assert_eq!(cleaned.get(0, "cell_type"), Some("T cell"));
    assert_eq!(cleaned.get(0, "notes"), None);
    assert_eq!(cleaned.get(1, "cell_type"), Some("Bcell"));
    assert_eq!(cleaned.get(1, "notes"), None);
    assert_eq!(cleaned.get(2, "cell_type"), None);
    assert_eq!(cleaned.get(2, "notes"), Some("tab separated"));
}

#[test]
fn cleaning_is_idempotent() {
    let cleaner = DataCleaner::default();
    let once = cleaner.clean_metadata(&messy_table());
    let twice = cleaner.clean_metadata(&once);
    assert_eq!(once, twice);
}

#[test]
fn every_default_sentinel_becomes_missing() {
    let cleaner = DataCleaner::default();
    for sentinel in default_missing_values() {
        assert_eq!(cleaner.clean_cell(Some(&sentinel)), None, "sentinel {sentinel:?}");
    }
    assert_eq!(cleaner.clean_cell(Some("nA")), Some("nA".to_string()));
    assert_eq!(cleaner.clean_cell(Some("liver")), Some("liver".to_string()));
}

#[test]
fn duplicate_rows_are_dropped_in_order() {
    let table = MetadataTable::from_rows(
        columns(&["title", "organism"]),
        vec![
            row(&[Some("a"), Some("human")]),
            row(&[Some("b"), Some("human")]),
            row(&[Some("a "), Some("human")]),
            row(&[None, Some("none")]),
        ],
    );
    let cleaned = DataCleaner::default().clean_metadata(&table);
    assert_eq!(cleaned.row_count(), 2);
    assert_eq!(cleaned.get(0, "title"), Some("a"));
    assert_eq!(cleaned.get(1, "title"), Some("b"));
}

#[test]
fn repeated_sample_ids_keep_first_row() {
    let table = MetadataTable::from_rows(
        columns(&["sample_id", "title"]),
        vec![
            row(&[Some("GSM1"), Some("first")]),
            row(&[Some("GSM1"), Some("second")]),
            row(&[Some("GSM2"), Some("third")]),
        ],
    );
    let cleaned = DataCleaner::default().clean_metadata(&table);
    assert_eq!(cleaned.row_count(), 2);
    assert_eq!(cleaned.get(0, "title"), Some("first"));
    assert_eq!(cleaned.get(1, "sample_id"), Some("GSM2"));
}

#[test]
fn custom_sentinels_replace_defaults() {
    let cleaner = DataCleaner::new(["?"]);
    assert!(cleaner.is_missing_sentinel("?"));
    assert!(!cleaner.is_missing_sentinel("NA"));
    assert_eq!(cleaner.clean_cell(Some("NA")), Some("NA".to_string()));
}

#[test]
fn expression_none_passes_through() {
    assert!(DataCleaner::default().clean_expression(None).is_none());
}

#[test]
fn expression_is_coerced_and_trimmed() {
    let mut raw = RawExpressionTable::new(Some("ID_REF".to_string()), columns(&["S1", "S2", "S3"]));
    raw.push_row("p1".to_string(), row(&[Some("1.5"), Some("n/a"), None]));
    raw.push_row("p2".to_string(), row(&[Some("abc"), Some("NaN"), Some("x")]));
    raw.push_row("p3".to_string(), row(&[Some(" -2 "), Some("3e2"), Some("")]));

    let cleaned = DataCleaner::default().clean_expression(Some(&raw)).unwrap();
    assert_eq!(cleaned.row_ids(), ["p1", "p3"]);
    assert_eq!(cleaned.columns(), ["S1", "S2"]);
    assert_eq!(cleaned.get("p1", "S1"), Some(&1.5));
    assert_eq!(cleaned.get("p1", "S2"), None);
    assert_eq!(cleaned.get("p3", "S1"), Some(&-2.0));
    assert_eq!(cleaned.get("p3", "S2"), Some(&300.0));
    assert_eq!(cleaned.index_name(), Some("ID_REF"));
}
