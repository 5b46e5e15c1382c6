use kira_geoclean::clean::DataCleaner;
use kira_geoclean::extract;
use kira_geoclean::quality::{MissingDataReport, QualityReporter, QualityTier};
use kira_geoclean::table::{ExpressionTable, MetadataTable};

fn metadata(columns: &[&str], rows: &[&[Option<&str>]]) -> MetadataTable {
    MetadataTable::from_rows(
        columns.iter().map(|name| name.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.map(str::to_string)).collect())
            .collect(),
    )
}

fn report_with_rate(completion_rate: f64) -> MissingDataReport {
    MissingDataReport {
        metadata: None,
        expression: None,
        total_missing: 0,
        completion_rate,
    }
}

#[test]
fn metadata_totals_and_percentages() {
    let table = metadata(
        &["sample_id", "title", "organism"],
        &[
            &[Some("GSM1"), None, Some("Homo sapiens")],
            &[Some("GSM2"), None, None],
        ],
    );
    let report = QualityReporter::default().missing_report(&table, None);
    let meta = report.metadata.as_ref().unwrap();
    assert_eq!(meta.total_cells, 6);
    assert_eq!(meta.missing_cells, 3);
    assert!((meta.missing_percentage - 50.0).abs() < 1e-9);
    assert_eq!(meta.by_column["title"], 2);
    assert_eq!(meta.by_column["sample_id"], 0);
    assert_eq!(report.total_missing, 3);
    assert!((report.completion_rate - 50.0).abs() < 1e-9);
    assert!(report.expression.is_none());
}

#[test]
fn empty_tables_give_zero_completion() {
    let report = QualityReporter::default().missing_report(&MetadataTable::default(), None);
    assert!(report.metadata.is_none());
    assert_eq!(report.completion_rate, 0.0);
}

#[test]
fn expression_breakdown_is_truncated_but_totals_are_not() {
    let columns: Vec<String> = (0..25).map(|idx| format!("GSM{idx}")).collect();
    let mut expression = ExpressionTable::new(None, columns);
    expression.push_row("p1".to_string(), vec![None; 25]);
    expression.push_row("p2".to_string(), vec![Some(1.0); 25]);

    let table = metadata(&["sample_id"], &[&[Some("GSM0")]]);
    let report = QualityReporter::default().missing_report(&table, Some(&expression));
    let expr = report.expression.as_ref().unwrap();
    assert_eq!(expr.total_cells, 50);
    assert_eq!(expr.missing_cells, 25);
    assert_eq!(expr.by_column.len(), 20);
    assert_eq!(report.total_missing, 25);
    let expected = (51.0 - 25.0) / 51.0 * 100.0;
    assert!((report.completion_rate - expected).abs() < 1e-9);

    let narrow = QualityReporter::new(3).missing_report(&table, Some(&expression));
    assert_eq!(narrow.expression.unwrap().by_column.len(), 3);
}

#[test]
fn tier_messages_follow_completion_rate() {
    let reporter = QualityReporter::default();
    let excellent = reporter.recommendations(&report_with_rate(96.0));
    assert_eq!(excellent[0], QualityTier::Excellent.message());
    assert!(excellent[0].starts_with("Excellent"));
    let poor = reporter.recommendations(&report_with_rate(60.0));
    assert!(poor[0].starts_with("Poor"));
    assert_eq!(reporter.recommendations(&report_with_rate(85.0))[0], QualityTier::Good.message());
    assert_eq!(
        reporter.recommendations(&report_with_rate(70.0))[0],
        QualityTier::Moderate.message()
    );
}

#[test]
fn missing_columns_are_listed_up_to_five() {
    let columns = ["a", "b", "c", "d", "e", "f", "g"];
    let table = metadata(&columns, &[&[None, None, None, None, None, None, Some("x")]]);
    let reporter = QualityReporter::default();
    let report = reporter.missing_report(&table, None);
    let recommendations = reporter.recommendations(&report);
    assert_eq!(recommendations.len(), 3);
    assert_eq!(recommendations[1], "Columns with missing data: a, b, c, d, e");
    assert_eq!(recommendations[2], "And 1 more columns with missing data.");
}

#[test]
fn organism_column_adds_curation_advice() {
    let table = metadata(&["sample_id", "Organism"], &[&[Some("GSM1"), Some("Homo sapiens")]]);
    let reporter = QualityReporter::default();
    let recommendations = reporter.recommendations(&reporter.missing_report(&table, None));
    assert_eq!(recommendations.len(), 2);
    assert!(recommendations[1].starts_with("Organism information"));
}

#[test]
fn column_breakdown_reports_share_of_rows() {
    let table = metadata(
        &["sample_id", "title"],
        &[&[Some("GSM1"), None], &[Some("GSM2"), None], &[Some("GSM3"), Some("t")], &[Some("GSM4"), Some("t")]],
    );
    let report = QualityReporter::default().missing_report(&table, None);
    let breakdown = report.column_breakdown(table.row_count());
    assert_eq!(breakdown.len(), 1);
    assert_eq!(breakdown[0].column, "title");
    assert_eq!(breakdown[0].missing, 2);
    assert!((breakdown[0].percent_of_rows - 50.0).abs() < 1e-9);
}

#[test]
fn summary_counts_organisms() {
    let table = metadata(
        &["sample_id", "organism"],
        &[
            &[Some("GSM1"), Some("Mus musculus")],
            &[Some("GSM2"), Some("Homo sapiens")],
            &[Some("GSM3"), Some("Homo sapiens")],
        ],
    );
    let reporter = QualityReporter::default();
    let report = reporter.missing_report(&table, None);
    let summary = reporter.summary(&table, None, &report);
    assert_eq!(summary.metadata_records, 3);
    assert!(summary.expression.is_none());
    assert_eq!(
        summary.organism_distribution,
        vec![("Homo sapiens".to_string(), 2), ("Mus musculus".to_string(), 1)]
    );
}

#[test]
fn colliding_column_names_keep_every_missing_cell() {
    let content = b"sample_id\tCell Type\tcell_type\nGSM1\t\tx\nGSM2\t\tx\n";
    let extracted = extract::parse(content, "meta.txt").unwrap();
    let cleaned = DataCleaner::default().clean_metadata(&extracted.metadata);
    assert_eq!(cleaned.columns(), ["sample_id", "cell_type", "cell_type"]);

    let reporter = QualityReporter::default();
    let report = reporter.missing_report(&cleaned, None);
    let meta = report.metadata.as_ref().unwrap();
    assert_eq!(meta.total_cells, 6);
    assert_eq!(meta.missing_cells, 2);
    assert_eq!(meta.by_column["cell_type"], 2);
    assert!((meta.missing_percentage - 2.0 / 6.0 * 100.0).abs() < 1e-9);
    assert!((report.completion_rate - 4.0 / 6.0 * 100.0).abs() < 1e-9);
    assert!(reporter.recommendations(&report)[0].starts_with("Poor"));
}
