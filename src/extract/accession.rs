use std::collections::HashSet;

use crate::extract::{Extracted, ExtractionWarning};
use crate::source::{FieldMap, GeoDataset, GeoSeries, RawTable, cell_text};
use crate::table::{MetadataTable, RawExpressionTable, SampleRecord};

const ID_REF: &str = "ID_REF";
const VALUE: &str = "VALUE";

#[derive(Debug, Clone, Copy)]
enum Take {
    First,
    Joined,
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    Sample,
    Parent,
}

struct KnownField {
    column: &'static str,
    scope: Scope,
    key: &'static str,
    take: Take,
}

const fn field(column: &'static str, scope: Scope, key: &'static str, take: Take) -> KnownField {
    KnownField {
        column,
        scope,
        key,
        take,
    }
}

const DATASET_FIELDS: &[KnownField] = &[
    field("title", Scope::Sample, "description", Take::First),
    field("organism", Scope::Parent, "sample_organism", Take::First),
    field("source_name", Scope::Sample, "type", Take::First),
    field("characteristics", Scope::Sample, "description", Take::First),
    field("platform_id", Scope::Parent, "platform", Take::First),
    field("submission_date", Scope::Parent, "date", Take::First),
    field("description", Scope::Parent, "summary", Take::Joined),
    field("contact_name", Scope::Parent, "contributor", Take::Joined),
    field("dataset_type", Scope::Parent, "type", Take::First),
    field("value_type", Scope::Parent, "value_type", Take::First),
    field("reference_series", Scope::Parent, "reference_series", Take::First),
    field("pubmed_id", Scope::Parent, "pubmed_id", Take::Joined),
];

const SERIES_FIELDS: &[KnownField] = &[
    field("title", Scope::Sample, "title", Take::First),
    field("organism", Scope::Sample, "organism_ch1", Take::First),
    field("source_name", Scope::Sample, "source_name_ch1", Take::First),
    field("characteristics", Scope::Sample, "characteristics_ch1", Take::Joined),
    field("treatment", Scope::Sample, "treatment_protocol_ch1", Take::First),
    field("growth_protocol", Scope::Sample, "growth_protocol_ch1", Take::First),
    field("extract_protocol", Scope::Sample, "extract_protocol_ch1", Take::First),
    field("label_protocol", Scope::Sample, "label_protocol_ch1", Take::First),
    field("hyb_protocol", Scope::Sample, "hyb_protocol", Take::First),
    field("scan_protocol", Scope::Sample, "scan_protocol", Take::First),
    field("description", Scope::Sample, "description", Take::First),
    field("data_processing", Scope::Sample, "data_processing", Take::Joined),
    field("platform_id", Scope::Sample, "platform_id", Take::First),
    field("contact_name", Scope::Sample, "contact_name", Take::First),
    field("contact_email", Scope::Sample, "contact_email", Take::First),
    field("contact_institute", Scope::Sample, "contact_institute", Take::First),
    field("submission_date", Scope::Sample, "submission_date", Take::First),
    field("last_update_date", Scope::Sample, "last_update_date", Take::First),
];

fn take_known(
    record: &mut SampleRecord,
    fields: &[KnownField],
    sample: &FieldMap,
    parent: &FieldMap,
) {
    for known in fields {
        let map = match known.scope {
            Scope::Sample => sample,
            Scope::Parent => parent,
        };
        let value = map
            .get(known.key)
            .map(|value| match known.take {
                Take::First => value.first(),
                Take::Joined => value.joined(),
            })
            .unwrap_or_default();
        record.insert(known.column.to_string(), value);
    }
}

fn overlay(record: &mut SampleRecord, extras: &FieldMap) {
    for (key, value) in extras {
        if !record.contains_key(key) {
            record.insert(key.clone(), value.joined());
        }
    }
}

pub fn extract_dataset(dataset: &GeoDataset) -> Extracted {
    let records = dataset.subsets.iter().map(|(subset_id, subset)| {
        let mut record = SampleRecord::new();
        record.insert("sample_id".to_string(), subset_id.clone());
        take_known(&mut record, &DATASET_FIELDS[..4], &subset.metadata, &dataset.metadata);
        record.insert("dataset_id".to_string(), dataset.name.clone());
        take_known(&mut record, &DATASET_FIELDS[4..], &subset.metadata, &dataset.metadata);
        overlay(&mut record, &subset.metadata);
        record
    });
    let metadata = MetadataTable::from_records(records);
    tracing::debug!(
        dataset = %dataset.name,
        samples = metadata.row_count(),
        "extracted dataset metadata"
    );

    let mut extracted = Extracted::metadata_only(metadata);
    if let Some(table) = &dataset.table {
        match wide_table(table) {
            Ok(expression) => extracted.expression = Some(expression),
            Err(message) => extracted
                .warnings
                .push(ExtractionWarning::new(dataset.name.as_str(), message)),
        }
    }
    extracted
}

pub fn extract_series(series: &GeoSeries) -> Extracted {
    let records = series.gsms.iter().map(|(gsm_id, sample)| {
        let mut record = SampleRecord::new();
        record.insert("sample_id".to_string(), gsm_id.clone());
        take_known(&mut record, SERIES_FIELDS, &sample.metadata, &series.metadata);
        overlay(&mut record, &sample.metadata);
        record
    });
    let metadata = MetadataTable::from_records(records);
    tracing::debug!(
        series = %series.name,
        samples = metadata.row_count(),
        "extracted series metadata"
    );

    let mut extracted = Extracted::metadata_only(metadata);
    let expression = match &series.pivot {
        Some(pivot) => wide_table(pivot).map(Some),
        None => per_sample_tables(series),
    };
    match expression {
        Ok(expression) => extracted.expression = expression,
        Err(message) => extracted
            .warnings
            .push(ExtractionWarning::new(series.name.as_str(), message)),
    }
    extracted
}

fn wide_table(table: &RawTable) -> Result<RawExpressionTable, String> {
    if let Some(row) = table.first_ragged_row() {
        return Err(format!(
            "could not extract expression data: row {} has {} cells, expected {}",
            row,
            table.data[row].len(),
            table.columns.len()
        ));
    }
    let index = table.column_index(ID_REF);
    let columns = table
        .columns
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != index)
        .map(|(_, name)| name.clone())
        .collect();
    let mut expression = RawExpressionTable::new(index.map(|_| ID_REF.to_string()), columns);
    for (position, row) in table.data.iter().enumerate() {
        let row_id = match index {
            Some(idx) => cell_text(&row[idx]).unwrap_or_default(),
            None => position.to_string(),
        };
        let values = row
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != index)
            .map(|(_, cell)| cell_text(cell))
            .collect();
        expression.push_row(row_id, values);
    }
    Ok(expression)
}

fn per_sample_tables(series: &GeoSeries) -> Result<Option<RawExpressionTable>, String> {
    let mut columns = Vec::new();
    for (gsm_id, sample) in &series.gsms {
        let Some(table) = &sample.table else {
            continue;
        };
        let (Some(id_idx), Some(value_idx)) =
            (table.column_index(ID_REF), table.column_index(VALUE))
        else {
            tracing::debug!(sample = %gsm_id, "sample table lacks ID_REF/VALUE; skipping");
            continue;
        };
        if table.first_ragged_row().is_some() {
            tracing::debug!(sample = %gsm_id, "sample table is ragged; skipping");
            continue;
        }
        let mut seen = HashSet::new();
        let mut cells = Vec::with_capacity(table.data.len());
        for row in &table.data {
            let row_id = cell_text(&row[id_idx]).unwrap_or_default();
            if !seen.insert(row_id.clone()) {
                return Err(format!(
                    "could not extract expression data: duplicate ID_REF {row_id} in {gsm_id}"
                ));
            }
            cells.push((row_id, cell_text(&row[value_idx])));
        }
        columns.push((gsm_id.clone(), cells));
    }
    if columns.is_empty() {
        return Ok(None);
    }
    Ok(Some(RawExpressionTable::concat_columns(
        Some(ID_REF.to_string()),
        columns,
    )))
}
