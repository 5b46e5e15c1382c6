use crate::error::KiraError;
use crate::extract::Extracted;
use crate::table::{MetadataTable, SampleRecord};

const SAMPLE_MARKER: &str = "^SAMPLE";
const SAMPLE_FIELD_PREFIX: &str = "!Sample_";
const SAMPLE_TABLE_BEGIN: &str = "!sample_table_begin";

pub fn parse_soft(content: &str, filename: &str) -> Result<Extracted, KiraError> {
    let mut records: Vec<SampleRecord> = Vec::new();
    let mut current: Option<SampleRecord> = None;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.starts_with(SAMPLE_MARKER) {
            let sample_id = line.split('=').nth(1).map(str::trim).ok_or_else(|| {
                KiraError::file_parse(
                    filename,
                    format!("line {}: sample marker without `=`", line_no + 1),
                )
            })?;
            if let Some(record) = current.take() {
                records.push(record);
            }
            let mut record = SampleRecord::new();
            record.insert("sample_id".to_string(), sample_id.to_string());
            current = Some(record);
        } else if let Some(rest) = line.strip_prefix(SAMPLE_FIELD_PREFIX) {
            let Some(record) = current.as_mut() else {
                continue;
            };
            let Some((key, value)) = rest.split_once('=') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();
            match record.get_mut(&key) {
                Some(existing) => {
                    existing.push_str(" | ");
                    existing.push_str(value);
                }
                None => {
                    record.insert(key, value.to_string());
                }
            }
        } else if line.starts_with(SAMPLE_TABLE_BEGIN) {
            break;
        }
    }

    if let Some(record) = current {
        records.push(record);
    }
    tracing::debug!(filename, samples = records.len(), "parsed SOFT file");
    Ok(Extracted::metadata_only(MetadataTable::from_records(records)))
}
