use std::collections::HashMap;

use csv::ReaderBuilder;

use crate::error::KiraError;
use crate::extract::Extracted;
use crate::table::{MetadataTable, RawExpressionTable, SampleRecord};

const SAMPLE_ID_MARKER: &str = "sample_id";
const GEO_SAMPLE_PREFIX: &str = "gsm";

pub fn parse_txt(content: &str, filename: &str) -> Result<Extracted, KiraError> {
    let (headers, rows) = read_tab_delimited(content, filename)?;

    if looks_like_metadata(&headers) {
        tracing::debug!(filename, rows = rows.len(), "tab-delimited file read as metadata");
        return Ok(Extracted::metadata_only(MetadataTable::from_rows(
            headers, rows,
        )));
    }

    let mut headers = headers.into_iter();
    let index_name = headers.next();
    let samples: Vec<String> = headers.collect();

    let records = samples.iter().map(|sample| {
        let mut record = SampleRecord::new();
        record.insert("sample_id".to_string(), sample.clone());
        record.insert("source".to_string(), "uploaded_file".to_string());
        record
    });
    let metadata = MetadataTable::from_records(records);

    let mut expression = RawExpressionTable::new(index_name, samples.clone());
    for mut row in rows {
        let values = row.split_off(1.min(row.len()));
        let row_id = row.pop().flatten().unwrap_or_default();
        expression.push_row(row_id, values);
    }
    tracing::debug!(
        filename,
        features = expression.row_count(),
        samples = expression.column_count(),
        "tab-delimited file read as expression matrix"
    );

    Ok(Extracted {
        metadata,
        expression: Some(expression),
        warnings: Vec::new(),
    })
}

pub fn looks_like_metadata(headers: &[String]) -> bool {
    headers.iter().any(|header| {
        let lower = header.to_lowercase();
        lower == SAMPLE_ID_MARKER || lower.contains(GEO_SAMPLE_PREFIX)
    })
}

type Rows = Vec<Vec<Option<String>>>;

fn read_tab_delimited(content: &str, filename: &str) -> Result<(Vec<String>, Rows), KiraError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let raw_headers = reader
        .headers()
        .map_err(|err| KiraError::file_parse(filename, err))?
        .clone();
    if raw_headers.is_empty() || raw_headers.iter().all(|field| field.is_empty()) {
        return Err(KiraError::file_parse(filename, "no columns to parse from file"));
    }
    let headers = dedupe_headers(raw_headers.iter());
    let width = headers.len();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|err| KiraError::file_parse(filename, err))?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        if record.len() > width {
            return Err(KiraError::file_parse(
                filename,
                format!(
                    "expected {} fields in line {}, saw {}",
                    width,
                    idx + 2,
                    record.len()
                ),
            ));
        }
        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|field| (!field.is_empty()).then(|| field.to_string()))
            .collect();
        row.resize(width, None);
        rows.push(row);
    }
    Ok((headers, rows))
}

fn dedupe_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::new();
    for (idx, name) in raw.enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name.to_string()
        };
        let mut candidate = base.clone();
        while let Some(count) = seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{base}.{count}");
        }
        seen.insert(candidate.clone(), 0);
        headers.push(candidate);
    }
    headers
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn duplicate_headers_are_suffixed() {
        let headers = dedupe_headers(["id", "x", "x", "", "x"].into_iter());
        assert_eq!(headers, ["id", "x", "x.1", "Unnamed: 3", "x.2"]);
    }

    #[test]
    fn gsm_in_any_header_marks_metadata() {
        assert!(looks_like_metadata(&["ID".to_string(), "GSM1234".to_string()]));
        assert!(looks_like_metadata(&["Sample_ID".to_string()]));
        assert!(!looks_like_metadata(&["ProbeID".to_string(), "S1".to_string()]));
    }

    #[test]
    fn long_rows_fail_to_parse() {
        let err = read_tab_delimited("a\tb\n1\t2\t3\n", "wide.txt").unwrap_err();
        assert_matches!(err, KiraError::FileParse { .. });
    }

    #[test]
    fn empty_input_fails_to_parse() {
        let err = read_tab_delimited("", "empty.txt").unwrap_err();
        assert_matches!(err, KiraError::FileParse { .. });
    }

    #[test]
    fn short_rows_are_padded_with_missing() {
        let (_, rows) = read_tab_delimited("a\tb\tc\n1\t\n", "short.txt").unwrap();
        assert_eq!(rows, vec![vec![Some("1".to_string()), None, None]]);
    }
}
