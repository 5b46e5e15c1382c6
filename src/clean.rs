use std::collections::HashSet;

use crate::table::{ExpressionTable, MetadataTable, RawExpressionTable};

pub fn default_missing_values() -> Vec<String> {
    [
        "", "null", "NULL", "na", "NA", "n/a", "N/A", "none", "None", "NONE", "missing",
        "Missing", "MISSING", "-", "--", "---", "undefined", "Undefined", "UNDEFINED", "unknown",
        "Unknown", "UNKNOWN",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

pub fn normalize_column_name(name: &str) -> String {
    name.to_lowercase().replace([' ', '-'], "_")
}

/// Collapses whitespace runs to one space, trims, and drops C0/C1 control
/// characters.
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = true;
        } else if ch.is_control() {
            continue;
        } else {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct DataCleaner {
    missing_values: HashSet<String>,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(default_missing_values())
    }
}

impl DataCleaner {
    pub fn new<I, S>(missing_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            missing_values: missing_values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_missing_sentinel(&self, value: &str) -> bool {
        self.missing_values.contains(value)
    }

    pub fn clean_cell(&self, value: Option<&str>) -> Option<String> {
        let value = value?;
        if self.is_missing_sentinel(value) {
            return None;
        }
        let cleaned = sanitize_text(value);
        if self.is_missing_sentinel(&cleaned) {
            return None;
        }
        Some(cleaned)
    }

    pub fn clean_metadata(&self, table: &MetadataTable) -> MetadataTable {
        let columns: Vec<String> = table
            .columns()
            .iter()
            .map(|name| normalize_column_name(name))
            .collect();

        let mut seen_rows: HashSet<Vec<Option<String>>> = HashSet::new();
        let mut rows = Vec::with_capacity(table.row_count());
        let mut dropped_empty = 0usize;
        let mut dropped_duplicate = 0usize;
        for row in table.rows() {
            let cleaned: Vec<Option<String>> = row
                .iter()
                .map(|cell| self.clean_cell(cell.as_deref()))
                .collect();
            if cleaned.iter().all(Option::is_none) {
                dropped_empty += 1;
                continue;
            }
            if !seen_rows.insert(cleaned.clone()) {
                dropped_duplicate += 1;
                continue;
            }
            rows.push(cleaned);
        }

        let mut cleaned = MetadataTable { columns, rows };
        let dropped_ids = dedupe_sample_ids(&mut cleaned);
        tracing::debug!(
            rows = cleaned.row_count(),
            dropped_empty,
            dropped_duplicate,
            dropped_ids,
            "cleaned metadata"
        );
        cleaned
    }

    pub fn clean_expression(
        &self,
        table: Option<&RawExpressionTable>,
    ) -> Option<ExpressionTable> {
        let table = table?.clone();
        let numeric = table.map_values(|value| parse_numeric(&value));
        Some(drop_empty_lines(numeric))
    }
}

pub fn parse_numeric(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| !number.is_nan())
}

fn dedupe_sample_ids(table: &mut MetadataTable) -> usize {
    let Some(idx) = table.column_index("sample_id") else {
        return 0;
    };
    let mut seen: HashSet<String> = HashSet::new();
    let before = table.rows.len();
    table.rows.retain(|row| match &row[idx] {
        Some(id) => {
            if seen.insert(id.clone()) {
                true
            } else {
                tracing::warn!(sample_id = %id, "dropping row with repeated sample_id");
                false
            }
        }
        None => true,
    });
    before - table.rows.len()
}

fn drop_empty_lines(table: ExpressionTable) -> ExpressionTable {
    let ExpressionTable {
        index_name,
        row_ids,
        columns,
        values,
    } = table;

    let (row_ids, values): (Vec<String>, Vec<Vec<Option<f64>>>) = row_ids
        .into_iter()
        .zip(values)
        .filter(|(_, row)| row.iter().any(Option::is_some))
        .unzip();

    let keep: Vec<bool> = (0..columns.len())
        .map(|col| values.iter().any(|row| row[col].is_some()))
        .collect();
    let columns = columns
        .into_iter()
        .zip(&keep)
        .filter_map(|(name, keep)| keep.then_some(name))
        .collect();
    let values = values
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&keep)
                .filter_map(|(cell, keep)| keep.then_some(cell))
                .collect()
        })
        .collect();

    ExpressionTable {
        index_name,
        row_ids,
        columns,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_whitespace_and_controls() {
        assert_eq!(sanitize_text("  a \t\n b  "), "a b");
        assert_eq!(sanitize_text("a \u{1} b"), "a b");
        assert_eq!(sanitize_text("x\u{85}y\u{9f}"), "x y");
    }

    #[test]
    fn column_names_are_snake_cased() {
        assert_eq!(normalize_column_name("Source Name-ch1"), "source_name_ch1");
    }

    #[test]
    fn parse_numeric_rejects_tokens() {
        assert_eq!(parse_numeric(" 2.5 "), Some(2.5));
        assert_eq!(parse_numeric("null"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("1e3"), Some(1000.0));
    }
}
