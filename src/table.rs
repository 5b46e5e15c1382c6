use std::collections::HashMap;

use indexmap::IndexMap;

pub type SampleRecord = IndexMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTable {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<Option<String>>>,
}

impl MetadataTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from sparse records. Columns are the union of all
    /// record keys in first-seen order; absent fields are missing.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = SampleRecord>,
    {
        let records: Vec<SampleRecord> = records.into_iter().collect();
        let mut columns: IndexMap<String, ()> = IndexMap::new();
        for record in &records {
            for key in record.keys() {
                if !columns.contains_key(key) {
                    columns.insert(key.clone(), ());
                }
            }
        }
        let columns: Vec<String> = columns.into_keys().collect();
        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|column| record.swap_remove(column))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(idx).and_then(|cell| cell.as_deref()))
    }

    pub fn missing_count(&self, idx: usize) -> usize {
        self.column_values(idx).filter(|cell| cell.is_none()).count()
    }

    /// Non-missing value frequencies, most frequent first. Ties keep the
    /// order in which values were first seen.
    pub fn value_counts(&self, idx: usize) -> Vec<(String, usize)> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for value in self.column_values(idx).flatten() {
            *counts.entry(value).or_insert(0) += 1;
        }
        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTable<V = f64> {
    pub(crate) index_name: Option<String>,
    pub(crate) row_ids: Vec<String>,
    pub(crate) columns: Vec<String>,
    pub(crate) values: Vec<Vec<Option<V>>>,
}

pub type RawExpressionTable = ExpressionTable<String>;

impl<V> ExpressionTable<V> {
    pub fn new(index_name: Option<String>, columns: Vec<String>) -> Self {
        Self {
            index_name,
            row_ids: Vec::new(),
            columns,
            values: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row_id: String, mut values: Vec<Option<V>>) {
        values.resize_with(self.columns.len(), || None);
        self.row_ids.push(row_id);
        self.values.push(values);
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Vec<Option<V>>] {
        &self.values
    }

    pub fn row_count(&self) -> usize {
        self.row_ids.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty() || self.columns.is_empty()
    }

    pub fn get(&self, row_id: &str, column: &str) -> Option<&V> {
        let row = self.row_ids.iter().position(|id| id == row_id)?;
        let col = self.columns.iter().position(|name| name == column)?;
        self.values[row][col].as_ref()
    }

    pub fn missing_by_column(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let missing = self.values.iter().filter(|row| row[idx].is_none()).count();
                (column.clone(), missing)
            })
            .collect()
    }

    pub fn map_values<U, F>(self, mut f: F) -> ExpressionTable<U>
    where
        F: FnMut(V) -> Option<U>,
    {
        let values = self
            .values
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.and_then(&mut f)).collect())
            .collect();
        ExpressionTable {
            index_name: self.index_name,
            row_ids: self.row_ids,
            columns: self.columns,
            values,
        }
    }
}

impl RawExpressionTable {
    pub fn concat_columns(
        index_name: Option<String>,
        series: Vec<(String, Vec<(String, Option<String>)>)>,
    ) -> Self {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut row_ids: Vec<String> = Vec::new();
        for (_, cells) in &series {
            for (row_id, _) in cells {
                if !positions.contains_key(row_id) {
                    positions.insert(row_id.clone(), row_ids.len());
                    row_ids.push(row_id.clone());
                }
            }
        }
        let mut values = vec![vec![None; series.len()]; row_ids.len()];
        let mut columns = Vec::with_capacity(series.len());
        for (col, (name, cells)) in series.into_iter().enumerate() {
            columns.push(name);
            for (row_id, value) in cells {
                values[positions[&row_id]][col] = value;
            }
        }
        Self {
            index_name,
            row_ids,
            columns,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> SampleRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn from_records_unions_columns_in_first_seen_order() {
        let table = MetadataTable::from_records(vec![
            record(&[("sample_id", "GSM1"), ("title", "A")]),
            record(&[("sample_id", "GSM2"), ("tissue", "liver")]),
        ]);
        assert_eq!(table.columns(), ["sample_id", "title", "tissue"]);
        assert_eq!(table.get(1, "title"), None);
        assert_eq!(table.get(1, "tissue"), Some("liver"));
    }

    #[test]
    fn value_counts_breaks_ties_by_first_seen() {
        let table = MetadataTable::from_rows(
            vec!["organism".to_string()],
            vec![
                vec![Some("Mus musculus".to_string())],
                vec![Some("Homo sapiens".to_string())],
                vec![None],
                vec![Some("Homo sapiens".to_string())],
                vec![Some("Mus musculus".to_string())],
                vec![Some("Danio rerio".to_string())],
            ],
        );
        let counts = table.value_counts(0);
        assert_eq!(
            counts,
            vec![
                ("Mus musculus".to_string(), 2),
                ("Homo sapiens".to_string(), 2),
                ("Danio rerio".to_string(), 1),
            ]
        );
    }

    #[test]
    fn concat_columns_outer_joins_row_ids() {
        let table = RawExpressionTable::concat_columns(
            Some("ID_REF".to_string()),
            vec![
                (
                    "GSM1".to_string(),
                    vec![
                        ("p1".to_string(), Some("1.0".to_string())),
                        ("p2".to_string(), Some("2.0".to_string())),
                    ],
                ),
                (
                    "GSM2".to_string(),
                    vec![("p3".to_string(), Some("3.0".to_string()))],
                ),
            ],
        );
        assert_eq!(table.row_ids(), ["p1", "p2", "p3"]);
        assert_eq!(table.get("p3", "GSM2").map(String::as_str), Some("3.0"));
        assert_eq!(table.get("p3", "GSM1"), None);
    }
}
