use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::KiraError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    List(Vec<String>),
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Null,
}

impl FieldValue {
    pub fn first(&self) -> String {
        match self {
            FieldValue::List(items) => items.first().cloned().unwrap_or_default(),
            other => other.joined(),
        }
    }

    pub fn joined(&self) -> String {
        match self {
            FieldValue::List(items) => items.join(" | "),
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(number) => number.to_string(),
            FieldValue::Flag(flag) => flag.to_string(),
            FieldValue::Null => String::new(),
        }
    }
}

pub type FieldMap = IndexMap<String, FieldValue>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn first_ragged_row(&self) -> Option<usize> {
        self.data
            .iter()
            .position(|row| row.len() != self.columns.len())
    }
}

pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeoSubset {
    #[serde(default)]
    pub metadata: FieldMap,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeoDataset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub metadata: FieldMap,
    pub subsets: IndexMap<String, GeoSubset>,
    #[serde(default)]
    pub table: Option<RawTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeoSample {
    #[serde(default)]
    pub metadata: FieldMap,
    #[serde(default)]
    pub table: Option<RawTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeoSeries {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub metadata: FieldMap,
    pub gsms: IndexMap<String, GeoSample>,
    #[serde(default)]
    pub pivot: Option<RawTable>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeoSource {
    Dataset(GeoDataset),
    Series(GeoSeries),
}

impl GeoSource {
    pub fn from_json(value: &Value) -> Result<Self, KiraError> {
        let object = value.as_object().ok_or(KiraError::UnrecognizedSourceKind)?;
        if object.contains_key("subsets") {
            let dataset = GeoDataset::deserialize(value)
                .map_err(|err| KiraError::MalformedSource(err.to_string()))?;
            return Ok(GeoSource::Dataset(dataset));
        }
        if object.contains_key("gsms") {
            let series = GeoSeries::deserialize(value)
                .map_err(|err| KiraError::MalformedSource(err.to_string()))?;
            return Ok(GeoSource::Series(series));
        }
        Err(KiraError::UnrecognizedSourceKind)
    }

    pub fn from_json_str(text: &str) -> Result<Self, KiraError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| KiraError::MalformedSource(err.to_string()))?;
        Self::from_json(&value)
    }

    pub fn name(&self) -> &str {
        match self {
            GeoSource::Dataset(dataset) => &dataset.name,
            GeoSource::Series(series) => &series.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GeoSource::Dataset(_) => "dataset",
            GeoSource::Series(_) => "series",
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn field_value_first_and_joined() {
        let list = FieldValue::List(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(list.first(), "a");
        assert_eq!(list.joined(), "a | b");
        assert_eq!(FieldValue::List(Vec::new()).first(), "");
        assert_eq!(FieldValue::Null.joined(), "");
    }

    #[test]
    fn subsets_win_over_gsms() {
        let value = json!({ "subsets": {}, "gsms": {} });
        assert_matches!(GeoSource::from_json(&value), Ok(GeoSource::Dataset(_)));
    }

    #[test]
    fn unknown_shape_is_rejected() {
        let value = json!({ "name": "GPL570", "table": null });
        assert_matches!(
            GeoSource::from_json(&value),
            Err(KiraError::UnrecognizedSourceKind)
        );
        assert_matches!(
            GeoSource::from_json(&json!([1, 2])),
            Err(KiraError::UnrecognizedSourceKind)
        );
    }

    #[test]
    fn recognized_but_malformed_shape() {
        let value = json!({ "gsms": ["GSM1"] });
        assert_matches!(
            GeoSource::from_json(&value),
            Err(KiraError::MalformedSource(_))
        );
    }
}
