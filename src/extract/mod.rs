pub mod accession;
pub mod soft;
pub mod txt;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::KiraError;
use crate::source::GeoSource;
use crate::table::{MetadataTable, RawExpressionTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionWarning {
    pub context: String,
    pub message: String,
}

impl ExtractionWarning {
    pub(crate) fn new(context: impl Into<String>, message: impl Into<String>) -> Self {
        let warning = Self {
            context: context.into(),
            message: message.into(),
        };
        tracing::warn!(context = %warning.context, "{}", warning.message);
        warning
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub metadata: MetadataTable,
    pub expression: Option<RawExpressionTable>,
    pub warnings: Vec<ExtractionWarning>,
}

impl Extracted {
    pub(crate) fn metadata_only(metadata: MetadataTable) -> Self {
        Self {
            metadata,
            expression: None,
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Soft,
    Txt,
}

impl UploadFormat {
    pub fn from_filename(filename: &str) -> Result<Self, KiraError> {
        if filename.ends_with(".soft") {
            Ok(UploadFormat::Soft)
        } else if filename.ends_with(".txt") {
            Ok(UploadFormat::Txt)
        } else {
            Err(KiraError::UnsupportedFileFormat(filename.to_string()))
        }
    }
}

pub fn extract(source: &GeoSource) -> Extracted {
    match source {
        GeoSource::Dataset(dataset) => accession::extract_dataset(dataset),
        GeoSource::Series(series) => accession::extract_series(series),
    }
}

pub fn extract_json(value: &Value) -> Result<Extracted, KiraError> {
    let source = GeoSource::from_json(value)?;
    Ok(extract(&source))
}

pub fn parse(content: &[u8], filename: &str) -> Result<Extracted, KiraError> {
    let format = UploadFormat::from_filename(filename)?;
    let text =
        std::str::from_utf8(content).map_err(|err| KiraError::file_parse(filename, err))?;
    match format {
        UploadFormat::Soft => soft::parse_soft(text, filename),
        UploadFormat::Txt => txt::parse_txt(text, filename),
    }
}
