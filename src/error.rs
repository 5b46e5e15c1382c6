use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum KiraError {
    #[error("unrecognized GEO source: expected a dataset with `subsets` or a series with `gsms`")]
    UnrecognizedSourceKind,

    #[error("malformed GEO source: {0}")]
    MalformedSource(String),

    #[error("unsupported file format: {0} (use .soft or .txt files)")]
    UnsupportedFileFormat(String),

    #[error("error parsing file {filename}: {cause}")]
    FileParse { filename: String, cause: String },

    #[error("invalid GEO accession: {0}")]
    InvalidGeoAccession(String),

    #[error("GEO source not found: {0}")]
    SourceNotFound(String),

    #[error("invalid organism alias: {0}")]
    InvalidAlias(String),

    #[error("invalid organism pattern: {0}")]
    InvalidPattern(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl KiraError {
    pub fn file_parse(filename: &str, cause: impl ToString) -> Self {
        KiraError::FileParse {
            filename: filename.to_string(),
            cause: cause.to_string(),
        }
    }
}
