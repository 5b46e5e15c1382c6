use std::io::{self, Write};

use serde::Serialize;

use crate::pipeline::{ProgressEvent, ProgressSink, QualityOverview};
use crate::store::WrittenBundle;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

#[derive(Debug, Serialize)]
pub struct ProcessResult<'a> {
    #[serde(flatten)]
    pub overview: &'a QualityOverview,
    pub written: Option<&'a WrittenBundle>,
}

#[derive(Debug, Serialize)]
pub struct OrganismResult {
    pub input: String,
    pub canonical: String,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_process(result: &ProcessResult<'_>) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_organisms(results: &[OrganismResult]) -> io::Result<()> {
        Self::print_json(&results)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}
