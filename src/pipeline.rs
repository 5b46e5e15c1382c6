use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::Serialize;

use crate::clean::DataCleaner;
use crate::config::ResolvedConfig;
use crate::domain::GeoAccession;
use crate::error::KiraError;
use crate::extract::{self, Extracted, ExtractionWarning};
use crate::geo::GeoFetcher;
use crate::organism::{ColumnOrganismStats, OrganismNormalizer, OrganismRule};
use crate::quality::{ColumnMissing, DatasetSummary, MissingDataReport, QualityReporter};
use crate::source::GeoSource;
use crate::table::{ExpressionTable, MetadataTable};

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn event(&self, _event: ProgressEvent) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InputOrigin {
    Accession { id: String, shape: String },
    Source { name: String, shape: String },
    Upload { filename: String },
}

impl InputOrigin {
    pub fn label(&self) -> &str {
        match self {
            InputOrigin::Accession { id, .. } => id,
            InputOrigin::Source { name, .. } => name,
            InputOrigin::Upload { filename } => filename,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedBundle {
    pub origin: InputOrigin,
    pub metadata: MetadataTable,
    pub expression: Option<ExpressionTable>,
    pub report: MissingDataReport,
    pub warnings: Vec<ExtractionWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityOverview {
    pub origin: InputOrigin,
    pub summary: DatasetSummary,
    pub missing_report: MissingDataReport,
    pub missing_columns: Vec<ColumnMissing>,
    pub recommendations: Vec<String>,
    pub organism_statistics: IndexMap<String, ColumnOrganismStats>,
    pub warnings: Vec<ExtractionWarning>,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    cleaner: DataCleaner,
    normalizer: OrganismNormalizer,
    reporter: QualityReporter,
    top_organisms: usize,
}

impl Pipeline {
    pub fn new(config: &ResolvedConfig) -> Result<Self, KiraError> {
        let mut normalizer = OrganismNormalizer::new()?;
        for alias in &config.organism_aliases {
            normalizer.add_alias(&alias.alias, &alias.canonical);
        }
        for pattern in &config.organism_patterns {
            normalizer.add_rule(OrganismRule::new(&pattern.pattern, &pattern.canonical)?);
        }
        Ok(Self {
            cleaner: DataCleaner::new(config.missing_values.iter().cloned()),
            normalizer,
            reporter: QualityReporter::new(config.expression_column_limit),
            top_organisms: config.top_organisms,
        })
    }

    pub fn normalizer(&self) -> &OrganismNormalizer {
        &self.normalizer
    }

    pub fn normalizer_mut(&mut self) -> &mut OrganismNormalizer {
        &mut self.normalizer
    }

    pub fn process_source(
        &self,
        source: &GeoSource,
        sink: &dyn ProgressSink,
    ) -> Result<ProcessedBundle, KiraError> {
        sink.event(ProgressEvent {
            message: format!("phase=Extract; {} {}", source.kind(), source.name()),
            elapsed: None,
        });
        let extracted = extract::extract(source);
        let origin = InputOrigin::Source {
            name: source.name().to_string(),
            shape: source.kind().to_string(),
        };
        Ok(self.process_extracted(origin, extracted, sink))
    }

    pub fn process_file(
        &self,
        content: &[u8],
        filename: &str,
        sink: &dyn ProgressSink,
    ) -> Result<ProcessedBundle, KiraError> {
        sink.event(ProgressEvent {
            message: format!("phase=Extract; parsing {filename}"),
            elapsed: None,
        });
        let extracted = extract::parse(content, filename)?;
        let origin = InputOrigin::Upload {
            filename: filename.to_string(),
        };
        Ok(self.process_extracted(origin, extracted, sink))
    }

    pub fn process_accession(
        &self,
        fetcher: &dyn GeoFetcher,
        accession: &str,
        sink: &dyn ProgressSink,
    ) -> Result<ProcessedBundle, KiraError> {
        let accession: GeoAccession = accession.parse()?;
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; {} {}", accession.kind(), accession),
            elapsed: None,
        });
        let start = Instant::now();
        let source = fetcher.fetch(&accession)?;
        sink.event(ProgressEvent {
            message: "geo.fetch".to_string(),
            elapsed: Some(start.elapsed()),
        });
        let mut bundle = self.process_source(&source, sink)?;
        bundle.origin = InputOrigin::Accession {
            id: accession.as_str().to_string(),
            shape: source.kind().to_string(),
        };
        Ok(bundle)
    }

    pub fn process_extracted(
        &self,
        origin: InputOrigin,
        extracted: Extracted,
        sink: &dyn ProgressSink,
    ) -> ProcessedBundle {
        let start = Instant::now();
        sink.event(ProgressEvent {
            message: "phase=Clean; standardizing missing values".to_string(),
            elapsed: None,
        });
        let metadata = self.cleaner.clean_metadata(&extracted.metadata);
        let expression = self.cleaner.clean_expression(extracted.expression.as_ref());

        sink.event(ProgressEvent {
            message: "phase=Normalize; canonicalizing organism names".to_string(),
            elapsed: None,
        });
        let metadata = self.normalizer.normalize_table(&metadata);

        sink.event(ProgressEvent {
            message: "phase=Report; counting missing cells".to_string(),
            elapsed: None,
        });
        let report = self.reporter.missing_report(&metadata, expression.as_ref());
        sink.event(ProgressEvent {
            message: format!(
                "done; {} samples, completion {:.1}%",
                metadata.row_count(),
                report.completion_rate
            ),
            elapsed: Some(start.elapsed()),
        });
        tracing::debug!(
            origin = origin.label(),
            samples = metadata.row_count(),
            warnings = extracted.warnings.len(),
            "pipeline finished"
        );

        ProcessedBundle {
            origin,
            metadata,
            expression,
            report,
            warnings: extracted.warnings,
        }
    }

    pub fn recommendations(&self, report: &MissingDataReport) -> Vec<String> {
        self.reporter.recommendations(report)
    }

    pub fn summary(&self, bundle: &ProcessedBundle) -> DatasetSummary {
        self.reporter
            .summary(&bundle.metadata, bundle.expression.as_ref(), &bundle.report)
    }

    pub fn organism_statistics(
        &self,
        bundle: &ProcessedBundle,
    ) -> IndexMap<String, ColumnOrganismStats> {
        self.normalizer
            .organism_statistics(&bundle.metadata, self.top_organisms)
    }

    pub fn overview(&self, bundle: &ProcessedBundle) -> QualityOverview {
        QualityOverview {
            origin: bundle.origin.clone(),
            summary: self.summary(bundle),
            missing_report: bundle.report.clone(),
            missing_columns: bundle.report.column_breakdown(bundle.metadata.row_count()),
            recommendations: self.recommendations(&bundle.report),
            organism_statistics: self.organism_statistics(bundle),
            warnings: bundle.warnings.clone(),
        }
    }
}
