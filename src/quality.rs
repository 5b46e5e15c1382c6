use indexmap::IndexMap;
use serde::Serialize;

use crate::table::{ExpressionTable, MetadataTable};

pub const DEFAULT_EXPRESSION_COLUMN_LIMIT: usize = 20;
const LISTED_COLUMNS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableMissing {
    pub total_cells: usize,
    pub missing_cells: usize,
    pub missing_percentage: f64,
    pub by_column: IndexMap<String, usize>,
}

impl TableMissing {
    fn new(total_cells: usize, missing_cells: usize, by_column: IndexMap<String, usize>) -> Self {
        let missing_percentage = if total_cells > 0 {
            missing_cells as f64 / total_cells as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_cells,
            missing_cells,
            missing_percentage,
            by_column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingDataReport {
    pub metadata: Option<TableMissing>,
    pub expression: Option<TableMissing>,
    pub total_missing: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
    pub percent_of_rows: f64,
}

impl MissingDataReport {
    pub fn missing_by_column(&self) -> Option<&IndexMap<String, usize>> {
        self.metadata.as_ref().map(|metadata| &metadata.by_column)
    }

    pub fn column_breakdown(&self, rows: usize) -> Vec<ColumnMissing> {
        let Some(by_column) = self.missing_by_column() else {
            return Vec::new();
        };
        by_column
            .iter()
            .filter(|(_, missing)| **missing > 0)
            .map(|(column, missing)| ColumnMissing {
                column: column.clone(),
                missing: *missing,
                percent_of_rows: if rows > 0 {
                    *missing as f64 / rows as f64 * 100.0
                } else {
                    0.0
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl QualityTier {
    pub fn from_completion_rate(rate: f64) -> Self {
        if rate >= 95.0 {
            QualityTier::Excellent
        } else if rate >= 85.0 {
            QualityTier::Good
        } else if rate >= 70.0 {
            QualityTier::Moderate
        } else {
            QualityTier::Poor
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "Excellent data quality! Missing data is minimal.",
            QualityTier::Good => "Good data quality. Some missing values present but manageable.",
            QualityTier::Moderate => {
                "Moderate data quality. Consider imputation strategies for missing values."
            }
            QualityTier::Poor => "Poor data quality. Significant missing data may impact analysis.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionShape {
    pub features: usize,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub metadata_records: usize,
    pub expression: Option<ExpressionShape>,
    pub total_missing: usize,
    pub completion_rate: f64,
    pub organism_distribution: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
pub struct QualityReporter {
    expression_column_limit: usize,
}

impl Default for QualityReporter {
    fn default() -> Self {
        Self::new(DEFAULT_EXPRESSION_COLUMN_LIMIT)
    }
}

impl QualityReporter {
    pub fn new(expression_column_limit: usize) -> Self {
        Self {
            expression_column_limit,
        }
    }

    pub fn missing_report(
        &self,
        metadata: &MetadataTable,
        expression: Option<&ExpressionTable>,
    ) -> MissingDataReport {
        let metadata_missing = (!metadata.is_empty()).then(|| {
            let mut by_column: IndexMap<String, usize> = IndexMap::new();
            let mut missing = 0;
            for (idx, column) in metadata.columns().iter().enumerate() {
                let count = metadata.missing_count(idx);
                missing += count;
                *by_column.entry(column.clone()).or_insert(0) += count;
            }
            TableMissing::new(
                metadata.row_count() * metadata.column_count(),
                missing,
                by_column,
            )
        });

        let expression_missing = expression
            .filter(|expression| !expression.is_empty())
            .map(|expression| {
                let by_column = expression.missing_by_column();
                let missing = by_column.iter().map(|(_, count)| count).sum();
                TableMissing::new(
                    expression.row_count() * expression.column_count(),
                    missing,
                    by_column
                        .into_iter()
                        .take(self.expression_column_limit)
                        .collect(),
                )
            });

        let (total_cells, total_missing) = [&metadata_missing, &expression_missing]
            .into_iter()
            .flatten()
            .fold((0usize, 0usize), |(cells, missing), table| {
                (cells + table.total_cells, missing + table.missing_cells)
            });
        let completion_rate = if total_cells > 0 {
            (total_cells - total_missing) as f64 / total_cells as f64 * 100.0
        } else {
            0.0
        };

        MissingDataReport {
            metadata: metadata_missing,
            expression: expression_missing,
            total_missing,
            completion_rate,
        }
    }

    pub fn recommendations(&self, report: &MissingDataReport) -> Vec<String> {
        let mut recommendations =
            vec![QualityTier::from_completion_rate(report.completion_rate).message().to_string()];

        let Some(by_column) = report.missing_by_column() else {
            return recommendations;
        };
        let with_missing: Vec<&str> = by_column
            .iter()
            .filter(|(_, missing)| **missing > 0)
            .map(|(column, _)| column.as_str())
            .collect();
        if !with_missing.is_empty() {
            let listed = &with_missing[..with_missing.len().min(LISTED_COLUMNS)];
            recommendations.push(format!("Columns with missing data: {}", listed.join(", ")));
            if with_missing.len() > LISTED_COLUMNS {
                recommendations.push(format!(
                    "And {} more columns with missing data.",
                    with_missing.len() - LISTED_COLUMNS
                ));
            }
        }

        if by_column
            .keys()
            .any(|column| column.to_lowercase().contains("organism"))
        {
            recommendations.push(
                "Organism information has missing values. Consider manual curation for better analysis."
                    .to_string(),
            );
        }
        recommendations
    }

    pub fn summary(
        &self,
        metadata: &MetadataTable,
        expression: Option<&ExpressionTable>,
        report: &MissingDataReport,
    ) -> DatasetSummary {
        DatasetSummary {
            metadata_records: metadata.row_count(),
            expression: expression.map(|expression| ExpressionShape {
                features: expression.row_count(),
                samples: expression.column_count(),
            }),
            total_missing: report.total_missing,
            completion_rate: report.completion_rate,
            organism_distribution: metadata
                .column_index("organism")
                .map(|idx| metadata.value_counts(idx))
                .unwrap_or_default(),
        }
    }
}
