use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tempfile::Builder;

use crate::error::KiraError;
use crate::export::{expression_csv_bytes, metadata_csv_bytes};
use crate::fs_util::sanitize_filename;
use crate::pipeline::{ProcessedBundle, QualityOverview};

#[derive(Debug, Clone, Serialize)]
pub struct BundleManifest {
    pub tool: String,
    pub generated_at: String,
    pub files: Vec<String>,
    #[serde(flatten)]
    pub overview: QualityOverview,
}

#[derive(Debug, Clone, Serialize)]
pub struct WrittenBundle {
    pub metadata_path: Utf8PathBuf,
    pub expression_path: Option<Utf8PathBuf>,
    pub report_path: Utf8PathBuf,
}

impl WrittenBundle {
    pub fn paths(&self) -> Vec<&Utf8Path> {
        let mut paths = vec![self.metadata_path.as_path()];
        if let Some(path) = &self.expression_path {
            paths.push(path.as_path());
        }
        paths.push(self.report_path.as_path());
        paths
    }
}

#[derive(Debug, Clone)]
pub struct BundleStore {
    root: Utf8PathBuf,
}

impl BundleStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn ensure_root(&self) -> Result<(), KiraError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))
    }

    pub fn metadata_path(&self, stem: &str) -> Utf8PathBuf {
        self.root.join(format!("{stem}_metadata.csv"))
    }

    pub fn expression_path(&self, stem: &str) -> Utf8PathBuf {
        self.root.join(format!("{stem}_expression.csv"))
    }

    pub fn report_path(&self, stem: &str) -> Utf8PathBuf {
        self.root.join(format!("{stem}_report.json"))
    }

    pub fn write_bundle(
        &self,
        bundle: &ProcessedBundle,
        overview: QualityOverview,
    ) -> Result<WrittenBundle, KiraError> {
        self.ensure_root()?;
        let stem = bundle_stem(bundle.origin.label());

        let metadata_path = self.metadata_path(&stem);
        Self::write_bytes_atomic(&metadata_path, &metadata_csv_bytes(&bundle.metadata)?)?;

        let expression_path = match &bundle.expression {
            Some(expression) => {
                let path = self.expression_path(&stem);
                Self::write_bytes_atomic(&path, &expression_csv_bytes(expression)?)?;
                Some(path)
            }
            None => None,
        };

        let report_path = self.report_path(&stem);
        let written = WrittenBundle {
            metadata_path,
            expression_path,
            report_path,
        };
        let manifest = BundleManifest {
            tool: format!("kira-gc/{}", env!("CARGO_PKG_VERSION")),
            generated_at: chrono::Utc::now().to_rfc3339(),
            files: written
                .paths()
                .iter()
                .filter_map(|path| path.file_name().map(str::to_string))
                .collect(),
            overview,
        };
        let content = serde_json::to_vec_pretty(&manifest)
            .map_err(|err| KiraError::Export(err.to_string()))?;
        Self::write_bytes_atomic(&written.report_path, &content)?;

        tracing::debug!(root = %self.root, stem = %stem, "wrote bundle");
        Ok(written)
    }

    pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), KiraError> {
        let parent = path
            .parent()
            .ok_or_else(|| KiraError::Filesystem("invalid destination path".to_string()))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        let mut temp = Builder::new()
            .prefix("kira-gc-file")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        temp.write_all(content)
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

pub fn bundle_stem(label: &str) -> String {
    let base = match label.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => label,
    };
    let base = base.rsplit(['/', '\\']).next().unwrap_or(base);
    sanitize_filename(base)
}
