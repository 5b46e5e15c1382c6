use std::fs;

use camino::Utf8PathBuf;

use crate::domain::GeoAccession;
use crate::error::KiraError;
use crate::source::GeoSource;

pub trait GeoFetcher: Send + Sync {
    fn fetch(&self, accession: &GeoAccession) -> Result<GeoSource, KiraError>;
}

#[derive(Debug, Clone)]
pub struct LocalGeoFetcher {
    dir: Utf8PathBuf,
}

impl LocalGeoFetcher {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn source_path(&self, accession: &GeoAccession) -> Utf8PathBuf {
        self.dir.join(format!("{}.json", accession.as_str()))
    }
}

impl GeoFetcher for LocalGeoFetcher {
    fn fetch(&self, accession: &GeoAccession) -> Result<GeoSource, KiraError> {
        let path = self.source_path(accession);
        if !path.as_std_path().exists() {
            return Err(KiraError::SourceNotFound(path.to_string()));
        }
        let text = fs::read_to_string(path.as_std_path())
            .map_err(|err| KiraError::Filesystem(format!("read {path}: {err}")))?;
        tracing::debug!(accession = %accession, path = %path, "loaded accession dump");
        GeoSource::from_json_str(&text)
    }
}
