use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KiraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoAccessionKind {
    Dataset,
    Series,
    Platform,
    Sample,
}

impl GeoAccessionKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            GeoAccessionKind::Dataset => "GDS",
            GeoAccessionKind::Series => "GSE",
            GeoAccessionKind::Platform => "GPL",
            GeoAccessionKind::Sample => "GSM",
        }
    }
}

impl fmt::Display for GeoAccessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoAccessionKind::Dataset => write!(f, "dataset"),
            GeoAccessionKind::Series => write!(f, "series"),
            GeoAccessionKind::Platform => write!(f, "platform"),
            GeoAccessionKind::Sample => write!(f, "sample"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoAccession {
    id: String,
    kind: GeoAccessionKind,
}

impl GeoAccession {
    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> GeoAccessionKind {
        self.kind
    }
}

impl fmt::Display for GeoAccession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl FromStr for GeoAccession {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let kind = [
            GeoAccessionKind::Dataset,
            GeoAccessionKind::Series,
            GeoAccessionKind::Platform,
            GeoAccessionKind::Sample,
        ]
        .into_iter()
        .find(|kind| {
            normalized
                .strip_prefix(kind.prefix())
                .map(|digits| !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit()))
                .unwrap_or(false)
        })
        .ok_or_else(|| KiraError::InvalidGeoAccession(value.to_string()))?;
        Ok(Self {
            id: normalized,
            kind,
        })
    }
}
