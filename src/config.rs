use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::clean::default_missing_values;
use crate::error::KiraError;
use crate::quality::DEFAULT_EXPRESSION_COLUMN_LIMIT;

pub const DEFAULT_CONFIG_FILE: &str = "kira-gc.json";
pub const DEFAULT_TOP_ORGANISMS: usize = 10;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub missing_values: Option<Vec<String>>,
    #[serde(default)]
    pub extra_missing_values: Vec<String>,
    #[serde(default)]
    pub organism_aliases: Vec<AliasEntry>,
    #[serde(default)]
    pub organism_patterns: Vec<PatternEntry>,
    #[serde(default)]
    pub expression_column_limit: Option<usize>,
    #[serde(default)]
    pub top_organisms: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AliasEntry {
    Shorthand(String),
    Detailed(AliasEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AliasEntryObject {
    pub alias: String,
    pub canonical: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PatternEntry {
    pub pattern: String,
    pub canonical: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganismAlias {
    pub alias: String,
    pub canonical: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganismPattern {
    pub pattern: String,
    pub canonical: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub missing_values: Vec<String>,
    pub organism_aliases: Vec<OrganismAlias>,
    pub organism_patterns: Vec<OrganismPattern>,
    pub expression_column_limit: usize,
    pub top_organisms: usize,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            missing_values: default_missing_values(),
            organism_aliases: Vec::new(),
            organism_patterns: Vec::new(),
            expression_column_limit: DEFAULT_EXPRESSION_COLUMN_LIMIT,
            top_organisms: DEFAULT_TOP_ORGANISMS,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, KiraError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| KiraError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| KiraError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, KiraError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let mut missing_values = config
            .missing_values
            .unwrap_or_else(default_missing_values);
        missing_values.extend(config.extra_missing_values);

        let organism_aliases = config
            .organism_aliases
            .into_iter()
            .map(|entry| match entry {
                AliasEntry::Shorthand(value) => {
                    let (alias, canonical) = value
                        .split_once('=')
                        .ok_or_else(|| KiraError::InvalidAlias(value.clone()))?;
                    OrganismAlias::new(alias, canonical)
                }
                AliasEntry::Detailed(obj) => OrganismAlias::new(&obj.alias, &obj.canonical),
            })
            .collect::<Result<Vec<_>, KiraError>>()?;

        let organism_patterns = config
            .organism_patterns
            .into_iter()
            .map(|entry| OrganismPattern {
                pattern: entry.pattern,
                canonical: entry.canonical,
            })
            .collect();

        Ok(ResolvedConfig {
            schema_version,
            missing_values,
            organism_aliases,
            organism_patterns,
            expression_column_limit: config
                .expression_column_limit
                .unwrap_or(DEFAULT_EXPRESSION_COLUMN_LIMIT),
            top_organisms: config.top_organisms.unwrap_or(DEFAULT_TOP_ORGANISMS),
        })
    }
}

impl OrganismAlias {
    fn new(alias: &str, canonical: &str) -> Result<Self, KiraError> {
        let alias = alias.trim();
        let canonical = canonical.trim();
        if alias.is_empty() || canonical.is_empty() {
            return Err(KiraError::InvalidAlias(format!("{alias}={canonical}")));
        }
        Ok(Self {
            alias: alias.to_string(),
            canonical: canonical.to_string(),
        })
    }
}
