use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::error::KiraError;
use crate::table::MetadataTable;

const ORGANISM_KEYWORDS: &[&str] = &[
    "organism",
    "species",
    "taxonomy",
    "taxon",
    "organism_ch1",
    "source_name_ch1",
    "characteristics_ch1",
    "organism_part",
];

const TAXONOMIC_PARTICLES: &[&str] = &["sp.", "var.", "subsp.", "cf."];

const SEEDED: &[(&str, &[&str])] = &[
    (
        "Homo sapiens",
        &["human", "h. sapiens", "homo sapiens", "h.sapiens", "homo_sapiens", "hsa", "hsapiens"],
    ),
    (
        "Mus musculus",
        &["mouse", "m. musculus", "mus musculus", "m.musculus", "mus_musculus", "mmu", "mmusculus"],
    ),
    (
        "Rattus norvegicus",
        &[
            "rat",
            "r. norvegicus",
            "rattus norvegicus",
            "r.norvegicus",
            "rattus_norvegicus",
            "rno",
            "rnorvegicus",
        ],
    ),
    (
        "Danio rerio",
        &["zebrafish", "d. rerio", "danio rerio", "d.rerio", "danio_rerio", "dre", "drerio"],
    ),
    (
        "Drosophila melanogaster",
        &[
            "fruit fly",
            "fruitfly",
            "d. melanogaster",
            "drosophila melanogaster",
            "d.melanogaster",
            "drosophila_melanogaster",
            "dme",
            "dmelanogaster",
        ],
    ),
    (
        "Caenorhabditis elegans",
        &[
            "c. elegans",
            "caenorhabditis elegans",
            "c.elegans",
            "caenorhabditis_elegans",
            "cel",
            "celegans",
            "worm",
        ],
    ),
    (
        "Saccharomyces cerevisiae",
        &[
            "yeast",
            "s. cerevisiae",
            "saccharomyces cerevisiae",
            "s.cerevisiae",
            "saccharomyces_cerevisiae",
            "sce",
            "scerevisiae",
        ],
    ),
    (
        "Arabidopsis thaliana",
        &[
            "arabidopsis",
            "a. thaliana",
            "arabidopsis thaliana",
            "a.thaliana",
            "arabidopsis_thaliana",
            "ath",
            "athaliana",
        ],
    ),
];

const SEEDED_PATTERNS: &[(&str, &str)] = &[
    (r"\b(homo\s+sapiens|h\.\s*sapiens|human)\b", "Homo sapiens"),
    (r"\b(mus\s+musculus|m\.\s*musculus|mouse)\b", "Mus musculus"),
    (r"\b(rattus\s+norvegicus|r\.\s*norvegicus|rat)\b", "Rattus norvegicus"),
    (r"\b(danio\s+rerio|d\.\s*rerio|zebrafish)\b", "Danio rerio"),
    (
        r"\b(drosophila\s+melanogaster|d\.\s*melanogaster|fruit\s*fly)\b",
        "Drosophila melanogaster",
    ),
    (r"\b(caenorhabditis\s+elegans|c\.\s*elegans|worm)\b", "Caenorhabditis elegans"),
    (
        r"\b(saccharomyces\s+cerevisiae|s\.\s*cerevisiae|yeast)\b",
        "Saccharomyces cerevisiae",
    ),
    (r"\b(arabidopsis\s+thaliana|a\.\s*thaliana|arabidopsis)\b", "Arabidopsis thaliana"),
];

#[derive(Debug, Clone)]
pub struct OrganismRule {
    pattern: Regex,
    canonical: String,
}

impl OrganismRule {
    pub fn new(pattern: &str, canonical: &str) -> Result<Self, KiraError> {
        let pattern = Regex::new(&format!("(?i){pattern}"))
            .map_err(|err| KiraError::InvalidPattern(format!("{pattern}: {err}")))?;
        Ok(Self {
            pattern,
            canonical: canonical.to_string(),
        })
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnOrganismStats {
    pub unique_count: usize,
    pub most_common: Vec<(String, usize)>,
    pub missing_count: usize,
}

/// Canonicalizes free-text organism names. Lookup order is exact alias,
/// then the ordered pattern rules, then title-casing the input.
#[derive(Debug, Clone)]
pub struct OrganismNormalizer {
    aliases: HashMap<String, String>,
    rules: Vec<OrganismRule>,
    punctuation: Regex,
    whitespace: Regex,
}

impl OrganismNormalizer {
    pub fn new() -> Result<Self, KiraError> {
        let mut aliases = HashMap::new();
        for (canonical, names) in SEEDED {
            for name in *names {
                aliases.insert(name.to_string(), canonical.to_string());
            }
        }
        let rules = SEEDED_PATTERNS
            .iter()
            .map(|(pattern, canonical)| OrganismRule::new(pattern, canonical))
            .collect::<Result<Vec<_>, _>>()?;
        let punctuation = Regex::new(r"[^\w\s.]")
            .map_err(|err| KiraError::InvalidPattern(err.to_string()))?;
        let whitespace =
            Regex::new(r"\s+").map_err(|err| KiraError::InvalidPattern(err.to_string()))?;
        Ok(Self {
            aliases,
            rules,
            punctuation,
            whitespace,
        })
    }

    pub fn add_alias(&mut self, raw: &str, canonical: &str) {
        self.aliases
            .insert(raw.trim().to_lowercase(), canonical.to_string());
    }

    pub fn add_rule(&mut self, rule: OrganismRule) {
        self.rules.push(rule);
    }

    pub fn list_canonical_organisms(&self) -> BTreeSet<String> {
        self.aliases.values().cloned().collect()
    }

    fn clean_key(&self, name: &str) -> String {
        let lower = name.trim().to_lowercase();
        let collapsed = self.whitespace.replace_all(&lower, " ");
        let stripped = self.punctuation.replace_all(&collapsed, " ");
        self.whitespace
            .replace_all(stripped.trim(), " ")
            .into_owned()
    }

    pub fn normalize(&self, name: &str) -> String {
        if name.is_empty() {
            return String::new();
        }
        let key = self.clean_key(name);
        if let Some(canonical) = self.aliases.get(&key) {
            return canonical.clone();
        }
        if let Some(rule) = self.rules.iter().find(|rule| rule.pattern.is_match(&key)) {
            return rule.canonical.clone();
        }
        title_case(name)
    }

    pub fn normalize_cell(&self, value: Option<&str>) -> Option<String> {
        value.map(|name| self.normalize(name))
    }

    pub fn organism_columns(&self, table: &MetadataTable) -> Vec<usize> {
        table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, column)| is_organism_column(column))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn normalize_table(&self, table: &MetadataTable) -> MetadataTable {
        let columns = self.organism_columns(table);
        let mut normalized = table.clone();
        for row in &mut normalized.rows {
            for &idx in &columns {
                row[idx] = self.normalize_cell(row[idx].as_deref());
            }
        }
        tracing::debug!(columns = columns.len(), "normalized organism columns");
        normalized
    }

    pub fn organism_statistics(
        &self,
        table: &MetadataTable,
        top: usize,
    ) -> IndexMap<String, ColumnOrganismStats> {
        self.organism_columns(table)
            .into_iter()
            .map(|idx| {
                let counts = table.value_counts(idx);
                let stats = ColumnOrganismStats {
                    unique_count: counts.len(),
                    most_common: counts.into_iter().take(top).collect(),
                    missing_count: table.missing_count(idx),
                };
                (table.columns()[idx].clone(), stats)
            })
            .collect()
    }
}

pub fn is_organism_column(name: &str) -> bool {
    let lower = name.to_lowercase();
    ORGANISM_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}

pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .enumerate()
        .map(|(idx, word)| {
            let lower = word.to_lowercase();
            if idx > 0 && TAXONOMIC_PARTICLES.contains(&lower.as_str()) {
                return lower;
            }
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
