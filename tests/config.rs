use std::fs;

use assert_matches::assert_matches;

use kira_geoclean::clean::default_missing_values;
use kira_geoclean::config::{AliasEntry, AliasEntryObject, Config, ConfigLoader};
use kira_geoclean::error::KiraError;

#[test]
fn parse_config_shorthand_and_detailed_aliases() {
    let config = Config {
        organism_aliases: vec![
            AliasEntry::Shorthand("hs=Homo sapiens".to_string()),
            AliasEntry::Detailed(AliasEntryObject {
                alias: " lab mouse ".to_string(),
                canonical: "Mus musculus".to_string(),
            }),
        ],
        extra_missing_values: vec!["?".to_string()],
        top_organisms: Some(3),
        ..Config::default()
    };

    let resolved = ConfigLoader::resolve_config(config).unwrap();
    assert_eq!(resolved.schema_version, 1);
    assert_eq!(resolved.organism_aliases.len(), 2);
    assert_eq!(resolved.organism_aliases[0].alias, "hs");
    assert_eq!(resolved.organism_aliases[0].canonical, "Homo sapiens");
    assert_eq!(resolved.organism_aliases[1].alias, "lab mouse");
    assert_eq!(resolved.missing_values.len(), default_missing_values().len() + 1);
    assert_eq!(resolved.top_organisms, 3);
    assert_eq!(resolved.expression_column_limit, 20);
}

#[test]
fn shorthand_alias_without_separator_is_rejected() {
    let config = Config {
        organism_aliases: vec![AliasEntry::Shorthand("human".to_string())],
        ..Config::default()
    };
    assert_matches!(
        ConfigLoader::resolve_config(config),
        Err(KiraError::InvalidAlias(_))
    );
}

#[test]
fn missing_values_replace_defaults() {
    let config = Config {
        missing_values: Some(vec!["-".to_string()]),
        ..Config::default()
    };
    let resolved = ConfigLoader::resolve_config(config).unwrap();
    assert_eq!(resolved.missing_values, vec!["-".to_string()]);
}

#[test]
fn resolve_reads_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kira-gc.json");
    fs::write(
        &path,
        r#"{
            "schema_version": 1,
            "organism_aliases": ["hs=Homo sapiens", { "alias": "mm", "canonical": "Mus musculus" }],
            "organism_patterns": [{ "pattern": "\\bxenopus\\b", "canonical": "Xenopus laevis" }],
            "expression_column_limit": 5
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.organism_aliases.len(), 2);
    assert_eq!(resolved.organism_patterns[0].canonical, "Xenopus laevis");
    assert_eq!(resolved.expression_column_limit, 5);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(KiraError::ConfigRead(_))
    );
}

#[test]
fn malformed_json_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(KiraError::ConfigParse(_))
    );
}
