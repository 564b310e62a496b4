//! Integration tests for parsing config fixtures from the workspace testkit.

use movie_index_config::{
    CURRENT_CONFIG_VERSION, ProvisionConfig, ProvisionConfigOverrides, ProvisionEnv,
    load_provision_config_from_path, parse_provision_config_json, parse_provision_config_toml,
    to_pretty_json,
};
use movie_index_domain::VectorSearchMode;
use movie_index_shared::ErrorCode;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
}

fn fixture_path(relative: &str) -> PathBuf {
    workspace_root()
        .join("crates")
        .join("testkit")
        .join("fixtures")
        .join(relative)
}

fn read_fixture(relative: &str) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(fixture_path(relative))?)
}

#[test]
fn parses_valid_fixture_and_normalizes() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/provision-config.valid.json")?;
    let config = parse_provision_config_json(&contents)?;

    assert_eq!(config.version, CURRENT_CONFIG_VERSION);
    assert_eq!(config.database().as_str(), "cinema", "database should be trimmed");
    assert_eq!(config.collection().as_str(), "movies");
    assert_eq!(
        config.vector_search_mode(),
        VectorSearchMode::Enabled { dimensions: 768 }
    );
    Ok(())
}

#[test]
fn parses_default_toml_fixture() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/provision-config.default.toml")?;
    let config = parse_provision_config_toml(&contents)?;

    assert_eq!(config.as_ref(), &ProvisionConfig::default());
    Ok(())
}

#[test]
fn invalid_fixture_reports_error_code() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/provision-config.invalid.json")?;
    let error = parse_provision_config_json(&contents)
        .err()
        .ok_or_else(|| std::io::Error::other("expected invalid fixture error"))?;

    assert_eq!(error.code, ErrorCode::new("config", "invalid_dimensions"));
    assert_eq!(
        error.metadata.get("section").map(String::as_str),
        Some("vectorSearch")
    );
    assert_eq!(
        error.metadata.get("value").map(String::as_str),
        Some("70000")
    );
    Ok(())
}

#[test]
fn loads_toml_fixture_from_path() -> Result<(), Box<dyn Error>> {
    let path = fixture_path("config/provision-config.default.toml");
    let config = load_provision_config_from_path(
        Some(&path),
        &ProvisionConfigOverrides::default(),
        &ProvisionEnv::default(),
    )?;
    assert_eq!(config.vector_search_mode().dimensions(), Some(1536));
    Ok(())
}

#[test]
fn effective_config_output_hides_credentials() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/provision-config.valid.json")?;
    let config = parse_provision_config_json(&contents)?;

    let rendered = to_pretty_json(&config)?;
    assert!(!rendered.contains("s3cr3t"));
    assert!(!rendered.contains("indexer"));
    assert!(rendered.contains("db.example.com:27017"));
    Ok(())
}
