//! Config loading helpers (env + file + overrides).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{ProvisionConfig, ProvisionEnv, ValidatedProvisionConfig, apply_env_overrides};
use movie_index_shared::{ErrorClass, ErrorCode, ErrorEnvelope, SecretString};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Partial config applied on top of the file contents.
///
/// Hosts fill this from command-line flags; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ProvisionConfigOverrides {
    /// Override for `store.uri`.
    pub uri: Option<Box<str>>,
    /// Override for `store.database`.
    pub database: Option<Box<str>>,
    /// Override for `store.collection`.
    pub collection: Option<Box<str>>,
    /// Override for `vectorSearch.enabled`.
    pub vector_search_enabled: Option<bool>,
    /// Override for `vectorSearch.dimensions`.
    pub vector_dimensions: Option<u32>,
}

impl ProvisionConfigOverrides {
    /// Parse overrides from a JSON object.
    pub fn from_json(input: &str) -> Result<Self, ErrorEnvelope> {
        serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid overrides JSON: {error}"),
            )
            .with_metadata("source", "overrides")
        })
    }

    fn apply(&self, config: &mut ProvisionConfig) {
        if let Some(uri) = &self.uri {
            config.store.uri = SecretString::new(uri.clone());
        }
        if let Some(database) = &self.database {
            config.store.database = database.clone();
        }
        if let Some(collection) = &self.collection {
            config.store.collection = collection.clone();
        }
        if let Some(enabled) = self.vector_search_enabled {
            config.vector_search.enabled = enabled;
        }
        if let Some(dimensions) = self.vector_dimensions {
            config.vector_search.dimensions = dimensions;
        }
    }
}

/// Load the provisioning config from sources using a deterministic precedence order.
///
/// Precedence (highest wins):
/// - env overrides (`ProvisionEnv`)
/// - explicit overrides (`ProvisionConfigOverrides`)
/// - config JSON (file content)
/// - defaults (`ProvisionConfig::default()`)
pub fn load_provision_config_from_sources(
    config_json: Option<&str>,
    overrides: &ProvisionConfigOverrides,
    env: &ProvisionEnv,
) -> Result<ValidatedProvisionConfig, ErrorEnvelope> {
    let mut config = match config_json {
        None => ProvisionConfig::default(),
        Some(input) => parse_config_unvalidated(input, ConfigFormat::Json)?,
    };

    overrides.apply(&mut config);

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the provisioning config from an optional file path.
pub fn load_provision_config_from_path(
    config_path: Option<&Path>,
    overrides: &ProvisionConfigOverrides,
    env: &ProvisionEnv,
) -> Result<ValidatedProvisionConfig, ErrorEnvelope> {
    let mut config = match config_path {
        None => ProvisionConfig::default(),
        Some(path) => {
            let config_text = read_config_file(path)?;
            let format = detect_config_format(path)?;
            parse_config_unvalidated(&config_text, format)?
        },
    };

    overrides.apply(&mut config);

    apply_env_overrides(config, env)
}

/// Load the provisioning config from std env and an optional file path.
pub fn load_provision_config_std_env(
    config_path: Option<&Path>,
    overrides: &ProvisionConfigOverrides,
) -> Result<ValidatedProvisionConfig, ErrorEnvelope> {
    let env = ProvisionEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_provision_config_from_path(config_path, overrides, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
///
/// Credentials in the connection URI are stripped first.
pub fn to_pretty_json(config: &ProvisionConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(&config.redacted()).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("core", "internal"),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
///
/// Credentials in the connection URI are stripped first.
pub fn to_pretty_toml(config: &ProvisionConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(&config.redacted()).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<ProvisionConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}
