//! Environment variable parsing and merging.

use crate::schema::{ProvisionConfig, ValidatedProvisionConfig};
use movie_index_shared::{ErrorCode, ErrorEnvelope, SecretString, redact_if_secret};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: store connection string.
pub const ENV_MONGODB_URI: &str = "MOVIE_INDEX_MONGODB_URI";
/// Env var: database name.
pub const ENV_DATABASE: &str = "MOVIE_INDEX_DATABASE";
/// Env var: collection name.
pub const ENV_COLLECTION: &str = "MOVIE_INDEX_COLLECTION";
/// Env var: enable the vector-search phase.
pub const ENV_VECTOR_SEARCH_ENABLED: &str = "MOVIE_INDEX_VECTOR_SEARCH_ENABLED";
/// Env var: vector dimensionality.
pub const ENV_VECTOR_DIMENSIONS: &str = "MOVIE_INDEX_VECTOR_DIMENSIONS";

const ENV_VARS: [&str; 5] = [
    ENV_MONGODB_URI,
    ENV_DATABASE,
    ENV_COLLECTION,
    ENV_VECTOR_SEARCH_ENABLED,
    ENV_VECTOR_DIMENSIONS,
];

/// Typed env-derived overrides for `ProvisionConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionEnv {
    /// Override for `store.uri`.
    pub mongodb_uri: Option<SecretString>,
    /// Override for `store.database`.
    pub database: Option<Box<str>>,
    /// Override for `store.collection`.
    pub collection: Option<Box<str>>,
    /// Override for `vectorSearch.enabled`.
    pub vector_search_enabled: Option<bool>,
    /// Override for `vectorSearch.dimensions`.
    pub vector_dimensions: Option<u32>,
}

impl ProvisionEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            mongodb_uri: parse_optional_secret(map, ENV_MONGODB_URI)?,
            database: parse_optional_trimmed_string(map, ENV_DATABASE)?,
            collection: parse_optional_trimmed_string(map, ENV_COLLECTION)?,
            vector_search_enabled: parse_optional_bool(map, ENV_VECTOR_SEARCH_ENABLED)?,
            vector_dimensions: parse_optional_u32(map, ENV_VECTOR_DIMENSIONS)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ENV_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_string(), value);
            }
        }

        Self::from_map(&map)
    }

    /// True when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mongodb_uri.is_none()
            && self.database.is_none()
            && self.collection.is_none()
            && self.vector_search_enabled.is_none()
            && self.vector_dimensions.is_none()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: ProvisionConfig,
    env: &ProvisionEnv,
) -> Result<ValidatedProvisionConfig, ErrorEnvelope> {
    let mut config = base;

    if let Some(uri) = &env.mongodb_uri {
        config.store.uri = uri.clone();
    }
    if let Some(database) = &env.database {
        config.store.database = database.clone();
    }
    if let Some(collection) = &env.collection {
        config.store.collection = collection.clone();
    }
    if let Some(enabled) = env.vector_search_enabled {
        config.vector_search.enabled = enabled;
    }
    if let Some(dimensions) = env.vector_dimensions {
        config.vector_search.dimensions = dimensions;
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Env parsing errors (mapped to `ErrorEnvelope` at boundaries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// A secret env var was present but empty after trimming.
    EmptySecret {
        /// Env var name.
        var: &'static str,
    },
    /// Boolean env var had an invalid value.
    InvalidBool {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } | Self::EmptySecret { .. } => {
                ErrorCode::new("config", "empty_env_var")
            },
            Self::InvalidBool { .. } => ErrorCode::new("config", "invalid_env_bool"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } | Self::EmptySecret { var } => {
                write!(formatter, "{var} must be non-empty")
            },
            Self::InvalidBool { var, .. } => write!(formatter, "{var} must be a boolean"),
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } | EnvParseError::EmptySecret { var } => {
                envelope.with_metadata("env_var", var)
            },
            EnvParseError::InvalidBool { var, value } | EnvParseError::InvalidInt { var, value } => {
                envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", redact_if_secret(var, &value))
            },
        }
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.to_owned().into_boxed_str()))
}

fn parse_optional_secret(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<SecretString>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptySecret { var });
    }

    Ok(Some(SecretString::new(trimmed.to_owned())))
}

fn parse_optional_u32(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u32>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: raw.clone(),
        })
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(EnvParseError::InvalidBool {
            var,
            value: raw.clone(),
        }),
    }
}
