//! Provisioning configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - The connection URI is held as a [`SecretString`] and only leaves this
//!   crate with credentials stripped, via [`ProvisionConfig::redacted`].

use movie_index_domain::{CollectionName, DatabaseName, PrimitiveError, VectorSearchMode};
use movie_index_shared::{BoundedU32, ErrorCode, ErrorEnvelope, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Connection string used when none is configured.
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
/// Database used when none is configured.
pub const DEFAULT_DATABASE: &str = "movies";
/// Collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "movies";
/// Embedding length used when none is configured.
pub const DEFAULT_VECTOR_DIMENSIONS: u32 = 1536;

/// Smallest accepted vector dimensionality.
pub const VECTOR_DIMENSIONS_MIN: u32 = 1;
/// Largest accepted vector dimensionality.
pub const VECTOR_DIMENSIONS_MAX: u32 = 65_536;

const MONGODB_SCHEMES: [&str; 2] = ["mongodb", "mongodb+srv"];

/// Sanitizes a connection URI for error messages and display by stripping
/// credentials.
///
/// Seed-list URIs (`host1:27017,host2:27017`) are not valid WHATWG URLs, so
/// they fall back to removing the userinfo segment by hand.
pub(crate) fn sanitize_uri_for_error(uri: &str) -> String {
    let Ok(mut parsed) = Url::parse(uri) else {
        return strip_userinfo(uri);
    };
    if parsed.password().is_some() || !parsed.username().is_empty() {
        // Clear credentials before display.
        if parsed.set_username("").is_err() || parsed.set_password(None).is_err() {
            return strip_userinfo(uri);
        }
    }
    parsed.to_string()
}

fn strip_userinfo(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return "[invalid uri]".to_owned();
    };
    let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    let hosts = authority
        .rsplit_once('@')
        .map_or(authority, |(_, hosts)| hosts);
    format!("{scheme}://{hosts}{tail}")
}

/// Root provisioning configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ProvisionConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Target store and collection.
    pub store: StoreConfig,
    /// Vector-search index settings.
    pub vector_search: VectorSearchConfig,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            store: StoreConfig::default(),
            vector_search: VectorSearchConfig::default(),
        }
    }
}

impl ProvisionConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedProvisionConfig, ConfigSchemaError> {
        self.validate_version()?;

        self.store.normalize();
        let (database, collection) = self.store.validate()?;
        let vector_search = self.vector_search.validate()?;

        Ok(ValidatedProvisionConfig {
            raw: self,
            database,
            collection,
            vector_search,
        })
    }

    /// Copy of the config with credentials stripped from the connection URI.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.store.uri = SecretString::new(sanitize_uri_for_error(self.store.uri.expose()));
        copy
    }

    const fn validate_version(&self) -> Result<(), ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        Ok(())
    }
}

/// Validated config wrapper carrying parsed names and the provisioning mode.
#[derive(Debug, Clone)]
pub struct ValidatedProvisionConfig {
    raw: ProvisionConfig,
    database: DatabaseName,
    collection: CollectionName,
    vector_search: VectorSearchMode,
}

impl ValidatedProvisionConfig {
    /// Validated database name.
    #[must_use]
    pub const fn database(&self) -> &DatabaseName {
        &self.database
    }

    /// Validated collection name.
    #[must_use]
    pub const fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Connection URI; expose only when opening a client.
    #[must_use]
    pub const fn uri(&self) -> &SecretString {
        &self.raw.store.uri
    }

    /// Whether and how the vector-search phase runs.
    #[must_use]
    pub const fn vector_search_mode(&self) -> VectorSearchMode {
        self.vector_search
    }

    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &ProvisionConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> ProvisionConfig {
        self.raw
    }
}

impl AsRef<ProvisionConfig> for ValidatedProvisionConfig {
    fn as_ref(&self) -> &ProvisionConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedProvisionConfig {
    type Target = ProvisionConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse a provisioning config from a JSON string, applying validation and normalization.
pub fn parse_provision_config_json(
    input: &str,
) -> Result<ValidatedProvisionConfig, ErrorEnvelope> {
    let config: ProvisionConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a provisioning config from a TOML string, applying validation and normalization.
pub fn parse_provision_config_toml(
    input: &str,
) -> Result<ValidatedProvisionConfig, ErrorEnvelope> {
    let config: ProvisionConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Store connection and target collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct StoreConfig {
    /// `mongodb://` or `mongodb+srv://` connection string.
    #[serde(with = "secret_string")]
    pub uri: SecretString,
    /// Database that owns the collection.
    pub database: Box<str>,
    /// Movie collection name.
    pub collection: Box<str>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: SecretString::new(DEFAULT_MONGODB_URI),
            database: DEFAULT_DATABASE.into(),
            collection: DEFAULT_COLLECTION.into(),
        }
    }
}

impl StoreConfig {
    fn normalize(&mut self) {
        let trimmed_uri = self.uri.expose().trim();
        if trimmed_uri.len() != self.uri.expose().len() {
            self.uri = SecretString::new(trimmed_uri.to_owned());
        }
        normalize_boxed_str(&mut self.database);
        normalize_boxed_str(&mut self.collection);
    }

    fn validate(&self) -> Result<(DatabaseName, CollectionName), ConfigSchemaError> {
        validate_mongodb_uri(self.uri.expose())?;

        let database =
            DatabaseName::parse(&self.database).map_err(|source| ConfigSchemaError::InvalidName {
                field: "database",
                source,
            })?;
        let collection = CollectionName::parse(&self.collection).map_err(|source| {
            ConfigSchemaError::InvalidName {
                field: "collection",
                source,
            }
        })?;
        Ok((database, collection))
    }
}

/// Vector-search index settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct VectorSearchConfig {
    /// Create the vector-search index before the conventional indexes.
    pub enabled: bool,
    /// Embedding vector length; ignored when disabled.
    pub dimensions: u32,
}

impl Default for VectorSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dimensions: DEFAULT_VECTOR_DIMENSIONS,
        }
    }
}

impl VectorSearchConfig {
    fn validate(self) -> Result<VectorSearchMode, ConfigSchemaError> {
        if !self.enabled {
            return Ok(VectorSearchMode::Disabled);
        }
        let dimensions = bounded_u32::<VECTOR_DIMENSIONS_MIN, VECTOR_DIMENSIONS_MAX>(
            "vectorSearch",
            "dimensions",
            self.dimensions,
        )?;
        Ok(VectorSearchMode::Enabled {
            dimensions: dimensions.get(),
        })
    }
}

/// Schema validation errors (mapped to `ErrorEnvelope` at boundaries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A numeric value is out of bounds.
    OutOfRange {
        /// Schema section (e.g. `vectorSearch`).
        section: &'static str,
        /// Field name in the config file (e.g. `dimensions`).
        field: &'static str,
        /// Value provided.
        value: u32,
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
    },
    /// A database or collection name is not usable.
    InvalidName {
        /// Field name in the `store` section.
        field: &'static str,
        /// Underlying primitive validation failure.
        source: PrimitiveError,
    },
    /// The connection URI is malformed or uses an unsupported scheme.
    InvalidUri {
        /// Sanitized URI (credentials stripped).
        uri: String,
        /// Why the URI was rejected.
        reason: &'static str,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::OutOfRange { field, .. } => ErrorCode::new("config", format!("invalid_{field}")),
            Self::InvalidName { field, .. } => ErrorCode::new("config", format!("invalid_{field}")),
            Self::InvalidUri { .. } => ErrorCode::new("config", "invalid_uri"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => {
                write!(
                    formatter,
                    "unsupported config version: {found} (supported: {supported})"
                )
            },
            Self::OutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => write!(
                formatter,
                "{section}.{field} must be between {min} and {max} (got {value})"
            ),
            Self::InvalidName { field, source } => write!(formatter, "store.{field}: {source}"),
            Self::InvalidUri { uri, reason } => {
                write!(formatter, "store.uri is invalid ({reason}): {uri}")
            },
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::OutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", value.to_string())
                .with_metadata("min", min.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::InvalidName { field, source } => {
                let detail = Self::from(source);
                envelope
                    .with_metadata("section", "store")
                    .with_metadata("field", field)
                    .with_metadata("reason", detail.code.to_string())
            },
            ConfigSchemaError::InvalidUri { uri, .. } => envelope
                .with_metadata("section", "store")
                .with_metadata("field", "uri")
                .with_metadata("uri", uri),
        }
    }
}

fn bounded_u32<const MIN: u32, const MAX: u32>(
    section: &'static str,
    field: &'static str,
    value: u32,
) -> Result<BoundedU32<MIN, MAX>, ConfigSchemaError> {
    BoundedU32::try_new(value).map_err(|bounds| ConfigSchemaError::OutOfRange {
        section,
        field,
        value,
        min: bounds.min,
        max: bounds.max,
    })
}

fn validate_mongodb_uri(value: &str) -> Result<(), ConfigSchemaError> {
    let invalid = |reason| ConfigSchemaError::InvalidUri {
        uri: sanitize_uri_for_error(value),
        reason,
    };

    let Some((scheme, rest)) = value.split_once("://") else {
        return Err(invalid("missing scheme"));
    };
    if !MONGODB_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
        return Err(invalid("scheme must be mongodb or mongodb+srv"));
    }
    let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
    let hosts = rest
        .get(..authority_end)
        .map(|authority| authority.rsplit_once('@').map_or(authority, |(_, hosts)| hosts))
        .unwrap_or_default();
    if hosts.is_empty() {
        return Err(invalid("missing host"));
    }

    Ok(())
}

fn normalize_boxed_str(value: &mut Box<str>) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_owned().into_boxed_str();
    }
}

mod secret_string {
    use movie_index_shared::SecretString;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.expose())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<SecretString, D::Error> {
        String::deserialize(deserializer).map(SecretString::from)
    }
}
