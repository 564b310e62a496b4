//! # movie-index-config
//!
//! Configuration schema, validation, and loading for the provisioning host.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file + overrides).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use schema::{
    CURRENT_CONFIG_VERSION, ConfigSchemaError, DEFAULT_COLLECTION, DEFAULT_DATABASE,
    DEFAULT_MONGODB_URI, DEFAULT_VECTOR_DIMENSIONS, ProvisionConfig, StoreConfig,
    VECTOR_DIMENSIONS_MAX, VECTOR_DIMENSIONS_MIN, ValidatedProvisionConfig, VectorSearchConfig,
    parse_provision_config_json, parse_provision_config_toml,
};

pub use env::{
    ENV_COLLECTION, ENV_DATABASE, ENV_MONGODB_URI, ENV_VECTOR_DIMENSIONS,
    ENV_VECTOR_SEARCH_ENABLED, EnvParseError, ProvisionEnv, apply_env_overrides,
};
pub use load::{
    ProvisionConfigOverrides, load_provision_config_from_path, load_provision_config_from_sources,
    load_provision_config_std_env, to_pretty_json, to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
