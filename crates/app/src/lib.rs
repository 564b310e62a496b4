//! # movie-index-app
//!
//! Application use case that provisions the movie collection's indexes.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod provision_indexes;

pub use provision_indexes::{
    ProvisionIndexesDeps, ProvisionIndexesInput, ProvisionIndexesOutput, ProvisionPhase,
    provision_indexes,
};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
