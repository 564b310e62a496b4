//! # movie-index-domain
//!
//! Domain model for the movie collection and the indexes it needs:
//!
//! - **Movie** - `Movie`, `EmbeddingObject`, and the catalogue record they are built from
//! - **Primitives** - `DatabaseName`, `CollectionName`, `EmbeddingSourceKey`
//! - **Index specs** - store-neutral `IndexSpec` / `SearchIndexSpec`
//! - **Index builder** - the conventional and vector-search specs for movies
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use movie_index_shared::shared_crate_version;

pub mod index_builder;
pub mod index_spec;
pub mod movie;
pub mod primitives;

pub use index_builder::{
    CREATED_AT_INDEX_NAME, EMBEDDING_VECTOR_FIELD, EMBEDDINGS_FIELD, IndexPlan,
    RELEASE_DATE_INDEX_NAME, TEXT_INDEX_NAME, VectorSearchMode, WILDCARD_SEGMENT,
    build_conventional_indexes, build_index_plan, build_vector_indexes,
};
pub use index_spec::{
    DocumentMapping, FieldMapping, IndexKey, IndexKeyKind, IndexSpec, SearchIndexDefinition,
    SearchIndexSpec, SearchMappings, VectorField, VectorSimilarity,
};
pub use movie::{
    EMBEDDING_OBJECT_KIND, EmbeddingObject, EmbeddingUsage, Genre, Movie, SpokenLanguage,
    TmdbMovie,
};
pub use primitives::{
    CollectionName, DatabaseName, EmbeddingSourceKey, MAX_DATABASE_NAME_BYTES, PrimitiveError,
};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
