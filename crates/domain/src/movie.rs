//! Movie documents and their named embeddings.
//!
//! Field names serialize exactly as the indexes reference them; the
//! [`fields`] constants are the single source for those paths.

use crate::primitives::EmbeddingSourceKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind tag carried by every embedding object.
pub const EMBEDDING_OBJECT_KIND: &str = "embedding";

/// Stored field paths referenced by index definitions.
pub mod fields {
    /// Movie title.
    pub const TITLE: &str = "title";
    /// Plot overview.
    pub const OVERVIEW: &str = "overview";
    /// Genre names (array of subdocuments).
    pub const GENRE_NAME: &str = "genres.name";
    /// Spoken language names (array of subdocuments).
    pub const SPOKEN_LANGUAGE_NAME: &str = "spoken_languages.name";
    /// Creation timestamp.
    pub const CREATED_AT: &str = "created_at";
    /// Release date, stored as a `YYYY-MM-DD` string.
    pub const RELEASE_DATE: &str = "release_date";
    /// Map of embedding source key to embedding object.
    pub const EMBEDDINGS: &str = "embeddings";
    /// Vector field inside each embedding object.
    pub const EMBEDDING_VECTOR: &str = "embedding";
}

/// Token accounting reported by the embedding provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Total tokens billed.
    pub total_tokens: u32,
}

/// One embedding of a movie, keyed by its source under `embeddings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingObject {
    /// Always [`EMBEDDING_OBJECT_KIND`].
    pub object: String,
    /// The vector; its length must match the provisioned dimensionality.
    pub embedding: Vec<f32>,
    /// Position of the input within the provider batch.
    pub index: u32,
    /// Identifier of the generating model.
    pub model: String,
    /// Optional token usage counters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<EmbeddingUsage>,
}

impl EmbeddingObject {
    /// Build an embedding object with the standard kind tag.
    pub fn new(model: impl Into<String>, index: u32, embedding: Vec<f32>) -> Self {
        Self {
            object: EMBEDDING_OBJECT_KIND.to_owned(),
            embedding,
            index,
            model: model.into(),
            usage: None,
        }
    }

    /// Attach usage counters.
    #[must_use]
    pub const fn with_usage(mut self, usage: EmbeddingUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Number of components in the vector.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}

/// Genre reference as published by the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Catalogue genre id.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// Spoken language reference as published by the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokenLanguage {
    /// ISO 639-1 code.
    pub iso_639_1: String,
    /// Native name.
    pub name: String,
    /// English name.
    pub english_name: String,
}

/// Movie detail record from the upstream catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmdbMovie {
    /// Adult-content flag.
    pub adult: bool,
    /// Production budget in US dollars.
    pub budget: i64,
    /// Genres; `genres.name` is part of the text index.
    pub genres: Vec<Genre>,
    /// Catalogue id.
    pub id: i64,
    /// IMDb identifier.
    pub imdb_id: String,
    /// ISO 639-1 code of the original language.
    pub original_language: String,
    /// Title in the original language.
    pub original_title: String,
    /// Plot summary; text-indexed.
    pub overview: String,
    /// Relative poster image path.
    pub poster_path: String,
    /// Release date as published (`YYYY-MM-DD`).
    pub release_date: String,
    /// Box-office revenue in US dollars.
    pub revenue: i64,
    /// Runtime in minutes.
    pub runtime: i64,
    /// Spoken languages; `spoken_languages.name` is text-indexed.
    pub spoken_languages: Vec<SpokenLanguage>,
    /// Release status, e.g. `Released`.
    pub status: String,
    /// Marketing tagline.
    pub tagline: String,
    /// Display title; text-indexed.
    pub title: String,
}

/// Persisted movie document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Store-assigned document id.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Embeddings keyed by source; keys are open-ended.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub embeddings: BTreeMap<EmbeddingSourceKey, EmbeddingObject>,
    /// Adult-content flag.
    pub adult: bool,
    /// Production budget in US dollars.
    pub budget: i64,
    /// Genres; `genres.name` is part of the text index.
    pub genres: Vec<Genre>,
    /// Catalogue id of the source record.
    pub external_id: i64,
    /// IMDb identifier.
    pub imdb_id: String,
    /// ISO 639-1 code of the original language.
    pub original_language: String,
    /// Title in the original language.
    pub original_title: String,
    /// Plot summary; text-indexed.
    pub overview: String,
    /// Relative poster image path.
    pub poster_path: String,
    /// Release date as published (`YYYY-MM-DD`).
    pub release_date: String,
    /// Box-office revenue in US dollars.
    pub revenue: i64,
    /// Runtime in minutes.
    pub runtime: i64,
    /// Spoken languages; `spoken_languages.name` is text-indexed.
    pub spoken_languages: Vec<SpokenLanguage>,
    /// Release status, e.g. `Released`.
    pub status: String,
    /// Marketing tagline.
    pub tagline: String,
    /// Display title; text-indexed.
    pub title: String,
    /// Insertion time; indexed descending.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// Build a new document from a catalogue record, stamping both audit timestamps.
    #[must_use]
    pub fn from_tmdb(tmdb: TmdbMovie, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            embeddings: BTreeMap::new(),
            adult: tmdb.adult,
            budget: tmdb.budget,
            genres: tmdb.genres,
            external_id: tmdb.id,
            imdb_id: tmdb.imdb_id,
            original_language: tmdb.original_language,
            original_title: tmdb.original_title,
            overview: tmdb.overview,
            poster_path: tmdb.poster_path,
            release_date: tmdb.release_date,
            revenue: tmdb.revenue,
            runtime: tmdb.runtime,
            spoken_languages: tmdb.spoken_languages,
            status: tmdb.status,
            tagline: tmdb.tagline,
            title: tmdb.title,
            created_at: now,
            updated_at: now,
        }
    }

    /// Store an embedding under `source`, returning any embedding it replaced.
    pub fn insert_embedding(
        &mut self,
        source: EmbeddingSourceKey,
        embedding: EmbeddingObject,
        now: DateTime<Utc>,
    ) -> Option<EmbeddingObject> {
        self.updated_at = now;
        self.embeddings.insert(source, embedding)
    }

    /// Dotted field path of the vector stored under `source`.
    #[must_use]
    pub fn embedding_path(source: &EmbeddingSourceKey) -> String {
        format!(
            "{}.{}.{}",
            fields::EMBEDDINGS,
            source.as_str(),
            fields::EMBEDDING_VECTOR
        )
    }
}
