//! Domain primitives with validated constructors.

use movie_index_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum byte length accepted for a database name.
pub const MAX_DATABASE_NAME_BYTES: usize = 63;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `DatabaseName` is empty after trimming.
    EmptyDatabaseName {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `DatabaseName` contains a forbidden character or is too long.
    InvalidDatabaseName {
        /// Trimmed database name that failed validation.
        input: String,
    },
    /// `CollectionName` is empty after trimming.
    EmptyCollectionName {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `CollectionName` contains `$`, a NUL byte, or uses the `system.` prefix.
    InvalidCollectionName {
        /// Trimmed collection name that failed validation.
        input: String,
    },
    /// `EmbeddingSourceKey` is empty after trimming.
    EmptyEmbeddingSourceKey {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `EmbeddingSourceKey` cannot be used as a single field-path segment.
    InvalidEmbeddingSourceKey {
        /// Trimmed key that failed validation.
        input: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyDatabaseName { .. } | Self::InvalidDatabaseName { .. } => {
                ErrorCode::new("domain", "invalid_database_name")
            },
            Self::EmptyCollectionName { .. } | Self::InvalidCollectionName { .. } => {
                ErrorCode::new("domain", "invalid_collection_name")
            },
            Self::EmptyEmbeddingSourceKey { .. } | Self::InvalidEmbeddingSourceKey { .. } => {
                ErrorCode::new("domain", "invalid_embedding_source_key")
            },
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDatabaseName { .. } => formatter.write_str("DatabaseName must be non-empty"),
            Self::InvalidDatabaseName { .. } => formatter.write_str(
                "DatabaseName must be at most 63 bytes and exclude /\\. \"$ and NUL",
            ),
            Self::EmptyCollectionName { .. } => {
                formatter.write_str("CollectionName must be non-empty")
            },
            Self::InvalidCollectionName { .. } => formatter
                .write_str("CollectionName must not contain $ or NUL or start with `system.`"),
            Self::EmptyEmbeddingSourceKey { .. } => {
                formatter.write_str("EmbeddingSourceKey must be non-empty")
            },
            Self::InvalidEmbeddingSourceKey { .. } => formatter.write_str(
                "EmbeddingSourceKey must not contain `.` or NUL or start with `$`",
            ),
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());

        match error {
            PrimitiveError::EmptyDatabaseName { input_length }
            | PrimitiveError::EmptyCollectionName { input_length }
            | PrimitiveError::EmptyEmbeddingSourceKey { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            PrimitiveError::InvalidDatabaseName { input }
            | PrimitiveError::InvalidCollectionName { input }
            | PrimitiveError::InvalidEmbeddingSourceKey { input } => {
                envelope.with_metadata("input", input)
            },
        }
    }
}

/// Name of the database that owns the movie collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatabaseName(Box<str>);

impl DatabaseName {
    /// Parse a database name accepted by the store.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyDatabaseName {
                input_length: raw.len(),
            });
        };

        let forbidden = |ch: char| matches!(ch, '/' | '\\' | '.' | ' ' | '"' | '$' | '\0');
        if trimmed.len() > MAX_DATABASE_NAME_BYTES || trimmed.contains(forbidden) {
            return Err(PrimitiveError::InvalidDatabaseName {
                input: trimmed.to_owned(),
            });
        }

        Ok(Self(trimmed.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DatabaseName> for String {
    fn from(value: DatabaseName) -> Self {
        value.0.into_string()
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Name of the collection holding movie documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionName(Box<str>);

impl CollectionName {
    /// Parse a collection name accepted by the store.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyCollectionName {
                input_length: raw.len(),
            });
        };

        if trimmed.contains(['$', '\0']) || trimmed.starts_with("system.") {
            return Err(PrimitiveError::InvalidCollectionName {
                input: trimmed.to_owned(),
            });
        }

        Ok(Self(trimmed.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CollectionName {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CollectionName> for String {
    fn from(value: CollectionName) -> Self {
        value.0.into_string()
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Key under `embeddings` naming the source of an embedding (usually a model id).
///
/// The key becomes one segment of the `embeddings.<key>.embedding` path, so it
/// cannot contain a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmbeddingSourceKey(Box<str>);

impl EmbeddingSourceKey {
    /// Parse an embedding source key.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyEmbeddingSourceKey {
                input_length: raw.len(),
            });
        };

        if trimmed.contains(['.', '\0']) || trimmed.starts_with('$') {
            return Err(PrimitiveError::InvalidEmbeddingSourceKey {
                input: trimmed.to_owned(),
            });
        }

        Ok(Self(trimmed.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmbeddingSourceKey {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EmbeddingSourceKey> for String {
    fn from(value: EmbeddingSourceKey) -> Self {
        value.0.into_string()
    }
}

impl fmt::Display for EmbeddingSourceKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

fn trimmed_non_empty(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_name_trims_and_rejects_reserved_forms() {
        assert!(matches!(CollectionName::parse(" movies "), Ok(name) if name.as_str() == "movies"));
        assert!(matches!(
            CollectionName::parse("  "),
            Err(PrimitiveError::EmptyCollectionName { input_length: 2 })
        ));
        assert!(matches!(
            CollectionName::parse("system.views"),
            Err(PrimitiveError::InvalidCollectionName { .. })
        ));
        assert!(matches!(
            CollectionName::parse("movies$tmp"),
            Err(PrimitiveError::InvalidCollectionName { .. })
        ));
    }

    #[test]
    fn database_name_rejects_path_characters() {
        assert!(DatabaseName::parse("catalog").is_ok());
        assert!(DatabaseName::parse("cat.alog").is_err());
        assert!(DatabaseName::parse("cat/alog").is_err());
        assert!(DatabaseName::parse("a".repeat(64)).is_err());
    }

    #[test]
    fn embedding_source_key_must_be_single_segment() {
        assert!(EmbeddingSourceKey::parse("text-embedding-3-small").is_ok());
        assert!(EmbeddingSourceKey::parse("model-a").is_ok());
        assert!(EmbeddingSourceKey::parse("openai.small").is_err());
        assert!(EmbeddingSourceKey::parse("$model").is_err());
    }

    #[test]
    fn primitive_errors_map_to_expected_envelopes() {
        let Err(error) = EmbeddingSourceKey::parse("a.b") else {
            return;
        };
        let envelope = ErrorEnvelope::from(error);

        assert_eq!(envelope.code.namespace(), "domain");
        assert_eq!(envelope.code.code(), "invalid_embedding_source_key");
        assert_eq!(envelope.metadata.get("input").map(String::as_str), Some("a.b"));
    }

    #[test]
    fn serde_rejects_invalid_names() {
        let parsed: Result<CollectionName, _> = serde_json::from_str("\"system.x\"");
        assert!(parsed.is_err());

        let parsed: Result<CollectionName, _> = serde_json::from_str("\"movies\"");
        assert!(matches!(parsed, Ok(name) if name.as_str() == "movies"));
    }
}
