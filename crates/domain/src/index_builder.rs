//! Index specifications required by the movie collection.
//!
//! Every call builds fresh values; nothing here touches a store.

use crate::index_spec::{
    DocumentMapping, FieldMapping, IndexKeyKind, IndexSpec, SearchIndexDefinition,
    SearchIndexSpec, VectorField, VectorSimilarity,
};
use crate::movie::fields;
use serde::{Deserialize, Serialize};

pub use crate::index_spec::WILDCARD_SEGMENT;

/// Name of the full-text index.
pub const TEXT_INDEX_NAME: &str = "movies_text_idx";
/// Name of the descending creation-time index.
pub const CREATED_AT_INDEX_NAME: &str = "created_at_desc_idx";
/// Name of the ascending release-date index.
pub const RELEASE_DATE_INDEX_NAME: &str = "release_date_idx";
/// Top-level field holding named embeddings.
pub const EMBEDDINGS_FIELD: &str = fields::EMBEDDINGS;
/// Vector field inside each embedding object.
pub const EMBEDDING_VECTOR_FIELD: &str = fields::EMBEDDING_VECTOR;

/// Conventional indexes: text search, newest-first, and release-date ordering.
#[must_use]
pub fn build_conventional_indexes() -> Vec<IndexSpec> {
    vec![
        IndexSpec::new(TEXT_INDEX_NAME)
            .with_key(fields::TITLE, IndexKeyKind::Text)
            .with_key(fields::OVERVIEW, IndexKeyKind::Text)
            .with_key(fields::GENRE_NAME, IndexKeyKind::Text)
            .with_key(fields::SPOKEN_LANGUAGE_NAME, IndexKeyKind::Text),
        IndexSpec::new(CREATED_AT_INDEX_NAME).with_key(fields::CREATED_AT, IndexKeyKind::Descending),
        // Release dates are `YYYY-MM-DD` strings, so lexicographic order is chronological.
        IndexSpec::new(RELEASE_DATE_INDEX_NAME)
            .with_key(fields::RELEASE_DATE, IndexKeyKind::Ascending),
    ]
}

/// One unnamed vector-search index over `embeddings.*.embedding`.
///
/// `dimensions` is passed through unchecked; the store rejects values it
/// cannot serve.
#[must_use]
pub fn build_vector_indexes(dimensions: u32) -> Vec<SearchIndexSpec> {
    let embedding_object = DocumentMapping::default().with_field(
        EMBEDDING_VECTOR_FIELD,
        FieldMapping::Vector(VectorField::new(dimensions, VectorSimilarity::Cosine)),
    );
    let embeddings = DocumentMapping::default()
        .with_field(WILDCARD_SEGMENT, FieldMapping::Document(embedding_object));
    let root =
        DocumentMapping::default().with_field(EMBEDDINGS_FIELD, FieldMapping::Document(embeddings));

    vec![SearchIndexSpec::unnamed(SearchIndexDefinition::static_mappings(root))]
}

/// Whether provisioning includes the vector-search phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum VectorSearchMode {
    /// Conventional indexes only.
    Disabled,
    /// Vector-search index with the given dimensionality, then conventional indexes.
    Enabled {
        /// Embedding vector length.
        dimensions: u32,
    },
}

impl VectorSearchMode {
    /// Dimensionality when enabled.
    #[must_use]
    pub const fn dimensions(self) -> Option<u32> {
        match self {
            Self::Disabled => None,
            Self::Enabled { dimensions } => Some(dimensions),
        }
    }
}

/// Everything a provisioning run submits, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexPlan {
    /// Vector-search specs, submitted first.
    pub vector: Vec<SearchIndexSpec>,
    /// Conventional specs, submitted second.
    pub standard: Vec<IndexSpec>,
}

impl IndexPlan {
    /// Total number of specs in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vector.len() + self.standard.len()
    }

    /// True when the plan has no specs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vector.is_empty() && self.standard.is_empty()
    }
}

/// Build the full plan for the given mode.
#[must_use]
pub fn build_index_plan(mode: VectorSearchMode) -> IndexPlan {
    let vector = match mode {
        VectorSearchMode::Disabled => Vec::new(),
        VectorSearchMode::Enabled { dimensions } => build_vector_indexes(dimensions),
    };
    IndexPlan {
        vector,
        standard: build_conventional_indexes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn conventional_indexes_have_expected_shape() {
        let specs = build_conventional_indexes();
        assert_eq!(specs.len(), 3);

        let text = &specs[0];
        assert_eq!(text.name(), TEXT_INDEX_NAME);
        assert_eq!(
            text.paths().collect::<Vec<_>>(),
            vec!["title", "overview", "genres.name", "spoken_languages.name"]
        );
        assert!(text.keys().iter().all(|key| key.kind == IndexKeyKind::Text));

        assert_eq!(specs[1].name(), CREATED_AT_INDEX_NAME);
        assert_eq!(specs[1].keys()[0].kind, IndexKeyKind::Descending);
        assert_eq!(specs[2].name(), RELEASE_DATE_INDEX_NAME);
        assert_eq!(specs[2].keys()[0].kind, IndexKeyKind::Ascending);
    }

    #[test]
    fn conventional_index_names_are_distinct() {
        let specs = build_conventional_indexes();
        let names: HashSet<&str> = specs.iter().map(IndexSpec::name).collect();
        assert_eq!(names.len(), specs.len());
    }

    #[test]
    fn vector_index_serializes_to_wire_definition() -> Result<(), serde_json::Error> {
        let specs = build_vector_indexes(1536);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, None);

        let value = serde_json::to_value(&specs[0].definition)?;
        let expected: serde_json::Value = serde_json::from_str(
            r#"{"mappings":{"dynamic":false,"fields":{"embeddings":{"fields":{"*":{"fields":{"embedding":{"type":"vector","numDimensions":1536,"similarity":"cosine"}}}}}}}}"#,
        )?;
        assert_eq!(value, expected);
        Ok(())
    }

    #[test]
    fn zero_dimensions_pass_through() {
        let specs = build_vector_indexes(0);
        let leaf = specs[0]
            .definition
            .resolve("embeddings.m.embedding")
            .and_then(FieldMapping::as_vector);
        assert_eq!(leaf.map(|field| field.num_dimensions), Some(0));
    }

    #[test]
    fn plan_follows_mode() {
        let disabled = build_index_plan(VectorSearchMode::Disabled);
        assert!(disabled.vector.is_empty());
        assert_eq!(disabled.standard, build_conventional_indexes());
        assert_eq!(disabled.len(), 3);

        let enabled = build_index_plan(VectorSearchMode::Enabled { dimensions: 384 });
        assert_eq!(enabled.vector, build_vector_indexes(384));
        assert_eq!(enabled.len(), 4);
        assert!(!enabled.is_empty());
    }

    #[test]
    fn vector_search_mode_serializes_tagged() -> Result<(), serde_json::Error> {
        assert_eq!(
            serde_json::to_value(VectorSearchMode::Enabled { dimensions: 3 })?,
            json!({"mode": "enabled", "dimensions": 3})
        );
        assert_eq!(
            serde_json::to_value(VectorSearchMode::Disabled)?,
            json!({"mode": "disabled"})
        );
        assert_eq!(VectorSearchMode::Disabled.dimensions(), None);
        Ok(())
    }
}
