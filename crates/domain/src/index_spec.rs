//! Store-neutral index specifications.
//!
//! These types describe what the store should build; they carry no driver
//! types. Serialized with `serde` they produce the exact documents the store
//! expects, which is what adapters send over the wire.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping key that matches any single path segment.
pub const WILDCARD_SEGMENT: &str = "*";

/// Key kind for one field of a conventional index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawIndexKeyKind", into = "RawIndexKeyKind")]
pub enum IndexKeyKind {
    /// Ascending order (`1`).
    Ascending,
    /// Descending order (`-1`).
    Descending,
    /// Full-text index (`"text"`).
    Text,
}

impl IndexKeyKind {
    /// Stable label used in logs and text output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "1",
            Self::Descending => "-1",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for IndexKeyKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawIndexKeyKind {
    Direction(i32),
    Named(String),
}

impl TryFrom<RawIndexKeyKind> for IndexKeyKind {
    type Error = String;

    fn try_from(raw: RawIndexKeyKind) -> Result<Self, Self::Error> {
        match raw {
            RawIndexKeyKind::Direction(1) => Ok(Self::Ascending),
            RawIndexKeyKind::Direction(-1) => Ok(Self::Descending),
            RawIndexKeyKind::Named(name) if name == "text" => Ok(Self::Text),
            RawIndexKeyKind::Direction(other) => Err(format!("unsupported index direction {other}")),
            RawIndexKeyKind::Named(other) => Err(format!("unsupported index type {other:?}")),
        }
    }
}

impl From<IndexKeyKind> for RawIndexKeyKind {
    fn from(kind: IndexKeyKind) -> Self {
        match kind {
            IndexKeyKind::Ascending => Self::Direction(1),
            IndexKeyKind::Descending => Self::Direction(-1),
            IndexKeyKind::Text => Self::Named("text".to_owned()),
        }
    }
}

/// One `(field path, kind)` entry of a conventional index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    /// Dotted field path.
    pub path: Box<str>,
    /// Key kind.
    pub kind: IndexKeyKind,
}

/// Conventional (B-tree or text) index specification.
///
/// Keys keep insertion order; compound index semantics depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSpec {
    name: Box<str>,
    #[serde(serialize_with = "serialize_keys")]
    keys: Vec<IndexKey>,
}

impl IndexSpec {
    /// Start a spec with the given index name and no keys.
    pub fn new(name: impl Into<Box<str>>) -> Self {
        Self {
            name: name.into(),
            keys: Vec::new(),
        }
    }

    /// Append a key.
    #[must_use]
    pub fn with_key(mut self, path: impl Into<Box<str>>, kind: IndexKeyKind) -> Self {
        self.keys.push(IndexKey {
            path: path.into(),
            kind,
        });
        self
    }

    /// Index name, passed to the store as the index-level `name` option.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered keys.
    #[must_use]
    pub fn keys(&self) -> &[IndexKey] {
        &self.keys
    }

    /// Field paths in key order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|key| &*key.path)
    }
}

fn serialize_keys<S>(keys: &[IndexKey], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(keys.iter().map(|key| (&*key.path, key.kind)))
}

/// Vector similarity metric; movie embeddings are compared by cosine only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VectorSimilarity {
    /// Cosine similarity.
    Cosine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum VectorFieldType {
    Vector,
}

/// Leaf mapping for a vector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VectorField {
    #[serde(rename = "type")]
    field_type: VectorFieldType,
    /// Required vector length.
    pub num_dimensions: u32,
    /// Similarity metric used by the index.
    pub similarity: VectorSimilarity,
}

impl VectorField {
    /// Build a vector leaf.
    #[must_use]
    pub const fn new(num_dimensions: u32, similarity: VectorSimilarity) -> Self {
        Self {
            field_type: VectorFieldType::Vector,
            num_dimensions,
            similarity,
        }
    }
}

/// Mapping for a subdocument, keyed by field name or [`WILDCARD_SEGMENT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentMapping {
    /// Child mappings.
    pub fields: BTreeMap<Box<str>, FieldMapping>,
}

impl DocumentMapping {
    /// Add a child mapping.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<Box<str>>, mapping: FieldMapping) -> Self {
        self.fields.insert(name.into(), mapping);
        self
    }
}

/// Node of a search-index mapping tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldMapping {
    /// Indexed vector leaf.
    Vector(VectorField),
    /// Nested document.
    Document(DocumentMapping),
}

impl FieldMapping {
    /// Return the vector leaf, if this node is one.
    #[must_use]
    pub const fn as_vector(&self) -> Option<&VectorField> {
        match self {
            Self::Vector(field) => Some(field),
            Self::Document(_) => None,
        }
    }

    /// Return the nested document, if this node is one.
    #[must_use]
    pub const fn as_document(&self) -> Option<&DocumentMapping> {
        match self {
            Self::Document(document) => Some(document),
            Self::Vector(_) => None,
        }
    }
}

/// Top-level mappings of a search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMappings {
    /// When false only declared paths are indexed.
    pub dynamic: bool,
    /// Declared top-level fields.
    pub fields: BTreeMap<Box<str>, FieldMapping>,
}

/// Definition document of a vector-search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndexDefinition {
    /// Field mappings.
    pub mappings: SearchMappings,
}

impl SearchIndexDefinition {
    /// Build a definition that indexes only the declared fields.
    #[must_use]
    pub fn static_mappings(root: DocumentMapping) -> Self {
        Self {
            mappings: SearchMappings {
                dynamic: false,
                fields: root.fields,
            },
        }
    }

    /// Resolve a concrete dotted path against the mapping tree.
    ///
    /// Each segment matches an exact field name first, then
    /// [`WILDCARD_SEGMENT`]. Returns `None` for undeclared paths.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&FieldMapping> {
        let mut fields = &self.mappings.fields;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            if segment.is_empty() {
                return None;
            }
            let mapping = fields
                .get(segment)
                .or_else(|| fields.get(WILDCARD_SEGMENT))?;
            if segments.peek().is_none() {
                return Some(mapping);
            }
            fields = &mapping.as_document()?.fields;
        }

        None
    }

    /// Declared leaf paths, wildcards kept verbatim.
    #[must_use]
    pub fn indexed_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_leaf_paths(&self.mappings.fields, "", &mut paths);
        paths
    }
}

fn collect_leaf_paths(fields: &BTreeMap<Box<str>, FieldMapping>, prefix: &str, out: &mut Vec<String>) {
    for (name, mapping) in fields {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match mapping {
            FieldMapping::Vector(_) => out.push(path),
            FieldMapping::Document(document) => collect_leaf_paths(&document.fields, &path, out),
        }
    }
}

/// Vector-search index specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchIndexSpec {
    /// Index name; the store assigns its default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Box<str>>,
    /// Definition document.
    pub definition: SearchIndexDefinition,
}

impl SearchIndexSpec {
    /// Build an unnamed spec.
    #[must_use]
    pub const fn unnamed(definition: SearchIndexDefinition) -> Self {
        Self {
            name: None,
            definition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_definition() -> SearchIndexDefinition {
        let leaf = DocumentMapping::default().with_field(
            "embedding",
            FieldMapping::Vector(VectorField::new(8, VectorSimilarity::Cosine)),
        );
        let embeddings = DocumentMapping::default().with_field("*", FieldMapping::Document(leaf));
        SearchIndexDefinition::static_mappings(
            DocumentMapping::default().with_field("embeddings", FieldMapping::Document(embeddings)),
        )
    }

    #[test]
    fn index_spec_serializes_keys_in_order() -> Result<(), serde_json::Error> {
        let spec = IndexSpec::new("compound_idx")
            .with_key("b", IndexKeyKind::Descending)
            .with_key("a", IndexKeyKind::Ascending);

        let text = serde_json::to_string(&spec)?;
        assert_eq!(text, r#"{"name":"compound_idx","keys":{"b":-1,"a":1}}"#);
        Ok(())
    }

    #[test]
    fn similarity_accepts_only_cosine() -> Result<(), serde_json::Error> {
        let parsed: VectorSimilarity = serde_json::from_value(json!("cosine"))?;
        assert_eq!(parsed, VectorSimilarity::Cosine);
        assert!(serde_json::from_value::<VectorSimilarity>(json!("euclidean")).is_err());
        assert!(serde_json::from_value::<VectorSimilarity>(json!("dotProduct")).is_err());
        Ok(())
    }

    #[test]
    fn index_key_kind_round_trips_wire_values() -> Result<(), serde_json::Error> {
        let kinds: Vec<IndexKeyKind> = serde_json::from_value(json!([1, -1, "text"]))?;
        assert_eq!(
            kinds,
            vec![IndexKeyKind::Ascending, IndexKeyKind::Descending, IndexKeyKind::Text]
        );
        assert!(serde_json::from_value::<IndexKeyKind>(json!(2)).is_err());
        assert!(serde_json::from_value::<IndexKeyKind>(json!("2dsphere")).is_err());
        Ok(())
    }

    #[test]
    fn definition_matches_wire_shape() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(sample_definition())?;
        assert_eq!(
            value,
            json!({"mappings": {"dynamic": false, "fields": {"embeddings": {"fields": {"*": {
                "fields": {"embedding": {"type": "vector", "numDimensions": 8, "similarity": "cosine"}}
            }}}}}})
        );

        let parsed: SearchIndexDefinition = serde_json::from_value(value)?;
        assert_eq!(parsed, sample_definition());
        Ok(())
    }

    #[test]
    fn resolve_matches_wildcard_segment() {
        let definition = sample_definition();

        let leaf = definition
            .resolve("embeddings.anything.embedding")
            .and_then(FieldMapping::as_vector);
        assert_eq!(leaf.map(|field| field.num_dimensions), Some(8));

        assert!(definition.resolve("embeddings.anything").and_then(FieldMapping::as_document).is_some());
        assert!(definition.resolve("embeddings.anything.other").is_none());
        assert!(definition.resolve("title").is_none());
        assert!(definition.resolve("embeddings..embedding").is_none());
        assert!(definition.resolve("").is_none());
    }

    #[test]
    fn indexed_paths_lists_leaves() {
        assert_eq!(
            sample_definition().indexed_paths(),
            vec!["embeddings.*.embedding".to_owned()]
        );
    }

    #[test]
    fn unnamed_spec_omits_name() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(SearchIndexSpec::unnamed(sample_definition()))?;
        assert!(value.get("name").is_none());
        assert!(value.get("definition").is_some());
        Ok(())
    }
}
