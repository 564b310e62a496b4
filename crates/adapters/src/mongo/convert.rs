//! Domain index specs to driver models.

use movie_index_domain::{IndexKeyKind, IndexSpec, SearchIndexSpec};
use movie_index_shared::{ErrorCode, ErrorEnvelope, Result};
use mongodb::bson::{self, Bson, Document};
use mongodb::options::IndexOptions;
use mongodb::{IndexModel, SearchIndexModel};

/// Build an `IndexModel` whose keys document keeps the spec's key order.
pub fn index_model(spec: &IndexSpec) -> IndexModel {
    let mut keys = Document::new();
    for key in spec.keys() {
        keys.insert(key.path.to_string(), key_value(key.kind));
    }
    let options = IndexOptions::builder()
        .name(spec.name().to_owned())
        .build();
    IndexModel::builder().keys(keys).options(options).build()
}

/// Build a `SearchIndexModel`; the name is set only when the spec has one.
pub fn search_index_model(spec: &SearchIndexSpec) -> Result<SearchIndexModel> {
    let definition = bson::to_document(&spec.definition).map_err(|error| {
        ErrorEnvelope::invariant(
            ErrorCode::new("mongodb", "encode_failed"),
            format!("failed to encode search index definition: {error}"),
        )
    })?;
    Ok(SearchIndexModel::builder()
        .definition(definition)
        .name(spec.name.as_deref().map(str::to_owned))
        .build())
}

fn key_value(kind: IndexKeyKind) -> Bson {
    match kind {
        IndexKeyKind::Ascending => Bson::Int32(1),
        IndexKeyKind::Descending => Bson::Int32(-1),
        IndexKeyKind::Text => Bson::String("text".to_owned()),
    }
}
