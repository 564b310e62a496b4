//! Movies with named embeddings line up with the vector-search definition.

use chrono::Utc;
use movie_index_domain::{
    EmbeddingObject, EmbeddingSourceKey, FieldMapping, Genre, Movie, PrimitiveError,
    SpokenLanguage, TmdbMovie, build_vector_indexes,
};
use movie_index_shared::ErrorEnvelope;
use std::collections::BTreeMap;

fn catalogue_record() -> TmdbMovie {
    TmdbMovie {
        adult: false,
        budget: 0,
        genres: vec![Genre {
            id: 878,
            name: "Science Fiction".to_owned(),
        }],
        id: 603,
        imdb_id: "tt0133093".to_owned(),
        original_language: "en".to_owned(),
        original_title: "The Matrix".to_owned(),
        overview: "Set in the 22nd century...".to_owned(),
        poster_path: "/matrix.jpg".to_owned(),
        release_date: "1999-03-30".to_owned(),
        revenue: 463_517_383,
        runtime: 136,
        spoken_languages: vec![SpokenLanguage {
            iso_639_1: "en".to_owned(),
            name: "English".to_owned(),
            english_name: "English".to_owned(),
        }],
        status: "Released".to_owned(),
        tagline: "Welcome to the Real World.".to_owned(),
        title: "The Matrix".to_owned(),
    }
}

#[test]
fn stored_embedding_resolves_to_indexed_vector_field() -> Result<(), PrimitiveError> {
    let now = Utc::now();
    let source = EmbeddingSourceKey::parse("model-a")?;
    let mut movie = Movie::from_tmdb(catalogue_record(), now);
    movie.insert_embedding(
        source.clone(),
        EmbeddingObject::new("model-a", 0, vec![0.01; 1536]),
        now,
    );

    let specs = build_vector_indexes(1536);
    let Some(spec) = specs.first() else {
        return Err(PrimitiveError::EmptyEmbeddingSourceKey { input_length: 0 });
    };

    let path = Movie::embedding_path(&source);
    assert_eq!(path, "embeddings.model-a.embedding");

    let leaf = spec.definition.resolve(&path).and_then(FieldMapping::as_vector);
    let stored = movie.embeddings.get(&source).map(EmbeddingObject::dimensions);
    assert_eq!(leaf.map(|field| field.num_dimensions), Some(1536));
    assert_eq!(stored, Some(1536));
    Ok(())
}

#[test]
fn any_source_key_is_covered_by_the_wildcard() -> Result<(), PrimitiveError> {
    let specs = build_vector_indexes(768);
    for raw in ["model-a", "text-embedding-3-small", "voyage_3"] {
        let source = EmbeddingSourceKey::parse(raw)?;
        let resolved = specs
            .iter()
            .find_map(|spec| spec.definition.resolve(&Movie::embedding_path(&source)));
        assert!(resolved.and_then(FieldMapping::as_vector).is_some(), "{raw} not indexed");
    }
    Ok(())
}

#[test]
fn movie_document_round_trips_through_json() -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let mut movie = Movie::from_tmdb(catalogue_record(), now);
    movie.insert_embedding(
        EmbeddingSourceKey::parse("model-a")?,
        EmbeddingObject::new("model-a", 0, vec![0.25, -0.5, 1.0]),
        now,
    );

    let text = serde_json::to_string(&movie)?;
    let parsed: Movie = serde_json::from_str(&text)?;
    assert_eq!(parsed, movie);
    Ok(())
}

#[test]
fn invalid_embedding_keys_are_rejected_on_read() {
    let json = r#"{"bad.key":{"object":"embedding","embedding":[1.0],"index":0,"model":"m"}}"#;
    let parsed: Result<BTreeMap<EmbeddingSourceKey, EmbeddingObject>, _> =
        serde_json::from_str(json);
    assert!(parsed.is_err());

    let error = EmbeddingSourceKey::parse("bad.key").err().map(ErrorEnvelope::from);
    assert_eq!(
        error.map(|envelope| envelope.code.to_string()),
        Some("domain:invalid_embedding_source_key".to_owned())
    );
}
