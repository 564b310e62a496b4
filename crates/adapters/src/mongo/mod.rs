//! MongoDB index store adapter.
//!
//! The store borrows a collection handle from the host. It never closes the
//! client or changes its options.

mod convert;
mod error;

pub use convert::{index_model, search_index_model};
pub use error::{MongoErrorContext, command_failed, map_driver_error};

use movie_index_config::ValidatedProvisionConfig;
use movie_index_ports::{BoxFuture, IndexSpec, IndexStoreInfo, IndexStorePort, SearchIndexSpec};
use movie_index_shared::{ErrorEnvelope, RequestContext, Result};
use mongodb::bson::Document;
use mongodb::{Client, Collection};
use std::future::IntoFuture;

/// Provider id reported through [`IndexStoreInfo`].
pub const MONGODB_PROVIDER: &str = "mongodb";

const CREATE_INDEXES: &str = "mongodb.create_indexes";
const CREATE_SEARCH_INDEXES: &str = "mongodb.create_search_indexes";

/// Index store bound to one MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoIndexStore {
    collection: Collection<Document>,
    info: IndexStoreInfo,
}

impl MongoIndexStore {
    /// Bind to `collection`. The handle is cloned; the underlying client is shared.
    #[must_use]
    pub fn new(collection: &Collection<Document>) -> Self {
        let namespace = collection.namespace();
        Self {
            collection: collection.clone(),
            info: IndexStoreInfo::new(MONGODB_PROVIDER, namespace.db, namespace.coll),
        }
    }
}

impl IndexStorePort for MongoIndexStore {
    fn info(&self) -> &IndexStoreInfo {
        &self.info
    }

    fn create_indexes(
        &self,
        ctx: &RequestContext,
        specs: Vec<IndexSpec>,
    ) -> BoxFuture<'_, Result<Vec<Box<str>>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled(CREATE_INDEXES)?;
            let namespace = self.info.namespace();

            let models: Vec<_> = specs.iter().map(index_model).collect();
            tracing::debug!(%namespace, count = models.len(), "submitting createIndexes");

            let result = tokio::select! {
                () = ctx.cancelled() => {
                    return Err(ErrorEnvelope::cancelled("operation cancelled")
                        .with_metadata("operation", CREATE_INDEXES));
                }
                result = self.collection.create_indexes(models).into_future() => result,
            };

            match result {
                Ok(created) => {
                    tracing::debug!(%namespace, names = ?created.index_names, "createIndexes completed");
                    Ok(created.index_names.into_iter().map(String::into_boxed_str).collect())
                },
                Err(error) => {
                    tracing::warn!(%namespace, %error, "createIndexes failed");
                    Err(map_driver_error(
                        &error,
                        MongoErrorContext {
                            operation: CREATE_INDEXES,
                            namespace: &namespace,
                        },
                    ))
                },
            }
        })
    }

    fn create_search_indexes(
        &self,
        ctx: &RequestContext,
        specs: Vec<SearchIndexSpec>,
    ) -> BoxFuture<'_, Result<Vec<Box<str>>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled(CREATE_SEARCH_INDEXES)?;
            let namespace = self.info.namespace();

            let models = specs
                .iter()
                .map(search_index_model)
                .collect::<Result<Vec<_>>>()?;
            tracing::debug!(%namespace, count = models.len(), "submitting createSearchIndexes");

            let result = tokio::select! {
                () = ctx.cancelled() => {
                    return Err(ErrorEnvelope::cancelled("operation cancelled")
                        .with_metadata("operation", CREATE_SEARCH_INDEXES));
                }
                result = self.collection.create_search_indexes(models).into_future() => result,
            };

            match result {
                Ok(names) => {
                    tracing::debug!(%namespace, ?names, "createSearchIndexes completed");
                    Ok(names.into_iter().map(String::into_boxed_str).collect())
                },
                Err(error) => {
                    tracing::warn!(%namespace, %error, "createSearchIndexes failed");
                    Err(map_driver_error(
                        &error,
                        MongoErrorContext {
                            operation: CREATE_SEARCH_INDEXES,
                            namespace: &namespace,
                        },
                    ))
                },
            }
        })
    }
}

/// Open a client from validated config and return the movie collection handle.
///
/// Client construction does not contact the server; connection failures
/// surface on the first command.
pub async fn connect_collection(config: &ValidatedProvisionConfig) -> Result<Collection<Document>> {
    let namespace = format!(
        "{}.{}",
        config.database().as_str(),
        config.collection().as_str()
    );
    let client = Client::with_uri_str(config.uri().expose())
        .await
        .map_err(|error| {
            map_driver_error(
                &error,
                MongoErrorContext {
                    operation: "mongodb.connect",
                    namespace: &namespace,
                },
            )
        })?;
    Ok(client
        .database(config.database().as_str())
        .collection::<Document>(config.collection().as_str()))
}
