//! Index store boundary contract.

use crate::BoxFuture;
use movie_index_domain::{IndexSpec, SearchIndexSpec};
use movie_index_shared::{RequestContext, Result};

/// Descriptor of the collection a store is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStoreInfo {
    /// Stable provider identifier (for example `mongodb`).
    pub provider: Box<str>,
    /// Database that owns the collection.
    pub database: Box<str>,
    /// Collection the indexes are created on.
    pub collection: Box<str>,
}

impl IndexStoreInfo {
    /// Build a descriptor.
    pub fn new(
        provider: impl Into<Box<str>>,
        database: impl Into<Box<str>>,
        collection: impl Into<Box<str>>,
    ) -> Self {
        Self {
            provider: provider.into(),
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// `database.collection` namespace, as used in log fields.
    #[must_use]
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }
}

/// Boundary contract for a collection-bound index store.
///
/// Implementations borrow an existing connection and never close it.
/// Creating an index that already exists with the same definition must
/// succeed; that idempotency belongs to the store.
pub trait IndexStorePort: Send + Sync {
    /// Descriptor of the bound collection.
    fn info(&self) -> &IndexStoreInfo;

    /// Create conventional indexes, returning their names in request order.
    fn create_indexes(
        &self,
        ctx: &RequestContext,
        specs: Vec<IndexSpec>,
    ) -> BoxFuture<'_, Result<Vec<Box<str>>>>;

    /// Create vector-search indexes, returning the names the store assigned.
    fn create_search_indexes(
        &self,
        ctx: &RequestContext,
        specs: Vec<SearchIndexSpec>,
    ) -> BoxFuture<'_, Result<Vec<Box<str>>>>;
}
