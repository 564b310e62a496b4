//! In-memory doubles for the port contracts.
//!
//! The recording store captures every call so tests can assert on call
//! order, and can be told to fail either phase.

use movie_index_ports::{
    BoxFuture, IndexSpec, IndexStoreInfo, IndexStorePort, LogEvent, LogFields, LoggerPort,
    SearchIndexSpec,
};
use movie_index_shared::{ErrorEnvelope, RequestContext, Result};
use std::sync::{Arc, Mutex};

/// Name the store assigns to an unnamed vector-search index.
pub const DEFAULT_SEARCH_INDEX_NAME: &str = "default";

/// A no-op logger implementation.
#[derive(Debug, Default)]
pub struct NoopLogger;

impl LoggerPort for NoopLogger {
    fn log(&self, _event: LogEvent) {}

    fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(Self)
    }
}

/// Logger that keeps every event in memory.
///
/// Children share the same buffer and merge their base fields into each event.
#[derive(Debug, Default, Clone)]
pub struct RecordingLogger {
    events: Arc<Mutex<Vec<LogEvent>>>,
    base: LogFields,
}

impl RecordingLogger {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Recorded event names, in emission order.
    pub fn event_names(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|event| event.event.into_string())
            .collect()
    }

    /// First recorded event with the given name.
    pub fn find(&self, name: &str) -> Option<LogEvent> {
        self.events().into_iter().find(|event| &*event.event == name)
    }
}

impl LoggerPort for RecordingLogger {
    fn log(&self, mut event: LogEvent) {
        if !self.base.is_empty() {
            let mut merged = self.base.clone();
            merged.extend(event.fields.take().unwrap_or_default());
            event.fields = Some(merged);
        }
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut base = self.base.clone();
        base.extend(fields);
        Box::new(Self {
            events: Arc::clone(&self.events),
            base,
        })
    }
}

/// One call observed by [`RecordingIndexStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `create_search_indexes` with the submitted specs.
    CreateSearchIndexes(Vec<SearchIndexSpec>),
    /// `create_indexes` with the submitted specs.
    CreateIndexes(Vec<IndexSpec>),
}

#[derive(Debug, Default)]
struct RecordingState {
    calls: Vec<StoreCall>,
}

/// Index store double that echoes names and records calls.
///
/// Conventional indexes echo their spec names; vector-search indexes echo
/// their spec name or [`DEFAULT_SEARCH_INDEX_NAME`] when unnamed.
#[derive(Debug)]
pub struct RecordingIndexStore {
    info: IndexStoreInfo,
    state: Mutex<RecordingState>,
    search_failure: Option<ErrorEnvelope>,
    index_failure: Option<ErrorEnvelope>,
}

impl Default for RecordingIndexStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingIndexStore {
    /// Create a store bound to `test.movies`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            info: IndexStoreInfo::new("recording", "test", "movies"),
            state: Mutex::new(RecordingState::default()),
            search_failure: None,
            index_failure: None,
        }
    }

    /// Fail every `create_search_indexes` call with `error`.
    #[must_use]
    pub fn failing_search_indexes(mut self, error: ErrorEnvelope) -> Self {
        self.search_failure = Some(error);
        self
    }

    /// Fail every `create_indexes` call with `error`.
    #[must_use]
    pub fn failing_indexes(mut self, error: ErrorEnvelope) -> Self {
        self.index_failure = Some(error);
        self
    }

    /// Calls observed so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state
            .lock()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    /// Number of `create_indexes` calls observed.
    pub fn create_indexes_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, StoreCall::CreateIndexes(_)))
            .count()
    }

    /// Number of `create_search_indexes` calls observed.
    pub fn create_search_indexes_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, StoreCall::CreateSearchIndexes(_)))
            .count()
    }

    fn record(&self, call: StoreCall) {
        if let Ok(mut state) = self.state.lock() {
            state.calls.push(call);
        }
    }
}

impl IndexStorePort for RecordingIndexStore {
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
            ctx.ensure_not_cancelled("index_store.create_indexes")?;
            let names: Vec<Box<str>> = specs.iter().map(|spec| Box::from(spec.name())).collect();
            self.record(StoreCall::CreateIndexes(specs));
            match &self.index_failure {
                Some(error) => Err(error.clone()),
                None => Ok(names),
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
            ctx.ensure_not_cancelled("index_store.create_search_indexes")?;
            let names: Vec<Box<str>> = specs
                .iter()
                .map(|spec| {
                    spec.name
                        .clone()
                        .unwrap_or_else(|| DEFAULT_SEARCH_INDEX_NAME.into())
                })
                .collect();
            self.record(StoreCall::CreateSearchIndexes(specs));
            match &self.search_failure {
                Some(error) => Err(error.clone()),
                None => Ok(names),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movie_index_domain::{build_conventional_indexes, build_vector_indexes};

    #[tokio::test]
    async fn recording_store_echoes_names_in_order() -> Result<()> {
        let ctx = RequestContext::new_request();
        let store = RecordingIndexStore::new();

        let search = store
            .create_search_indexes(&ctx, build_vector_indexes(8))
            .await?;
        let standard = store
            .create_indexes(&ctx, build_conventional_indexes())
            .await?;

        assert_eq!(search, vec![Box::<str>::from(DEFAULT_SEARCH_INDEX_NAME)]);
        assert_eq!(standard.len(), 3);
        assert!(matches!(
            store.calls().as_slice(),
            [StoreCall::CreateSearchIndexes(_), StoreCall::CreateIndexes(_)]
        ));
        Ok(())
    }

    #[tokio::test]
    async fn recording_store_honours_cancellation() {
        let ctx = RequestContext::new_request();
        ctx.cancel();
        let store = RecordingIndexStore::new();

        let result = store.create_indexes(&ctx, build_conventional_indexes()).await;
        assert!(matches!(result, Err(ref error) if error.is_cancelled()));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn recording_logger_children_share_buffer_and_merge_fields() {
        let logger = RecordingLogger::new();
        let mut base = LogFields::new();
        base.insert("collection".into(), serde_json::Value::from("movies"));
        let child = logger.child(base);

        child.info("test.child", "child event", None);
        logger.info("test.root", "root event", None);

        assert_eq!(logger.event_names(), vec!["test.child", "test.root"]);
        let fields = logger.find("test.child").and_then(|event| event.fields);
        assert_eq!(
            fields.and_then(|fields| fields.get("collection").cloned()),
            Some(serde_json::Value::from("movies"))
        );
    }
}
