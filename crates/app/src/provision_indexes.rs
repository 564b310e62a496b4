//! Provision the movie collection's indexes.
//!
//! Two phases run in order with no compensation: the vector-search index
//! first, then the conventional indexes. A failure in the second phase
//! leaves the first phase's indexes in place; re-running is safe because
//! index creation is idempotent on the store side.

use movie_index_domain::{VectorSearchMode, build_index_plan};
use movie_index_ports::{IndexStorePort, LogEvent, LogFields, LogLevel, LoggerPort};
use movie_index_shared::{ErrorEnvelope, RequestContext, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Input payload for provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionIndexesInput {
    /// Whether to create the vector-search index, and with which dimensionality.
    pub vector_search: VectorSearchMode,
}

impl ProvisionIndexesInput {
    /// Vector-search index of `dimensions`, then conventional indexes.
    #[must_use]
    pub const fn with_vector_search(dimensions: u32) -> Self {
        Self {
            vector_search: VectorSearchMode::Enabled { dimensions },
        }
    }

    /// Conventional indexes only.
    #[must_use]
    pub const fn standard_only() -> Self {
        Self {
            vector_search: VectorSearchMode::Disabled,
        }
    }
}

/// Dependencies required by provisioning.
#[derive(Clone)]
pub struct ProvisionIndexesDeps {
    /// Collection-bound index store; borrowed, never closed here.
    pub store: Arc<dyn IndexStorePort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Names returned by the store, per phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionIndexesOutput {
    /// Vector-search index names; empty when vector search is disabled.
    pub vector_index_names: Vec<Box<str>>,
    /// Conventional index names.
    pub standard_index_names: Vec<Box<str>>,
}

impl ProvisionIndexesOutput {
    /// Vector-search names followed by conventional names.
    #[must_use]
    pub fn index_names(&self) -> Vec<Box<str>> {
        self.vector_index_names
            .iter()
            .chain(&self.standard_index_names)
            .cloned()
            .collect()
    }

    /// Total number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vector_index_names.len() + self.standard_index_names.len()
    }

    /// True when no index was created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Step of the provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionPhase {
    /// Vector-search index creation.
    VectorSearch,
    /// Conventional index creation.
    Standard,
}

impl ProvisionPhase {
    /// Stable label used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VectorSearch => "vectorSearch",
            Self::Standard => "standard",
        }
    }
}

impl fmt::Display for ProvisionPhase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Create the vector-search index (when enabled) and then the conventional indexes.
///
/// Store errors are returned unchanged. No retries; the request context is
/// passed through to the store, which owns cancellation.
#[tracing::instrument(
    name = "provision_indexes",
    skip_all,
    fields(correlation_id = %ctx.correlation_id(), collection = %deps.store.info().collection)
)]
pub async fn provision_indexes(
    ctx: &RequestContext,
    deps: &ProvisionIndexesDeps,
    input: ProvisionIndexesInput,
) -> Result<ProvisionIndexesOutput> {
    let started_at = Instant::now();
    let logger = deps.logger.as_deref();

    if let Some(logger) = logger {
        logger.info(
            "provision.indexes.start",
            "Index provisioning started",
            Some(log_fields_start(deps.store.as_ref(), input)),
        );
    }

    let plan = build_index_plan(input.vector_search);
    let vector_phase_ran = matches!(input.vector_search, VectorSearchMode::Enabled { .. });

    let mut output = ProvisionIndexesOutput::default();

    if vector_phase_ran {
        match deps.store.create_search_indexes(ctx, plan.vector).await {
            Ok(names) => {
                log_phase_completed(logger, ProvisionPhase::VectorSearch, &names);
                output.vector_index_names = names;
            },
            Err(error) => {
                log_failed(logger, ProvisionPhase::VectorSearch, false, started_at, &error);
                return Err(error);
            },
        }
    }

    match deps.store.create_indexes(ctx, plan.standard).await {
        Ok(names) => {
            log_phase_completed(logger, ProvisionPhase::Standard, &names);
            output.standard_index_names = names;
        },
        Err(error) => {
            log_failed(logger, ProvisionPhase::Standard, vector_phase_ran, started_at, &error);
            return Err(error);
        },
    }

    if let Some(logger) = logger {
        logger.info(
            "provision.indexes.completed",
            "Index provisioning completed",
            Some(log_fields_completed(&output, started_at)),
        );
    }

    Ok(output)
}

fn duration_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn names_value(names: &[Box<str>]) -> Value {
    Value::Array(names.iter().map(|name| Value::from(&**name)).collect())
}

fn log_fields_start(store: &dyn IndexStorePort, input: ProvisionIndexesInput) -> LogFields {
    let info = store.info();
    let mut fields = LogFields::new();
    fields.insert("provider".into(), Value::from(&*info.provider));
    fields.insert("namespace".into(), Value::from(info.namespace()));
    fields.insert(
        "vectorSearch".into(),
        Value::Bool(input.vector_search.dimensions().is_some()),
    );
    if let Some(dimensions) = input.vector_search.dimensions() {
        fields.insert("dimensions".into(), Value::from(dimensions));
    }
    fields
}

fn log_phase_completed(logger: Option<&dyn LoggerPort>, phase: ProvisionPhase, names: &[Box<str>]) {
    let Some(logger) = logger else {
        return;
    };
    let mut fields = LogFields::new();
    fields.insert("phase".into(), Value::from(phase.as_str()));
    fields.insert("indexNames".into(), names_value(names));
    logger.info(
        "provision.indexes.phase.completed",
        "Index provisioning phase completed",
        Some(fields),
    );
}

fn log_fields_completed(output: &ProvisionIndexesOutput, started_at: Instant) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert("durationMs".into(), Value::from(duration_ms(started_at)));
    fields.insert("indexCount".into(), Value::from(output.len()));
    fields.insert("indexNames".into(), names_value(&output.index_names()));
    fields
}

fn log_failed(
    logger: Option<&dyn LoggerPort>,
    phase: ProvisionPhase,
    partial_effects: bool,
    started_at: Instant,
    error: &ErrorEnvelope,
) {
    let Some(logger) = logger else {
        return;
    };
    let mut fields = LogFields::new();
    fields.insert("phase".into(), Value::from(phase.as_str()));
    fields.insert("durationMs".into(), Value::from(duration_ms(started_at)));
    fields.insert("error".into(), Value::String(error.to_string()));
    if partial_effects {
        fields.insert("partialEffects".into(), Value::Bool(true));
    }

    let mut event = LogEvent::new(
        LogLevel::Error,
        "provision.indexes.failed",
        "Index provisioning failed",
    )
    .with_fields(Some(fields));
    if let Ok(payload) = serde_json::to_value(error) {
        event = event.with_error(payload);
    }
    logger.log(event);
}
