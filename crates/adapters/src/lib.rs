//! # movie-index-adapters
//!
//! Adapter implementations for ports (MongoDB index store, JSON logging).
//! This crate depends on `ports`, `shared`, `config`, and `domain`.

pub mod log_sink;
pub mod logger;
pub mod mongo;

pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use logger::{JsonLogger, parse_log_level};
pub use mongo::{MongoIndexStore, connect_collection};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
