//! # warden-observability
//!
//! Tracing subscriber setup, span macros for the core operations, and the
//! [`EngineMetrics`] counters shared by the bus and the trust engine.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use tracing_setup::{init_from_config, init_tracing, init_tracing_with_filter};
