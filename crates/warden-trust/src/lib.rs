//! # warden-trust
//!
//! Progressive trust: scores move with behavioral signals, relax toward the
//! baseline over time, and capability grants follow the score.
//!
//! ## Modules
//!
//! - [`score`]: [`ScoreEngine`], pure signal and decay arithmetic
//! - [`capability`]: threshold derivation, reconciliation, and the lookup snapshot
//! - [`store`]: [`TrustStore`], serialized per-principal read-modify-write
//! - [`decay`]: the decay formula and the background [`DecayScheduler`]
//! - [`engine`]: [`TrustEngine`], wiring, ingestion, and capability queries

pub mod capability;
pub mod decay;
pub mod engine;
mod retry;
pub mod score;
pub mod store;

pub use capability::{CapabilitySnapshot, CapabilitySynchronizer, Reconciliation};
pub use decay::{DecayScheduler, DecaySchedulerHandle, SweepReport};
pub use engine::{IngestionHandle, TrustEngine};
pub use score::ScoreEngine;
pub use store::{TrustStore, UpdateOutcome};
