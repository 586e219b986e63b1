//! Time-driven relaxation of scores toward the baseline.

pub mod formula;
mod scheduler;

pub use scheduler::{DecayScheduler, DecaySchedulerHandle, SweepReport};
