//! Error taxonomy for the Warden trust engine.
//!
//! Computational paths (scoring, decay, capability reconciliation) are total
//! and never produce these. Only I/O-adjacent operations do: the profile
//! store, the authorizer pipeline, and signal ingestion.

pub mod auth_error;
pub mod config_error;
pub mod pipeline_error;
pub mod signal_error;
pub mod store_error;

pub use auth_error::AuthError;
pub use config_error::ConfigError;
pub use pipeline_error::PipelineError;
pub use signal_error::SignalError;
pub use store_error::StoreError;

/// Result alias used across the workspace.
pub type WardenResult<T> = Result<T, WardenError>;

/// Top-level error aggregating every subsystem error.
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    #[error("store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("authorization error: {0}")]
    AuthError(#[from] AuthError),

    #[error("invalid signal: {0}")]
    SignalError(#[from] SignalError),

    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("decay sweep failed for {} principal(s)", .failed.len())]
    DecaySweepPartialFailure {
        /// `(principal_id, reason)` for every principal whose decay failed.
        failed: Vec<(String, String)>,
    },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl WardenError {
    /// Whether retrying the same operation could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreError(StoreError::Unavailable { .. } | StoreError::LockTimeout { .. })
        )
    }
}
