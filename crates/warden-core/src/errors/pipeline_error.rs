/// Failures reported by the external security pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("security pipeline unavailable: {0}")]
    Unavailable(String),

    #[error("security pipeline timed out after {0}ms")]
    Timeout(u64),

    #[error("security pipeline rejected the request: {0}")]
    BadRequest(String),
}
