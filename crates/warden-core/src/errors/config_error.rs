/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("failed to parse configuration: {reason}")]
    Parse { reason: String },

    #[error("failed to read configuration from {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("authorizer strategy security_pipeline selected but no pipeline was provided")]
    MissingSecurityPipeline,
}
