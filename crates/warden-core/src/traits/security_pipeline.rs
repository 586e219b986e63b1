use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::models::{PrincipalId, Topic};

/// Subscription request forwarded to the security pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub principal_id: PrincipalId,
    pub topic: Topic,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum PipelineVerdict {
    Allow,
    Deny { reason: String },
}

/// External multi-factor policy evaluator (identity verification,
/// revocation lists, rate limits). Only its request/response contract is
/// known here.
#[async_trait]
pub trait ISecurityPipeline: Send + Sync {
    async fn evaluate(&self, request: &PipelineRequest) -> Result<PipelineVerdict, PipelineError>;
}
