mod capability_lookup;
mod security_pipeline;
mod store;

pub use capability_lookup::ICapabilityLookup;
pub use security_pipeline::{ISecurityPipeline, PipelineRequest, PipelineVerdict};
pub use store::{IStore, StoreResult};
