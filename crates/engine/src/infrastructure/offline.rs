//! Generation backend that never proposes anything.
//!
//! Every caller already degrades to deterministic fallback content when the
//! collaborator yields nothing, so this runs the engine without a model.

use async_trait::async_trait;
use serde_json::Value;

use crate::infrastructure::ports::{
    GenerationError, GenerationPort, InteractionProposalRequest, ZoneProposalRequest,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl GenerationPort for OfflineGenerator {
    async fn propose_zones(
        &self,
        request: ZoneProposalRequest,
    ) -> Result<Vec<Value>, GenerationError> {
        tracing::debug!(count = request.count, "Offline generator: no zone proposals");
        Ok(Vec::new())
    }

    async fn propose_interactions(
        &self,
        request: InteractionProposalRequest,
    ) -> Result<Vec<Value>, GenerationError> {
        tracing::debug!(sub_zone = %request.sub_zone_name, "Offline generator: no interaction proposals");
        Ok(Vec::new())
    }
}
