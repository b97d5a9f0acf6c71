//! External service port traits (content generation).

use async_trait::async_trait;
use serde_json::Value;
use wrldkeep_domain::Position;

use super::error::GenerationError;

// =============================================================================
// Request Types
// =============================================================================

/// Ask the collaborator for raw zone proposals around a position.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneProposalRequest {
    /// Player position the zones are generated around
    pub center: Position,
    /// Number of zones wanted
    pub count: usize,
    /// Free-text world setting
    pub world_prompt: String,
    /// Recent game log messages for context, oldest first
    pub recent_events: Vec<String>,
}

/// Ask the collaborator for new interactions inside one sub-zone.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionProposalRequest {
    pub sub_zone_name: String,
    pub sub_zone_description: String,
    /// What the player is trying to do
    pub intent: String,
    /// Names already present, so the collaborator can avoid them
    pub existing_names: Vec<String>,
}

// =============================================================================
// Generation Port
// =============================================================================

/// Source of untrusted generated content.
///
/// Implementations return loosely structured JSON objects. Callers validate
/// every proposal and fall back to deterministic content on any error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationPort: Send + Sync {
    async fn propose_zones(
        &self,
        request: ZoneProposalRequest,
    ) -> Result<Vec<Value>, GenerationError>;

    async fn propose_interactions(
        &self,
        request: InteractionProposalRequest,
    ) -> Result<Vec<Value>, GenerationError>;
}
