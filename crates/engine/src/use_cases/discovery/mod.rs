//! Interaction discovery and execution.

mod candidate;
mod discover;
mod execute;

pub use candidate::{validate_interaction, InteractionCandidate};
pub use discover::{DiscoverInteractions, DiscoverInteractionsInput, DiscoverInteractionsResult};
pub use execute::{ExecuteInteraction, ExecuteInteractionInput, ExecuteInteractionResult};

use std::sync::Arc;

/// Container for discovery use cases.
pub struct DiscoveryUseCases {
    pub discover: Arc<DiscoverInteractions>,
    pub execute: Arc<ExecuteInteraction>,
}

impl DiscoveryUseCases {
    pub fn new(discover: Arc<DiscoverInteractions>, execute: Arc<ExecuteInteraction>) -> Self {
        Self { discover, execute }
    }
}
