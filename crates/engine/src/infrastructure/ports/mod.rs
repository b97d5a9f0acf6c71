//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Save persistence (could swap the file bundle store -> a database)
//! - Content generation (could swap Ollama -> another model host, or offline)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

pub use error::{GenerationError, StoreError};
pub use external::{GenerationPort, InteractionProposalRequest, ZoneProposalRequest};
pub use repos::{CommitReport, SaveRepo};
pub use testing::ClockPort;

#[cfg(test)]
pub use external::MockGenerationPort;
#[cfg(test)]
pub use repos::MockSaveRepo;
#[cfg(test)]
pub use testing::MockClockPort;
