//! Use cases - World state operations.
//!
//! Each module contains use cases for one area of the world state. Every
//! mutating use case goes through the [`SessionStore`](crate::stores::SessionStore),
//! so operations on one session are serialized and persisted as a unit.

pub mod area;
pub mod discovery;
pub mod error;
pub mod game_log;
pub mod movement;
pub mod player;
pub mod region;
pub mod save;
pub mod time;

// Re-export main types
pub use area::AreaUseCases;
pub use discovery::DiscoveryUseCases;
pub use error::EngineError;
pub use game_log::GameLogUseCases;
pub use movement::MovementUseCases;
pub use player::PlayerUseCases;
pub use region::RegionUseCases;
pub use save::SaveUseCases;
pub use time::TimeUseCases;
