//! Aggregate roots - domain objects that own their related data
//!
//! `SaveFile` is the per-session root. It owns the map snapshot (what was
//! generated), the area snapshot (what the player navigates), the game log and
//! the player profile. Mutations return plain results; the engine decides when
//! to persist.

pub mod area_snapshot;
pub mod map_snapshot;
pub mod save_file;

pub use area_snapshot::{AreaSnapshot, TimeAdvanceResult};
pub use map_snapshot::MapSnapshot;
pub use save_file::{SaveFile, SAVE_VERSION};
