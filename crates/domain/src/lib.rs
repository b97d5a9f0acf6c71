extern crate self as wrldkeep_domain;

pub mod aggregates;
pub mod common;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod value_objects;
pub mod world_clock;

pub use aggregates::{AreaSnapshot, MapSnapshot, SaveFile, TimeAdvanceResult, SAVE_VERSION};

pub use entities::{
    log_kinds, normalize_name, AreaNpc, AreaSubZone, AreaZone, GameLogEntry, GameLogSettings,
    GenerationMode, Interaction, InteractionStatus, InteractionType, LogPayload, MapZone,
    PlayerRuntimeData, PlayerStaticData, Position, RoleType, SubZoneSeed, SubZoneState, ZoneState,
    DEFAULT_MOVE_SPEED, OBSERVE_SURROUNDINGS,
};

pub use error::DomainError;

pub use geometry::{Coord3D, Offset3};

// Re-export ID types
pub use ids::{InteractionId, NpcId, PlayerId, SessionId, SubZoneId, ZoneId};

pub use value_objects::{
    CalendarDefinition, CalendarId, MonthDefinition, ZoneSize, ZoneType, DEFAULT_CALENDAR_ID,
};

pub use world_clock::WorldClock;
