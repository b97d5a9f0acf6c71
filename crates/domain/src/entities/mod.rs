//! Domain entities - Core business objects with identity

mod game_log;
mod interaction;
mod player;
mod sub_zone;
mod zone;

pub use game_log::{kinds as log_kinds, GameLogEntry, GameLogSettings, LogPayload};
pub use interaction::{
    normalize_name, GenerationMode, Interaction, InteractionStatus, InteractionType,
    OBSERVE_SURROUNDINGS,
};
pub use player::{
    PlayerRuntimeData, PlayerStaticData, Position, RoleType, DEFAULT_MOVE_SPEED,
};
pub use sub_zone::{AreaNpc, AreaSubZone, SubZoneState};
pub use zone::{AreaZone, MapZone, SubZoneSeed, ZoneState};
