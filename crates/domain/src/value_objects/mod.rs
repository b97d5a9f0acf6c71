//! Value objects - Immutable objects defined by their attributes

mod calendar;
mod zone_kind;

// Calendar layout used by the world clock
pub use calendar::{CalendarDefinition, CalendarId, MonthDefinition, DEFAULT_CALENDAR_ID};

// Zone classification
pub use zone_kind::{ZoneSize, ZoneType};
