//! Calendar system value objects
//!
//! The world clock carries minutes into hours, days, months and years using the
//! layout of its active calendar. Nothing outside this module assumes a fixed
//! month count or month length.
//!
//! Key types:
//! - `CalendarId` - Validated, otherwise opaque identifier (e.g., "fantasy_default")
//! - `MonthDefinition` - Name and length of one month
//! - `CalendarDefinition` - Full layout (months, hours per day, minutes per hour)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for calendar identifiers
const MAX_CALENDAR_ID_LENGTH: usize = 50;

/// Identifier of the calendar every new clock uses unless told otherwise.
pub const DEFAULT_CALENDAR_ID: &str = "fantasy_default";

// ============================================================================
// CalendarId
// ============================================================================

/// A validated calendar identifier (e.g., "fantasy_default", "gregorian")
///
/// Validation rules:
/// - Non-empty
/// - Maximum 50 characters
/// - Lowercase alphanumeric with underscores only
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarId(String);

impl CalendarId {
    /// Create a new validated calendar identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The identifier is empty after trimming
    /// - The identifier exceeds 50 characters
    /// - The identifier contains characters other than lowercase alphanumeric or underscore
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(DomainError::validation("Calendar ID cannot be empty"));
        }
        if trimmed.len() > MAX_CALENDAR_ID_LENGTH {
            return Err(DomainError::validation(format!(
                "Calendar ID cannot exceed {} characters",
                MAX_CALENDAR_ID_LENGTH
            )));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(DomainError::validation(
                "Calendar ID must contain only lowercase alphanumeric characters and underscores",
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CalendarId {
    fn default() -> Self {
        Self(DEFAULT_CALENDAR_ID.to_string())
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CalendarId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CalendarId> for String {
    fn from(id: CalendarId) -> String {
        id.0
    }
}

// ============================================================================
// MonthDefinition
// ============================================================================

/// Configuration for a single month in a calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDefinition {
    /// Month name (e.g., "Thawmoon", "January")
    pub name: String,
    /// Number of days in this month
    pub days: u8,
}

impl MonthDefinition {
    pub fn new(name: impl Into<String>, days: u8) -> Self {
        Self {
            name: name.into(),
            days,
        }
    }
}

// ============================================================================
// CalendarDefinition
// ============================================================================

/// Calendar layout used for minute carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDefinition {
    id: CalendarId,
    name: String,
    months: Vec<MonthDefinition>,
    hours_per_day: u8,
    minutes_per_hour: u8,
}

impl CalendarDefinition {
    /// Create a new calendar definition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the layout cannot carry time:
    /// no months, a zero-length month, or zero hours/minutes.
    pub fn new(
        id: CalendarId,
        name: impl Into<String>,
        months: Vec<MonthDefinition>,
        hours_per_day: u8,
        minutes_per_hour: u8,
    ) -> Result<Self, DomainError> {
        if months.is_empty() {
            return Err(DomainError::validation("Calendar needs at least one month"));
        }
        if months.iter().any(|m| m.days == 0) {
            return Err(DomainError::validation("Calendar months must have days"));
        }
        if hours_per_day == 0 || minutes_per_hour == 0 {
            return Err(DomainError::validation(
                "Calendar needs non-zero hours per day and minutes per hour",
            ));
        }
        Ok(Self {
            id,
            name: name.into(),
            months,
            hours_per_day,
            minutes_per_hour,
        })
    }

    pub fn id(&self) -> &CalendarId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn months(&self) -> &[MonthDefinition] {
        &self.months
    }

    pub fn month_count(&self) -> u32 {
        self.months.len() as u32
    }

    /// Days in a 1-indexed month. Out-of-range months resolve to the last month.
    pub fn days_in_month(&self, month: u32) -> u32 {
        let index = (month.max(1) as usize - 1).min(self.months.len().saturating_sub(1));
        self.months
            .get(index)
            .map(|m| u32::from(m.days))
            .unwrap_or(1)
    }

    pub fn hours_per_day(&self) -> u32 {
        u32::from(self.hours_per_day)
    }

    pub fn minutes_per_hour(&self) -> u32 {
        u32::from(self.minutes_per_hour)
    }

    // Built-in calendars

    /// The default fantasy calendar.
    ///
    /// - 12 months of 30 days
    /// - 24 hours per day, 60 minutes per hour
    pub fn fantasy_default() -> Self {
        let names = [
            "Deepwinter",
            "Thawmoon",
            "Seedtide",
            "Rainmoon",
            "Bloomtide",
            "Highsun",
            "Emberfall",
            "Harvestmoon",
            "Reaping",
            "Leaffall",
            "Frostwane",
            "Longnight",
        ];
        Self {
            id: CalendarId::default(),
            name: "Default Fantasy Calendar".to_string(),
            months: names
                .iter()
                .map(|name| MonthDefinition::new(*name, 30))
                .collect(),
            hours_per_day: 24,
            minutes_per_hour: 60,
        }
    }

    /// The standard Gregorian calendar without leap years.
    pub fn gregorian() -> Self {
        Self {
            id: CalendarId("gregorian".to_string()),
            name: "Gregorian Calendar".to_string(),
            months: vec![
                MonthDefinition::new("January", 31),
                MonthDefinition::new("February", 28),
                MonthDefinition::new("March", 31),
                MonthDefinition::new("April", 30),
                MonthDefinition::new("May", 31),
                MonthDefinition::new("June", 30),
                MonthDefinition::new("July", 31),
                MonthDefinition::new("August", 31),
                MonthDefinition::new("September", 30),
                MonthDefinition::new("October", 31),
                MonthDefinition::new("November", 30),
                MonthDefinition::new("December", 31),
            ],
            hours_per_day: 24,
            minutes_per_hour: 60,
        }
    }

    /// Look up a built-in calendar by id.
    pub fn builtin(id: &CalendarId) -> Option<Self> {
        match id.as_str() {
            DEFAULT_CALENDAR_ID => Some(Self::fantasy_default()),
            "gregorian" => Some(Self::gregorian()),
            _ => None,
        }
    }

    /// Resolve the layout for any id.
    ///
    /// Unknown ids keep their identity but carry time with the default layout.
    pub fn resolve(id: &CalendarId) -> Self {
        Self::builtin(id).unwrap_or_else(|| Self {
            id: id.clone(),
            ..Self::fantasy_default()
        })
    }
}
