use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum length for session identifiers (they become file names).
const MAX_SESSION_ID_LENGTH: usize = 128;

macro_rules! define_string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn from_string(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

// Geography
define_string_id!(ZoneId);
define_string_id!(SubZoneId);

// Content inside sub-zones
define_string_id!(InteractionId);
define_string_id!(NpcId);

// Actors
define_string_id!(PlayerId);

impl ZoneId {
    /// Identity derived from rounded world coordinates.
    ///
    /// Regenerating at the same integer coordinate yields the same id.
    pub fn from_coords(x: i64, y: i64, z: i64) -> Self {
        Self(format!("zone_{x}_{y}_{z}"))
    }
}

impl SubZoneId {
    /// `index` is 1-based, matching the seed order of the owning zone.
    pub fn for_zone(zone_id: &ZoneId, index: usize) -> Self {
        Self(format!("sub_{}_{}", zone_id, index))
    }
}

/// A validated session identifier.
///
/// Validation rules:
/// - Non-empty after trimming
/// - Maximum 128 characters
/// - ASCII alphanumeric, `_` and `-` only (session ids name save files)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();

        if trimmed.is_empty() {
            return Err(DomainError::validation("Session ID cannot be empty"));
        }
        if trimmed.len() > MAX_SESSION_ID_LENGTH {
            return Err(DomainError::validation(format!(
                "Session ID cannot exceed {} characters",
                MAX_SESSION_ID_LENGTH
            )));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DomainError::validation(
                "Session ID must contain only ASCII letters, digits, '_' and '-'",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self("sess_default".to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> String {
        id.0
    }
}
