//! Errors raised by world-state types.
//!
//! The engine maps each variant onto a stable error code, so variants describe
//! what went wrong with the world rather than where it happened.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A caller-supplied value is out of range (speeds, log limits, ids)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A zone, sub-zone or interaction id that the area does not contain
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The aggregate would break a world invariant (containment, radius
    /// bounds, unique interaction names, current position)
    #[error("World invariant violated: {0}")]
    Invariant(String),

    /// An enum tag or calendar id that does not parse
    #[error("Parse error: {0}")]
    Parse(String),

    /// A timed action ran before `init_clock`
    #[error("World clock is not running")]
    ClockNotRunning,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `entity_type` is one of `"Zone"`, `"SubZone"` or `"Interaction"`.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
