//! Error type shared by every use case.

use wrldkeep_domain::DomainError;

use crate::infrastructure::ports::StoreError;

/// Failure of a world-state operation.
///
/// Each variant maps to one stable machine-readable code (see [`EngineError::code`]).
/// Failed operations never leave a partial commit behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),
    #[error("Sub-zone not found: {0}")]
    SubZoneNotFound(String),
    #[error("Invalid interaction: {0}")]
    InvalidInteraction(String),
    #[error("World clock is not initialized")]
    ClockNotInitialized,
    #[error("Session mismatch: {0}")]
    SessionMismatch(String),
    #[error("Invalid generated content: {0}")]
    InvalidGeneratedContent(String),
    /// Caller-supplied values out of range (log settings, player profile, ids)
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage corruption: {0}")]
    StorageCorruption(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZoneNotFound(_) => "ZONE_NOT_FOUND",
            Self::SubZoneNotFound(_) => "SUB_ZONE_NOT_FOUND",
            Self::InvalidInteraction(_) => "INVALID_INTERACTION",
            Self::ClockNotInitialized => "CLOCK_NOT_INITIALIZED",
            Self::SessionMismatch(_) => "SESSION_MISMATCH",
            Self::InvalidGeneratedContent(_) => "INVALID_GENERATED_CONTENT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::StorageCorruption(_) => "STORAGE_CORRUPTION",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn internal(message: impl ToString) -> Self {
        Self::Internal(message.to_string())
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        if err.is_corruption() {
            Self::StorageCorruption(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::Parse(msg) => Self::Validation(msg),
            DomainError::ClockNotRunning => Self::ClockNotInitialized,
            DomainError::NotFound { entity_type, id } => match entity_type {
                "Zone" => Self::ZoneNotFound(id),
                "SubZone" => Self::SubZoneNotFound(id),
                "Interaction" => Self::InvalidInteraction(id),
                _ => Self::Internal(format!("{entity_type} not found: {id}")),
            },
            DomainError::Invariant(msg) => Self::Internal(msg),
        }
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("background task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_corruption_maps_to_storage_corruption() {
        let err: EngineError = StoreError::corruption("hash mismatch").into();
        assert_eq!(err.code(), "STORAGE_CORRUPTION");

        let err: EngineError = StoreError::serialization("bad").into();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn domain_errors_map_to_codes() {
        let err: EngineError = DomainError::not_found("SubZone", "sub_x_1").into();
        assert_eq!(err, EngineError::SubZoneNotFound("sub_x_1".to_string()));

        let err: EngineError = DomainError::ClockNotRunning.into();
        assert_eq!(err.code(), "CLOCK_NOT_INITIALIZED");

        let err: EngineError = DomainError::validation("too long").into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
