//! Error types for port operations.

/// Save persistence errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem operation failed - includes operation name and path for tracing.
    #[error("I/O error in {operation} ({path}): {message}")]
    Io {
        operation: &'static str,
        path: String,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored data is inconsistent (missing shard, hash mismatch, broken manifest).
    #[error("Storage corruption: {0}")]
    Corruption(String),

    /// Blocking task could not complete.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Create an Io error with operation and path context.
    pub fn io(operation: &'static str, path: &std::path::Path, err: impl ToString) -> Self {
        Self::Io {
            operation,
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    /// Create a Corruption error.
    pub fn corruption(message: impl ToString) -> Self {
        Self::Corruption(message.to_string())
    }

    /// Check if this is a Corruption error.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption(_))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Generation unavailable: {0}")]
    Unavailable(String),
}
