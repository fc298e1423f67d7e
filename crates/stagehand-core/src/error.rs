//! Error types for the Stagehand engine.

use thiserror::Error;

/// A shared error type for the entire Stagehand workspace.
///
/// Configuration errors are raised by startup validation only and are fatal;
/// the remaining variants are per-request and recoverable at the navigation
/// engine boundary.
#[derive(Error, Debug, Clone)]
pub enum StagehandError {
    /// Invalid static configuration (duplicate screen id, dangling button
    /// target, missing entry screen, unregistered permission rule). The
    /// process must refuse to start.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entity not found with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Key-value store access error (load/save/delete)
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Outbound delivery error (send/edit failed after fallback)
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StagehandError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Creates a Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Creates a Delivery error
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery(message.into())
    }

    /// Returns true if the error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl From<serde_json::Error> for StagehandError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Conversion from anyhow::Error for adapter edges that use `Context`.
impl From<anyhow::Error> for StagehandError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, StagehandError>`.
pub type Result<T> = std::result::Result<T, StagehandError>;
