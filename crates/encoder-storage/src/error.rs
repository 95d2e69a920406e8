//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Every registration attempt exited non-zero or failed to start.
    #[error("No storage: registration failed after {attempts} attempts")]
    NoStorage { attempts: u32 },

    #[error("Storage initialization cancelled")]
    Cancelled,

    #[error("Failed to configure storage client: {0}")]
    ConfigError(String),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Returns true for the terminal no-storage condition.
    pub fn is_no_storage(&self) -> bool {
        matches!(self, StorageError::NoStorage { .. })
    }
}
