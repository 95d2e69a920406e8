//! Error types for process execution.

use std::time::Duration;

use thiserror::Error;

/// Result type for process execution.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while running an external program.
///
/// A non-zero exit code is not an error; it is returned as a normal value.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Program not found in PATH: {0}")]
    ProgramNotFound(String),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a spawn failure error.
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create an invalid arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }
}
