//! Seams between the handlers and the components they drive.

use async_trait::async_trait;
use encoder_media::{EncoderInvoker, MediaResult};
use encoder_storage::StorageHealthcheck;

/// Runs the encoder for a task.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Run the encoder with a caller-supplied argument string.
    ///
    /// Returns the encoder's exit code; non-zero is not an error.
    async fn encode(&self, arguments: &str) -> MediaResult<i32>;
}

#[async_trait]
impl Encoder for EncoderInvoker {
    async fn encode(&self, arguments: &str) -> MediaResult<i32> {
        self.invoke(arguments).await
    }
}

/// Reports the live HTTP status of the storage backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageProbe: Send + Sync {
    async fn probe(&self) -> u16;
}

#[async_trait]
impl StorageProbe for StorageHealthcheck {
    async fn probe(&self) -> u16 {
        self.status().await
    }
}
