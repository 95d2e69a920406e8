//! Application state.

use std::sync::Arc;

use encoder_media::{CommandRunner, EncoderInvoker};
use encoder_storage::{StorageHealthcheck, StorageResult};

use crate::config::ApiConfig;
use crate::services::{Encoder, StorageProbe};

/// Shared application state.
///
/// Holds no mutable data; every request works on its own invocation.
#[derive(Clone)]
pub struct AppState {
    pub encoder: Arc<dyn Encoder>,
    pub storage: Arc<dyn StorageProbe>,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: &ApiConfig) -> StorageResult<Self> {
        let runner = CommandRunner::new("encoder").with_timeout(config.task_timeout);
        let encoder = EncoderInvoker::new(&config.encoder_bin, runner);
        let storage = StorageHealthcheck::new(&config.storage)?;

        Ok(Self::with_services(Arc::new(encoder), Arc::new(storage)))
    }

    /// Create application state from existing services.
    pub fn with_services(encoder: Arc<dyn Encoder>, storage: Arc<dyn StorageProbe>) -> Self {
        Self { encoder, storage }
    }
}
