//! Background task lifecycle.
//!
//! A [`BackgroundTask`] is started once at service startup and owned by the
//! binary. Shutdown flips its cancellation flag and waits for the task to
//! return, so no work it started outlives the server.

use std::future::Future;

use encoder_storage::{StorageError, StorageInitializer, StorageResult};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Handle to a cancellable background task.
pub struct BackgroundTask<T> {
    name: String,
    cancel: watch::Sender<bool>,
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> BackgroundTask<T> {
    /// Spawn `task` with a cancellation receiver that flips to `true` on shutdown.
    pub fn spawn<F, Fut>(name: impl Into<String>, task: F) -> Self
    where
        F: FnOnce(watch::Receiver<bool>) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let name = name.into();
        let (cancel, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(task(cancel_rx));

        info!(task = %name, "Background task started");

        Self {
            name,
            cancel,
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Request cancellation without waiting.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Wait for the task to return. `None` if it panicked or was aborted.
    pub async fn join(self) -> Option<T> {
        match self.handle.await {
            Ok(output) => Some(output),
            Err(e) => {
                error!(task = %self.name, "Background task failed: {}", e);
                None
            }
        }
    }

    /// Request cancellation and wait for the task to acknowledge it.
    pub async fn shutdown(self) -> Option<T> {
        info!(task = %self.name, "Stopping background task");
        self.cancel();
        self.join().await
    }
}

/// Terminal state of the storage initialization task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Succeeded { attempts: u32 },
    NoStorage { attempts: u32 },
    Cancelled,
    Failed(String),
}

impl From<StorageResult<u32>> for InitOutcome {
    fn from(result: StorageResult<u32>) -> Self {
        match result {
            Ok(attempts) => InitOutcome::Succeeded { attempts },
            Err(StorageError::NoStorage { attempts }) => InitOutcome::NoStorage { attempts },
            Err(StorageError::Cancelled) => InitOutcome::Cancelled,
            Err(e) => InitOutcome::Failed(e.to_string()),
        }
    }
}

/// Start storage initialization as a background task.
pub fn spawn_storage_init(initializer: StorageInitializer) -> BackgroundTask<InitOutcome> {
    BackgroundTask::spawn("storage-init", move |cancel| async move {
        let outcome = InitOutcome::from(initializer.run(cancel).await);

        match &outcome {
            InitOutcome::Succeeded { attempts } => {
                info!(attempts, "Storage initialization succeeded")
            }
            InitOutcome::NoStorage { attempts } => {
                error!(attempts, "No storage available, service is degraded")
            }
            InitOutcome::Cancelled => warn!("Storage initialization cancelled"),
            InitOutcome::Failed(e) => error!("Storage initialization failed: {}", e),
        }

        outcome
    })
}
