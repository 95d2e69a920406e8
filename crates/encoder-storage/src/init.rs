//! Storage alias registration with bounded retries.
//!
//! The registration command is retried a fixed number of times with a
//! constant delay in between. The delay is also where cancellation is
//! observed; an attempt that is running when cancellation arrives is dropped,
//! which kills its child process.

use std::time::Duration;

use encoder_media::{CommandLine, CommandRunner};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

/// Registers the storage alias through the storage CLI.
#[derive(Debug, Clone)]
pub struct StorageInitializer {
    command: CommandLine,
    delay: Duration,
    tries: u32,
    runner: CommandRunner,
}

impl StorageInitializer {
    /// Create an initializer from storage configuration.
    pub fn new(config: &StorageConfig, runner: CommandRunner) -> Self {
        Self {
            command: registration_command(config),
            delay: config.init_delay,
            tries: config.init_tries,
            runner,
        }
    }

    /// Replace the registration command.
    pub fn with_command(mut self, command: CommandLine) -> Self {
        self.command = command;
        self
    }

    pub fn command(&self) -> &CommandLine {
        &self.command
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run registration attempts until one succeeds.
    ///
    /// Returns the number of attempts used on success. Fails with
    /// [`StorageError::NoStorage`] once every attempt exited non-zero or could
    /// not be started, and with [`StorageError::Cancelled`] when `cancel`
    /// flips to `true`.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) -> StorageResult<u32> {
        info!(
            command = %self.command,
            tries = self.tries,
            delay_secs = self.delay.as_secs_f64(),
            "Starting storage initialization"
        );

        for attempt in 1..=self.tries {
            if attempt > 1 {
                tokio::select! {
                    _ = tokio::time::sleep(self.delay) => {}
                    _ = cancelled(&mut cancel) => {
                        info!(attempt, "Storage initialization cancelled while waiting");
                        return Err(StorageError::Cancelled);
                    }
                }
            }

            let result = tokio::select! {
                result = self.runner.run(&self.command) => result,
                _ = cancelled(&mut cancel) => {
                    info!(attempt, "Storage initialization cancelled during attempt");
                    return Err(StorageError::Cancelled);
                }
            };

            match result {
                Ok(0) => {
                    info!(attempt, "Storage initialized");
                    return Ok(attempt);
                }
                Ok(exit_code) => warn!(
                    attempt,
                    tries = self.tries,
                    exit_code,
                    "Storage registration attempt failed"
                ),
                // A CLI that cannot be started counts as a failed attempt
                Err(e) => warn!(
                    attempt,
                    tries = self.tries,
                    "Storage registration attempt failed: {}",
                    e
                ),
            }
        }

        error!(tries = self.tries, "No storage: registration retries exhausted");
        Err(StorageError::NoStorage {
            attempts: self.tries,
        })
    }
}

/// Build the alias registration command for the storage CLI.
pub fn registration_command(config: &StorageConfig) -> CommandLine {
    CommandLine::new(&config.cli)
        .args(["alias", "set"])
        .arg(&config.alias)
        .arg(config.endpoint())
        .secret_arg(&config.access_key)
        .secret_arg(&config.secret_key)
}

/// Resolves once cancellation has been requested.
///
/// Never resolves if the sender is gone without requesting cancellation.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
