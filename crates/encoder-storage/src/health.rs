//! Storage backend health probe.

use reqwest::Client;
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

/// Status reported by a healthy storage backend.
pub const HEALTHY_STATUS: u16 = 200;

/// Status substituted when the backend cannot be reached at all.
pub const UNREACHABLE_STATUS: u16 = 500;

/// Probes the storage health endpoint over HTTP.
///
/// Holds one pooled client for the lifetime of the service. Every call
/// performs a live request; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct StorageHealthcheck {
    http: Client,
    url: String,
}

impl StorageHealthcheck {
    /// Create a health probe from storage configuration.
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        let http = Client::builder()
            .timeout(config.healthcheck_timeout)
            .connect_timeout(config.healthcheck_timeout)
            .build()
            .map_err(|e| StorageError::config_error(e.to_string()))?;

        Ok(Self {
            http,
            url: config.healthcheck_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one GET to the health endpoint and return the response status.
    ///
    /// Transport failures (refused, timed out, unresolvable) are reported as
    /// [`UNREACHABLE_STATUS`] and never returned as errors.
    pub async fn status(&self) -> u16 {
        let status = match self.http.get(&self.url).send().await {
            Ok(response) => response.status().as_u16(),
            Err(e) => {
                warn!(url = %self.url, error = %e, "Storage healthcheck request failed");
                UNREACHABLE_STATUS
            }
        };

        if status == HEALTHY_STATUS {
            info!(url = %self.url, status, "Storage connected");
        } else {
            warn!(url = %self.url, status, "Storage disconnected");
        }

        status
    }
}
