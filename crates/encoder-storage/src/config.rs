//! Storage configuration.

use std::time::Duration;

/// Configuration for the storage backend and its CLI.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage backend host
    pub host: String,
    /// Storage backend port
    pub port: u16,
    /// Access key
    pub access_key: String,
    /// Secret key
    pub secret_key: String,
    /// Storage CLI program
    pub cli: String,
    /// Alias registered by the CLI
    pub alias: String,
    /// Delay between registration attempts
    pub init_delay: Duration,
    /// Maximum registration attempts
    pub init_tries: u32,
    /// Health endpoint path
    pub healthcheck_path: String,
    /// Bound on the health probe request
    pub healthcheck_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            host: "storage".to_string(),
            port: 9000,
            access_key: String::new(),
            secret_key: String::new(),
            cli: "mc".to_string(),
            alias: "storage".to_string(),
            init_delay: Duration::from_secs(5),
            init_tries: 10,
            healthcheck_path: "/minio/health/live".to_string(),
            healthcheck_timeout: Duration::from_secs(5),
        }
    }
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("STORAGE_HOST").unwrap_or(defaults.host),
            port: std::env::var("STORAGE_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            access_key: std::env::var("STORAGE_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("STORAGE_SECRET_KEY").unwrap_or_default(),
            cli: std::env::var("STORAGE_CLI").unwrap_or(defaults.cli),
            alias: std::env::var("STORAGE_ALIAS").unwrap_or(defaults.alias),
            init_delay: std::env::var("STORAGE_INIT_DELAY")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.init_delay),
            init_tries: std::env::var("STORAGE_INIT_TRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.init_tries),
            healthcheck_path: std::env::var("STORAGE_HEALTHCHECK_PATH")
                .unwrap_or(defaults.healthcheck_path),
            healthcheck_timeout: std::env::var("STORAGE_HEALTHCHECK_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.healthcheck_timeout),
        }
    }

    /// Base URL of the storage backend.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Full URL of the storage health endpoint.
    pub fn healthcheck_url(&self) -> String {
        let path = self.healthcheck_path.trim_start_matches('/');
        format!("{}/{}", self.endpoint(), path)
    }
}
