//! API configuration.

use std::time::Duration;

use encoder_media::DEFAULT_ENCODER;
use encoder_storage::StorageConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Run background actions (storage initialization) at startup
    pub actions: bool,
    /// Encoder program
    pub encoder_bin: String,
    /// Per-task timeout; `None` waits for the encoder indefinitely
    pub task_timeout: Option<Duration>,
    /// Max request body size
    pub max_body_size: usize,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    /// Storage backend settings
    pub storage: StorageConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            actions: true,
            encoder_bin: DEFAULT_ENCODER.to_string(),
            task_timeout: None,
            max_body_size: 1024 * 1024, // 1MB
            metrics_enabled: true,
            storage: StorageConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("ENCODER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("ENCODER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            actions: std::env::var("ACTIONS")
                .ok()
                .and_then(|s| s.parse::<u8>().ok())
                .map(|v| v != 0)
                .unwrap_or(true),
            encoder_bin: std::env::var("ENCODER_BIN")
                .unwrap_or_else(|_| DEFAULT_ENCODER.to_string()),
            task_timeout: std::env::var("ENCODER_TASK_TIMEOUT")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            storage: StorageConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.actions);
        assert_eq!(config.encoder_bin, "ffmpeg");
        assert_eq!(config.task_timeout, None);
        assert_eq!(config.storage.init_tries, 10);
    }
}
