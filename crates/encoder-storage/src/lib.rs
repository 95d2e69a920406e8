//! Object storage integration for the encoder service.
//!
//! This crate provides:
//! - Storage configuration from the environment
//! - Alias registration through the storage CLI with bounded retries
//! - A live HTTP health probe of the storage backend

pub mod config;
pub mod error;
pub mod health;
pub mod init;

pub use config::StorageConfig;
pub use error::{StorageError, StorageResult};
pub use health::{StorageHealthcheck, HEALTHY_STATUS, UNREACHABLE_STATUS};
pub use init::StorageInitializer;
