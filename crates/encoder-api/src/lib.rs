//! Axum HTTP task runner for the encoder.
//!
//! This crate provides:
//! - `POST /task/` running the encoder per request
//! - `GET /healthcheck/` reporting live storage connectivity
//! - A cancellable background task for storage initialization
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod supervisor;
pub mod task;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{Encoder, StorageProbe};
pub use state::AppState;
pub use supervisor::{spawn_storage_init, BackgroundTask, InitOutcome};
pub use task::{TaskRequest, TaskRequestError};
