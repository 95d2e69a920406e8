//! Health check handler.

use axum::extract::State;
use encoder_storage::HEALTHY_STATUS;
use tracing::debug;

use crate::metrics;
use crate::state::AppState;

/// Body returned when the storage backend is reachable.
pub const HEALTH_OK: &str = "OK\n";
/// Body returned when the storage backend is degraded or unreachable.
pub const HEALTH_NOT_OK: &str = "NOT OK\n";

/// Health check endpoint (liveness and readiness).
///
/// Always answers 200; storage connectivity is carried in the body. The
/// storage backend is probed live on every call.
pub async fn healthcheck(State(state): State<AppState>) -> &'static str {
    let status = state.storage.probe().await;
    metrics::record_storage_healthcheck(status);
    debug!(storage_status = status, "Healthcheck");

    if status == HEALTHY_STATUS {
        HEALTH_OK
    } else {
        HEALTH_NOT_OK
    }
}
