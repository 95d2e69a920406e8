//! Task handler.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use encoder_media::MediaError;
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;
use crate::task::TaskRequest;

/// Body returned when the encoder exited 0.
pub const TASK_DONE: &str = "DONE\n";
/// Body returned when the encoder exited non-zero.
pub const TASK_ERROR: &str = "ERROR\n";

/// Run one encoder task and wait for it to finish.
///
/// Malformed bodies are rejected with 400. An encoder that runs but exits
/// non-zero (or overruns the configured timeout) is reported as `ERROR` with
/// status 200.
pub async fn run_task(State(state): State<AppState>, body: Bytes) -> ApiResult<&'static str> {
    let request = match TaskRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(kind = e.kind(), "Rejected task: {}", e);
            metrics::record_task_rejected(e.kind());
            return Err(e.into());
        }
    };

    info!(command = %request.command, "Task received");
    let start = Instant::now();

    let exit_code = match state.encoder.encode(&request.command).await {
        Ok(code) => code,
        Err(MediaError::Timeout(limit)) => {
            warn!(
                command = %request.command,
                timeout_ms = limit.as_millis() as u64,
                "Task timed out"
            );
            -1
        }
        Err(e) => return Err(e.into()),
    };

    let succeeded = exit_code == 0;
    metrics::record_task(succeeded, start.elapsed().as_secs_f64());
    info!(
        exit_code,
        duration_ms = %start.elapsed().as_millis(),
        "Task finished"
    );

    Ok(if succeeded { TASK_DONE } else { TASK_ERROR })
}
