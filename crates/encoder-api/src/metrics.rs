//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "encoder_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "encoder_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "encoder_http_requests_in_flight";

    // Task metrics
    pub const TASKS_TOTAL: &str = "encoder_tasks_total";
    pub const TASKS_REJECTED_TOTAL: &str = "encoder_tasks_rejected_total";
    pub const TASK_DURATION_SECONDS: &str = "encoder_task_duration_seconds";

    // Storage metrics
    pub const STORAGE_HEALTHCHECKS_TOTAL: &str = "encoder_storage_healthchecks_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a finished encoder task.
pub fn record_task(succeeded: bool, duration_secs: f64) {
    let outcome = if succeeded { "done" } else { "error" };
    let labels = [("outcome", outcome.to_string())];

    counter!(names::TASKS_TOTAL, &labels).increment(1);
    histogram!(names::TASK_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a task rejected before reaching the encoder.
pub fn record_task_rejected(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::TASKS_REJECTED_TOTAL, &labels).increment(1);
}

/// Record a storage healthcheck result.
pub fn record_storage_healthcheck(status: u16) {
    let labels = [("status", status.to_string())];
    counter!(names::STORAGE_HEALTHCHECKS_TOTAL, &labels).increment(1);
}

/// Path label for requests that hit no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Route template of a request, so labels stay bounded by the route table.
fn path_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = path_label(&request);
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    use crate::routes::create_router;
    use crate::services::{MockEncoder, MockStorageProbe};
    use crate::state::AppState;

    fn request_lines(rendered: &str) -> Vec<&str> {
        rendered
            .lines()
            .filter(|line| line.starts_with(names::HTTP_REQUESTS_TOTAL))
            .collect()
    }

    #[tokio::test]
    async fn test_unknown_paths_share_one_series() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let mut storage = MockStorageProbe::new();
        storage.expect_probe().returning(|| 200);
        let state = AppState::with_services(Arc::new(MockEncoder::new()), Arc::new(storage));
        let app = create_router(state, None, 1024);

        for i in 0..50 {
            let request = Request::builder()
                .uri(format!("/junk-{}", i))
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
        let request = Request::builder()
            .uri("/healthcheck/")
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap();

        let rendered = handle.render();
        let lines = request_lines(&rendered);
        assert_eq!(lines.len(), 2, "{}", rendered);
        assert!(lines.iter().any(|l| l.contains(r#"path="unmatched""#) && l.ends_with(" 50")));
        assert!(lines.iter().any(|l| l.contains(r#"path="/healthcheck/""#)));
    }
}
