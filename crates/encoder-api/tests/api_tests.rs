//! API integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use encoder_api::{create_router, AppState, Encoder, StorageProbe};
use encoder_media::{CommandRunner, EncoderInvoker, MediaResult};
use encoder_storage::{StorageConfig, StorageHealthcheck};

/// Encoder that always exits with a fixed code.
struct FixedEncoder {
    exit_code: i32,
    calls: AtomicUsize,
}

impl FixedEncoder {
    fn new(exit_code: i32) -> Arc<Self> {
        Arc::new(Self {
            exit_code,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Encoder for FixedEncoder {
    async fn encode(&self, _arguments: &str) -> MediaResult<i32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.exit_code)
    }
}

/// Storage probe that always reports a fixed status.
struct FixedProbe(u16);

#[async_trait]
impl StorageProbe for FixedProbe {
    async fn probe(&self) -> u16 {
        self.0
    }
}

fn test_router(encoder: Arc<dyn Encoder>, storage: Arc<dyn StorageProbe>) -> Router {
    create_router(AppState::with_services(encoder, storage), None, 1024 * 1024)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn healthcheck_request() -> Request<Body> {
    Request::builder()
        .uri("/healthcheck/")
        .body(Body::empty())
        .unwrap()
}

fn task_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/task/")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn test_healthcheck_ok() {
    let app = test_router(FixedEncoder::new(0), Arc::new(FixedProbe(200)));
    let (status, body) = send(app, healthcheck_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK\n");
}

#[tokio::test]
async fn test_healthcheck_not_ok() {
    for storage_status in [500, 503, 404] {
        let app = test_router(FixedEncoder::new(0), Arc::new(FixedProbe(storage_status)));
        let (status, body) = send(app, healthcheck_request()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "NOT OK\n");
    }
}

#[tokio::test]
async fn test_healthcheck_probes_live_storage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/minio/health/live"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let config = StorageConfig {
        host: server.address().ip().to_string(),
        port: server.address().port(),
        healthcheck_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let probe = Arc::new(StorageHealthcheck::new(&config).unwrap());
    let app = test_router(FixedEncoder::new(0), probe);

    // Same storage state, same answer each time
    for _ in 0..2 {
        let (status, body) = send(app.clone(), healthcheck_request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK\n");
    }
}

#[tokio::test]
async fn test_healthcheck_unreachable_storage() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = StorageConfig {
        host: "127.0.0.1".to_string(),
        port,
        healthcheck_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let probe = Arc::new(StorageHealthcheck::new(&config).unwrap());
    let app = test_router(FixedEncoder::new(0), probe);

    let (status, body) = send(app, healthcheck_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "NOT OK\n");
}

#[tokio::test]
async fn test_task_ok() {
    let encoder = FixedEncoder::new(0);
    let app = test_router(encoder.clone(), Arc::new(FixedProbe(200)));

    let (status, body) = send(app, task_request(r#"{"command": "-version"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "DONE\n");
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_task_error() {
    let app = test_router(FixedEncoder::new(1), Arc::new(FixedProbe(200)));

    let (status, body) = send(app, task_request(r#"{"command": "-version"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ERROR\n");
}

#[tokio::test]
async fn test_task_bad_json() {
    let encoder = FixedEncoder::new(0);
    let app = test_router(encoder.clone(), Arc::new(FixedProbe(200)));

    let (status, body) = send(app, task_request("[")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("ERROR: InvalidJson: "));
    assert!(body.ends_with('\n'));
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_task_not_an_object() {
    let app = test_router(FixedEncoder::new(0), Arc::new(FixedProbe(200)));

    let (status, body) = send(app, task_request(r#"["-version"]"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "ERROR: TypeMismatch: body must be a JSON object, got array\n");
}

#[tokio::test]
async fn test_task_no_command() {
    let app = test_router(FixedEncoder::new(0), Arc::new(FixedProbe(200)));

    let (status, body) = send(app, task_request(r#"{"xxxx": "xxxx"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "ERROR: MissingKey: missing key 'command'\n");
}

#[tokio::test]
async fn test_task_command_bad_type() {
    let app = test_router(FixedEncoder::new(0), Arc::new(FixedProbe(200)));

    let (status, body) = send(app, task_request(r#"{"command": 1}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "ERROR: TypeMismatch: 'command' must be a string, got number\n");
}

#[tokio::test]
async fn test_task_wrong_method() {
    let app = test_router(FixedEncoder::new(0), Arc::new(FixedProbe(200)));

    let request = Request::builder()
        .uri("/task/")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_router(FixedEncoder::new(0), Arc::new(FixedProbe(200)));

    let request = Request::builder()
        .uri("/healthcheck/")
        .header("X-Request-ID", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["X-Request-ID"], "req-123");
}

#[cfg(unix)]
#[tokio::test]
async fn test_task_runs_real_program() {
    // `sh` stands in for the encoder binary
    let encoder = Arc::new(EncoderInvoker::new("sh", CommandRunner::new("encoder")));
    let app = test_router(encoder, Arc::new(FixedProbe(200)));

    let (status, body) = send(app.clone(), task_request(r#"{"command": "-c 'exit 0'"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "DONE\n");

    let (status, body) = send(app, task_request(r#"{"command": "-c 'exit 1'"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ERROR\n");
}

#[cfg(unix)]
#[tokio::test]
async fn test_task_timeout_reports_error() {
    let runner = CommandRunner::new("encoder").with_timeout(Some(Duration::from_millis(100)));
    let encoder = Arc::new(EncoderInvoker::new("sh", runner));
    let app = test_router(encoder, Arc::new(FixedProbe(200)));

    let (status, body) = send(app, task_request(r#"{"command": "-c 'exec sleep 5'"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ERROR\n");
}

#[tokio::test]
async fn test_task_missing_encoder_is_internal_error() {
    let encoder = Arc::new(EncoderInvoker::new(
        "definitely-not-a-real-encoder-xyz",
        CommandRunner::new("encoder"),
    ));
    let app = test_router(encoder, Arc::new(FixedProbe(200)));

    let (status, body) = send(app, task_request(r#"{"command": "-version"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.starts_with("ERROR: Failed to spawn definitely-not-a-real-encoder-xyz"));
}

#[tokio::test]
async fn test_task_unbalanced_quotes() {
    let encoder = Arc::new(EncoderInvoker::new("ffmpeg", CommandRunner::new("encoder")));
    let app = test_router(encoder, Arc::new(FixedProbe(200)));

    let (status, body) = send(app, task_request(r#"{"command": "-i \"oops"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("ERROR: InvalidArguments: "));
}
