//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock converter and a recording export sink, so every endpoint can
//! be exercised without real conversions or filesystem writes.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use fileshift_core::testing::{MockConverter, RecordingSink};
use fileshift_core::{
    ArtifactStore, Config, ConversionQueue, Converter, DownloadSink, QueueConfig,
};
use fileshift_server::api::WsBroadcaster;
use fileshift_server::state::{AppState, SharedQueue};

/// Boundary used by multipart request bodies.
const BOUNDARY: &str = "fileshift-test-boundary";

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_upload() {
///     let fixture = TestFixture::new();
///
///     let response = fixture
///         .upload("/api/v1/files", &[("photo.jpg", b"jpeg bytes".to_vec())])
///         .await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock converter - control conversion outcomes
    pub converter: MockConverter,
    /// Export sink - inspect exported artifacts
    pub sink: RecordingSink,
    /// The queue behind the router
    pub queue: SharedQueue,
    /// Broadcaster shared with the router
    pub broadcaster: WsBroadcaster,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Raw body bytes, for non-JSON responses
    pub raw: Vec<u8>,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
}

impl TestFixture {
    /// Create a new test fixture with default configuration.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(test_config: TestConfig) -> Self {
        let converter = MockConverter::new();
        let sink = RecordingSink::new();

        let mut config = Config::default();
        config.server.host = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        config.queue = QueueConfig::default().with_max_file_size(test_config.max_file_size);
        config.export.pacing_delay_ms = 0;

        let store = Arc::new(ArtifactStore::new().with_pacing_delay(Duration::ZERO));
        let queue: SharedQueue = Arc::new(
            ConversionQueue::new(
                config.queue.clone(),
                Arc::new(converter.clone()) as Arc<dyn Converter>,
            )
            .with_store(store),
        );

        let broadcaster = WsBroadcaster::default();
        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&queue),
            Arc::new(sink.clone()) as Arc<dyn DownloadSink>,
            broadcaster.clone(),
        ));

        let router = fileshift_server::api::create_router(state);

        Self {
            router,
            converter,
            sink,
            queue,
            broadcaster,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Upload files as a multipart form, one `files` part per file.
    pub async fn upload(&self, path: &str, files: &[(&str, Vec<u8>)]) -> TestResponse {
        let mut body = Vec::new();
        for (name, content) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, name
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// Upload files and return the accepted file ids.
    pub async fn upload_ids(&self, files: &[(&str, Vec<u8>)]) -> Vec<String> {
        let response = self.upload("/api/v1/files", files).await;
        response.body["accepted"]
            .as_array()
            .map(|accepted| {
                accepted
                    .iter()
                    .filter_map(|f| f["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Poll until no run is active.
    pub async fn wait_for_idle(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.queue.is_running() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Run did not finish in time");
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let header = |name: axum::http::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header(axum::http::header::CONTENT_TYPE);
        let content_disposition = header(axum::http::header::CONTENT_DISPOSITION);

        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            body,
            raw: body_bytes.to_vec(),
            content_type,
            content_disposition,
        }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Largest accepted upload in bytes
    pub max_file_size: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            max_file_size: 1024 * 1024,
        }
    }
}

impl TestConfig {
    /// Create config with a small file size limit.
    pub fn with_max_file_size(max_file_size: u64) -> Self {
        Self { max_file_size }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
