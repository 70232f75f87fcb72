use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use httpmock::MockServer;
use prep_engine::pinecone_service::DEFAULT_DIMENSION;
use prep_engine::{CostEstimate, CostEstimator, CostRecorder, EngineSettings, PineconeSettings};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "prep-test-boundary";

#[derive(Default)]
pub struct RecordingRecorder {
    records: Mutex<Vec<(String, CostEstimate)>>,
}

impl RecordingRecorder {
    pub fn labels(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(label, _)| label.clone())
            .collect()
    }
}

impl CostRecorder for RecordingRecorder {
    fn record(&self, label: &str, estimate: &CostEstimate) {
        self.records
            .lock()
            .unwrap()
            .push((label.to_string(), *estimate));
    }
}

/// Router wired to a mock engine/Pinecone server and a scratch upload directory.
pub struct TestApp {
    pub state: AppState,
    pub recorder: Arc<RecordingRecorder>,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn new(server: &MockServer) -> Self {
        Self::with_timeout(server, Duration::from_secs(5))
    }

    pub fn with_timeout(server: &MockServer, outbound_timeout: Duration) -> Self {
        Self::build(server, outbound_timeout, 10 * 1024 * 1024)
    }

    pub fn with_upload_limit(server: &MockServer, max_upload_bytes: usize) -> Self {
        Self::build(server, Duration::from_secs(5), max_upload_bytes)
    }

    fn build(server: &MockServer, outbound_timeout: Duration, max_upload_bytes: usize) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let config = Config {
            port: 0,
            engine: EngineSettings {
                url: server.url("/engine"),
                bearer_token: "engine-secret".to_string(),
                llm_api_key: None,
            },
            pinecone: PineconeSettings {
                api_key: "pc-key".to_string(),
                environment: "test-env".to_string(),
                index_name: "library".to_string(),
                dimension: DEFAULT_DIMENSION,
                controller_url: Some(server.base_url()),
                index_host: Some(server.base_url()),
            },
            outbound_timeout,
            upload_dir: uploads.path().to_path_buf(),
            max_upload_bytes,
        };

        let recorder = Arc::new(RecordingRecorder::default());
        let estimator = CostEstimator::with_recorder(recorder.clone()).unwrap();
        let state = AppState::with_cost_estimator(config, estimator).unwrap();

        Self {
            state,
            recorder,
            uploads,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Waits briefly for detached cost estimates to land.
    pub async fn wait_for_cost(&self, label: &str) -> bool {
        for _ in 0..100 {
            if self.recorder.labels().iter().any(|l| l == label) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.uploads.path()).unwrap().count()
    }
}

pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.field, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends one request; non-JSON bodies come back as a JSON string.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}
