//! Common test utilities for integration tests.
//!
//! Every test builds its own router over a fresh in-memory store, a recording
//! push service and the placeholder generator, so no database or network is
//! needed.

// Not every helper is used by every test binary.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use domain::models::report::ReportInput;
use domain::models::ReportContent;
use domain::services::{
    AnswerSummary, AudioClip, ContentGenerator, GeneratorError, MockPushService,
    PlaceholderGenerator, ProposedSchedule,
};
use experience_loop_api::{
    app::{create_app, AppState},
    config::Config,
};
use fake::{faker::name::en::FirstName, Fake};
use persistence::MemoryStore;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "pw1";

/// A router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub push: Arc<MockPushService>,
    pub store: Arc<MemoryStore>,
    pub media_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_overrides(&[])
    }

    pub fn with_overrides(overrides: &[(&str, &str)]) -> Self {
        Self::build(
            overrides,
            Arc::new(MockPushService::new()),
            Arc::new(PlaceholderGenerator::new()),
        )
    }

    pub fn with_failing_push() -> Self {
        Self::build(
            &[],
            Arc::new(MockPushService::failing()),
            Arc::new(PlaceholderGenerator::new()),
        )
    }

    pub fn with_generator(generator: Arc<dyn ContentGenerator>) -> Self {
        Self::build(&[], Arc::new(MockPushService::new()), generator)
    }

    fn build(
        overrides: &[(&str, &str)],
        push: Arc<MockPushService>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        let media_dir = tempfile::tempdir().expect("Failed to create media dir");
        let config = test_config(media_dir.path().to_str().unwrap(), overrides);
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone(), generator, push.clone());

        Self {
            router: create_app(state),
            push,
            store,
            media_dir,
        }
    }

    /// Sends a request and returns the status and JSON body (`Null` if the
    /// body is not JSON).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_response_body(response).await)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(get_request(uri)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(Method::POST, uri, body)).await
    }

    /// Creates a draft event with the given manual slots.
    pub async fn create_event(&self, code: &str, slots: Value) -> Value {
        let (status, body) = self
            .post("/api/v1/events", event_body(code, slots))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create event failed: {}", body);
        body
    }

    pub async fn publish(&self, code: &str) {
        let (status, body) = self
            .post(
                &format!("/api/v1/events/{}/publish", code),
                json!({ "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "publish failed: {}", body);
    }

    /// Creates and publishes an event with one ask slot and one text question.
    pub async fn published_event(&self, code: &str, t_at: DateTime<Utc>) -> Value {
        self.create_event(code, json!([kickoff_slot(t_at)])).await;
        self.publish(code).await;
        let (_, event) = self.get(&format!("/api/v1/events/{}", code)).await;
        event
    }

    /// Joins `code` and returns the participant id.
    pub async fn join(&self, code: &str, push_endpoint: Option<&str>) -> String {
        let mut body = json!({
            "event_code": code,
            "password": PASSWORD,
            "nickname": random_nickname(),
            "team": "A",
        });
        if let Some(endpoint) = push_endpoint {
            body["push_subscription"] = json!({
                "endpoint": endpoint,
                "keys": { "p256dh": "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM", "auth": "tBHItJI5svbpez7KI4CCXg" }
            });
        }
        let (status, response) = self.post("/api/v1/join", body).await;
        assert_eq!(status, StatusCode::CREATED, "join failed: {}", response);
        response["participant_id"].as_str().unwrap().to_string()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Generator whose model is always down.
pub struct FailingGenerator;

#[async_trait::async_trait]
impl ContentGenerator for FailingGenerator {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn propose_slots(&self, _text: &str) -> Result<ProposedSchedule, GeneratorError> {
        Err(GeneratorError::Unavailable("connection refused".to_string()))
    }

    async fn summarize_answer(&self, _text: &str) -> Result<AnswerSummary, GeneratorError> {
        Err(GeneratorError::Unavailable("connection refused".to_string()))
    }

    async fn generate_report(&self, _input: &ReportInput) -> Result<ReportContent, GeneratorError> {
        Err(GeneratorError::Unavailable("connection refused".to_string()))
    }

    async fn transcribe(&self, _clip: &AudioClip) -> Result<String, GeneratorError> {
        Err(GeneratorError::Unavailable("connection refused".to_string()))
    }
}

/// Test configuration: in-memory store, no password rate limiting.
pub fn test_config(media_dir: &str, overrides: &[(&str, &str)]) -> Config {
    let mut all = vec![("media.dir", media_dir)];
    all.extend_from_slice(overrides);
    Config::load_for_test(&all).expect("Failed to build test config")
}

pub fn random_nickname() -> String {
    FirstName().fake()
}

/// JSON body for creating an event that starts now.
pub fn event_body(code: &str, slots: Value) -> Value {
    let start = Utc::now();
    json!({
        "name": format!("{} Hackathon", code),
        "code": code,
        "password": PASSWORD,
        "venue": "Seoul",
        "start_at": start.to_rfc3339(),
        "end_at": (start + Duration::hours(24)).to_rfc3339(),
        "slots": slots,
    })
}

pub fn kickoff_slot(t_at: DateTime<Utc>) -> Value {
    json!({
        "t_at": t_at.to_rfc3339(),
        "title": "Kickoff",
        "desc": "Tell us what you are building",
        "type": "ask",
        "questions": [{ "text": "What problem?", "kind": "text" }]
    })
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Multipart body builder for form submissions.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "----experience-loop-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse response body as JSON.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// First question id of the first slot of an event returned by GET /events/:code.
pub fn first_question(event: &Value) -> (String, String) {
    let slot = &event["slots"][0];
    (
        slot["id"].as_str().unwrap().to_string(),
        slot["questions"][0]["id"].as_str().unwrap().to_string(),
    )
}
