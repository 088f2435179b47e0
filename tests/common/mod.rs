//! Shared test utilities and fixtures
//!
//! A mock tokenizer service plus a session wired to it.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lexlens_analysis::{HttpAnalyzer, ServiceConfig};
use lexlens_pipeline::{DiagnosticsSession, MarkerLayer, PipelineConfig, PipelineOutcome};

pub const CHANNEL: &str = "lexlens";

/// Shortest debounce the pipeline accepts; keeps real-time tests quick.
pub const FAST_DEBOUNCE_MS: u64 = 50;

pub type TestSession = DiagnosticsSession<HttpAnalyzer, MarkerLayer>;

/// Start a mock server that simulates the tokenizer service
pub async fn start_tokenizer_mock() -> MockServer {
    MockServer::start().await
}

/// Answer every `/tokenize` request with `body`.
pub async fn mount_reply(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/tokenize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Answer requests for exactly `code` with `body`, after `delay`.
pub async fn mount_reply_for(server: &MockServer, code: &str, body: Value, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/tokenize"))
        .and(body_json(json!({ "code": code })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Answer every `/tokenize` request with a bare status code.
pub async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/tokenize"))
        .respond_with(ResponseTemplate::new(status).set_body_string("tokenizer unavailable"))
        .mount(server)
        .await;
}

/// One error record in the service's array format (0-based position).
pub fn error_record(line: i64, column: i64, message: &str) -> Value {
    json!({ "line": line, "column": column, "message": message, "message_type": "Error" })
}

pub fn session_for(endpoint: &str) -> TestSession {
    let analyzer = HttpAnalyzer::new(&ServiceConfig::default().with_endpoint(endpoint))
        .expect("valid endpoint");
    let config = PipelineConfig::default().with_debounce_ms(FAST_DEBOUNCE_MS);
    DiagnosticsSession::new(analyzer, MarkerLayer::new(), &config)
}

/// Wait for the next outcome, failing the test instead of hanging.
pub async fn next_outcome(session: &mut TestSession) -> PipelineOutcome {
    tokio::time::timeout(Duration::from_secs(5), session.next_outcome())
        .await
        .expect("outcome within 5s")
        .expect("event channel open")
}

/// Number of requests the mock has seen so far.
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map_or(0, |requests| requests.len())
}

/// Decoded `code` field of every request the mock has seen.
pub async fn requested_code(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| request.body_json::<Value>().ok())
        .filter_map(|body| body["code"].as_str().map(str::to_string))
        .collect()
}
