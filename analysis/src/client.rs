//! HTTP client for the tokenizer service.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AnalysisError;
use crate::response::RawAnalysisResponse;

/// Endpoint the tokenizer service listens on by default.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3030";

const TOKENIZE_PATH: &str = "tokenize";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Connection settings for the tokenizer service (`[service]` table).
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Base URL; the request goes to `<endpoint>/tokenize`.
    #[serde(default = "default_endpoint")]
    endpoint: String,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    connect_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// One request/response exchange with an analysis backend.
///
/// Implementations must not retry; a failed exchange is reported once and the
/// pipeline leaves the installed markers alone.
pub trait Analyzer: Send + Sync + 'static {
    fn analyze(
        &self,
        text: String,
    ) -> impl Future<Output = Result<RawAnalysisResponse, AnalysisError>> + Send;
}

#[derive(Debug, Serialize)]
struct TokenizeRequest<'a> {
    code: &'a str,
}

/// [`Analyzer`] that posts the buffer to `POST <endpoint>/tokenize`.
#[derive(Debug, Clone)]
pub struct HttpAnalyzer {
    client: reqwest::Client,
    url: Url,
}

impl HttpAnalyzer {
    pub fn new(config: &ServiceConfig) -> Result<Self, AnalysisError> {
        let url = tokenize_url(config.endpoint())?;
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("lexlens/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, url })
    }

    /// Fully resolved request URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Analyzer for HttpAnalyzer {
    async fn analyze(&self, text: String) -> Result<RawAnalysisResponse, AnalysisError> {
        tracing::debug!(url = %self.url, bytes = text.len(), "Sending analysis request");
        let response = self
            .client
            .post(self.url.clone())
            .json(&TokenizeRequest { code: &text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_body(response).await;
            return Err(AnalysisError::Status { status, body });
        }

        let body = response.text().await?;
        Ok(RawAnalysisResponse::from_body(&body))
    }
}

fn tokenize_url(endpoint: &str) -> Result<Url, AnalysisError> {
    let mut base = endpoint.trim().to_string();
    // Without the trailing slash `join` would replace the last path segment.
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|base| base.join(TOKENIZE_PATH))
        .map_err(|source| AnalysisError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })
}

async fn read_capped_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while let Ok(Some(chunk)) = response.chunk().await {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
