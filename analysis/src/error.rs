use reqwest::StatusCode;

/// Failure of a single analysis round-trip.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The configured endpoint is not a valid base URL.
    #[error("invalid tokenizer endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
    /// The service could not be reached or the connection failed mid-request.
    #[error("tokenizer request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-2xx status.
    #[error("tokenizer returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// The reply matched none of the known response shapes.
    #[error("malformed tokenizer response: {0}")]
    Malformed(String),
}

impl AnalysisError {
    /// Whether this is a transport-level failure (unreachable or non-2xx).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}
