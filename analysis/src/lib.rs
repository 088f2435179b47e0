//! Tokenizer service client and response normalization.
//!
//! # Architecture
//!
//! - [`Analyzer`] - the request seam; [`HttpAnalyzer`] is the production implementation
//!   that posts the buffer to the service's `/tokenize` endpoint.
//! - [`RawAnalysisResponse`] - the reply as it came off the wire (string, array, or object).
//! - [`normalize`] - classifies the raw reply into one of a closed set of shapes and
//!   extracts canonical [`Diagnostic`](lexlens_types::Diagnostic)s plus an optional
//!   [`TokenSummary`](lexlens_types::TokenSummary) for the token panel.
//!
//! # Error Handling
//!
//! Transport failures and non-2xx statuses surface as [`AnalysisError`]. Malformed
//! records inside an otherwise recognizable reply are skipped one at a time rather
//! than failing the whole reply; only a reply with no recognizable shape at all is an
//! error.

mod client;
mod error;
mod normalize;
mod response;

pub use client::{Analyzer, DEFAULT_ENDPOINT, HttpAnalyzer, ServiceConfig};
pub use error::AnalysisError;
pub use normalize::{Analysis, NO_ERRORS_SENTINEL, normalize};
pub use response::RawAnalysisResponse;

pub use reqwest::StatusCode;
