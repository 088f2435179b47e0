//! Wire-level reply and its classification into a closed set of shapes.

use serde_json::{Map, Value};

use lexlens_types::TokenCategory;

use crate::error::AnalysisError;

/// The service's reply, untyped beyond its top-level JSON kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAnalysisResponse {
    /// A bare string, either a JSON string or a non-JSON text body.
    Text(String),
    /// A top-level JSON array.
    List(Vec<Value>),
    /// A top-level JSON object.
    Object(Map<String, Value>),
    /// Any other JSON value (number, bool, null).
    Other(Value),
}

impl RawAnalysisResponse {
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items),
            Value::Object(map) => Self::Object(map),
            other => Self::Other(other),
        }
    }

    /// Decode a 2xx response body. Bodies that are not JSON are taken as bare text.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(value),
            Err(_) => Self::Text(body.to_string()),
        }
    }
}

/// Where the token panel's data lives inside a reply.
#[derive(Debug)]
pub(crate) enum TokenSource {
    /// Flat `tokens` array of `{token_global?, token_type, lexeme}` records.
    Stream(Vec<Value>),
    /// Object keyed by category field (`symbols`, `literals`, ...).
    Categories(Map<String, Value>),
}

#[derive(Debug)]
pub(crate) enum ResponseShape {
    /// Bare string: one diagnostic at the start of the buffer.
    Message(String),
    /// Diagnostic-shaped records.
    Records(Vec<Value>),
    /// Token classification only, no diagnostics.
    Tokens(TokenSource),
    /// Object carrying an `errors` array and possibly tokens alongside.
    Report {
        records: Vec<Value>,
        tokens: Option<TokenSource>,
    },
}

fn is_token_record(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key("lexeme") && !obj.contains_key("message"))
}

fn has_category_field(map: &Map<String, Value>) -> bool {
    map.keys().any(|key| TokenCategory::from_field(key).is_some())
}

fn take_token_source(map: &mut Map<String, Value>) -> Option<TokenSource> {
    if matches!(map.get("tokens"), Some(Value::Array(_)))
        && let Some(Value::Array(stream)) = map.remove("tokens")
    {
        return Some(TokenSource::Stream(stream));
    }
    if has_category_field(map) {
        return Some(TokenSource::Categories(std::mem::take(map)));
    }
    None
}

/// Classify a raw reply before any field-level extraction happens.
pub(crate) fn classify(raw: RawAnalysisResponse) -> Result<ResponseShape, AnalysisError> {
    match raw {
        RawAnalysisResponse::Text(message) => Ok(ResponseShape::Message(message)),
        RawAnalysisResponse::List(items) => {
            if !items.is_empty() && items.iter().all(is_token_record) {
                Ok(ResponseShape::Tokens(TokenSource::Stream(items)))
            } else {
                Ok(ResponseShape::Records(items))
            }
        }
        RawAnalysisResponse::Object(mut map) => {
            let fields = map.keys().cloned().collect::<Vec<_>>().join(", ");
            let errors = match map.remove("errors") {
                Some(Value::Array(records)) => Some(records),
                // A bare error string in place of the record array.
                Some(Value::String(message)) => Some(vec![Value::String(message)]),
                Some(other) => {
                    tracing::warn!(kind = %json_kind(&other), "Ignoring 'errors' field that is neither array nor string");
                    None
                }
                None => None,
            };
            if map.contains_key("message") && errors.is_none() {
                return Ok(ResponseShape::Records(vec![Value::Object(map)]));
            }
            let tokens = take_token_source(&mut map);
            match (errors, tokens) {
                (Some(records), tokens) => Ok(ResponseShape::Report { records, tokens }),
                (None, Some(tokens)) => Ok(ResponseShape::Tokens(tokens)),
                (None, None) => Err(AnalysisError::Malformed(format!(
                    "object with fields [{fields}] matches no known response shape"
                ))),
            }
        }
        RawAnalysisResponse::Other(value) => Err(AnalysisError::Malformed(format!(
            "top-level {} is not a recognized response",
            json_kind(&value)
        ))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
