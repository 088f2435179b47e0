//! Normalization of classified replies into canonical diagnostics.

use serde_json::Value;

use lexlens_types::{Diagnostic, Severity, TokenCategory, TokenSummary};

use crate::error::AnalysisError;
use crate::response::{RawAnalysisResponse, ResponseShape, TokenSource, classify, json_kind};

/// Message the service uses to say "nothing to report".
pub const NO_ERRORS_SENTINEL: &str = "No errors found.";

/// Normalized result of one analysis round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    diagnostics: Vec<Diagnostic>,
    tokens: Option<TokenSummary>,
}

impl Analysis {
    #[must_use]
    pub fn new(diagnostics: Vec<Diagnostic>, tokens: Option<TokenSummary>) -> Self {
        Self {
            diagnostics,
            tokens,
        }
    }

    /// Diagnostics in the order the service reported them.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Token classification, when the reply carried one.
    #[must_use]
    pub fn tokens(&self) -> Option<&TokenSummary> {
        self.tokens.as_ref()
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<Diagnostic>, Option<TokenSummary>) {
        (self.diagnostics, self.tokens)
    }
}

/// Convert a raw reply into an ordered diagnostic list.
///
/// Fails only when the reply as a whole has no recognizable shape. Individual
/// records that cannot produce a message are skipped.
pub fn normalize(raw: RawAnalysisResponse) -> Result<Analysis, AnalysisError> {
    let analysis = match classify(raw)? {
        ResponseShape::Message(message) => Analysis::new(
            drop_sentinel(vec![Diagnostic::at_start(message)]),
            None,
        ),
        ResponseShape::Records(records) => Analysis::new(extract_diagnostics(&records), None),
        ResponseShape::Tokens(source) => Analysis::new(Vec::new(), Some(summarize(source))),
        ResponseShape::Report { records, tokens } => {
            Analysis::new(extract_diagnostics(&records), tokens.map(summarize))
        }
    };
    Ok(analysis)
}

fn extract_diagnostics(records: &[Value]) -> Vec<Diagnostic> {
    let diagnostics = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| record_to_diagnostic(index, record))
        .collect();
    drop_sentinel(diagnostics)
}

/// A lone sentinel diagnostic means zero diagnostics.
fn drop_sentinel(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    match diagnostics.as_slice() {
        [only] if only.message() == NO_ERRORS_SENTINEL => Vec::new(),
        _ => diagnostics,
    }
}

fn record_to_diagnostic(index: usize, record: &Value) -> Option<Diagnostic> {
    match record {
        Value::String(message) => Some(Diagnostic::at_start(unwrap_encoded_message(message))),
        Value::Object(fields) => {
            let Some(message) = fields.get("message").and_then(message_text) else {
                tracing::warn!(index, "Dropping diagnostic record without a usable message");
                return None;
            };
            let severity =
                Severity::from_message_type(fields.get("message_type").and_then(Value::as_str));
            Some(Diagnostic::new(
                severity,
                message,
                promote(fields.get("line")),
                promote(fields.get("column")),
            ))
        }
        other => {
            tracing::warn!(index, kind = json_kind(other), "Dropping non-record diagnostic entry");
            None
        }
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(message) => Some(unwrap_encoded_message(message)),
        Value::Array(items) => first_nested_message(items),
        Value::Number(_) | Value::Bool(_) => Some(display_value(value)),
        Value::Null | Value::Object(_) => None,
    }
}

fn first_nested_message(items: &[Value]) -> Option<String> {
    items
        .first()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Unwrap a message that is itself a JSON-encoded `[{"message": ...}]` array.
///
/// Anything that does not parse as such an array comes back verbatim.
fn unwrap_encoded_message(message: &str) -> String {
    match serde_json::from_str::<Value>(message) {
        Ok(Value::Array(items)) => {
            first_nested_message(&items).unwrap_or_else(|| message.to_string())
        }
        _ => message.to_string(),
    }
}

/// Promote a 0-based service coordinate to a 1-based one.
///
/// Missing, negative, or unparseable values are treated as 0.
fn promote(value: Option<&Value>) -> u32 {
    let zero_based = value
        .and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_f64().map(|f| f as i64))
                .or_else(|| v.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
        })
        .unwrap_or(0);
    let clamped = zero_based.clamp(0, i64::from(u32::MAX - 1));
    clamped as u32 + 1
}

fn summarize(source: TokenSource) -> TokenSummary {
    let mut summary = TokenSummary::new();
    match source {
        TokenSource::Stream(tokens) => {
            for token in &tokens {
                push_stream_token(&mut summary, token);
            }
        }
        TokenSource::Categories(fields) => {
            for (field, value) in &fields {
                if let Some(category) = TokenCategory::from_field(field) {
                    push_category(&mut summary, category, value);
                }
            }
        }
    }
    summary
}

fn push_stream_token(summary: &mut TokenSummary, token: &Value) {
    let Some(fields) = token.as_object() else {
        return;
    };
    let Some(lexeme) = fields.get("lexeme").and_then(Value::as_str) else {
        return;
    };
    let token_type = fields
        .get("token_type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let category = fields
        .get("token_global")
        .and_then(Value::as_str)
        .and_then(TokenCategory::from_token_global)
        .or_else(|| TokenCategory::from_token_type(token_type));

    match category {
        Some(TokenCategory::Literal) if !token_type.is_empty() => {
            summary.push(TokenCategory::Literal, format!("{lexeme}: {token_type}"));
        }
        Some(category) => summary.push(category, lexeme),
        None => {}
    }
}

fn push_category(summary: &mut TokenSummary, category: TokenCategory, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                summary.push(category, display_value(item));
            }
        }
        Value::Object(entries) => {
            for (name, item) in entries {
                summary.push(category, format!("{name}: {}", display_value(item)));
            }
        }
        Value::Null => {}
        scalar => summary.push(category, display_value(scalar)),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
