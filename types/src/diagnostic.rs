//! Canonical diagnostics and the editor markers derived from them.

use std::path::Path;

use serde::Serialize;

/// Severity level for a diagnostic.
///
/// Closed two-valued classification: anything the service does not explicitly
/// call a warning is an error, so unknown values are never silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Classify the service's `message_type` field.
    #[must_use]
    pub fn from_message_type(value: Option<&str>) -> Self {
        match value {
            Some("Warning") => Self::Warning,
            _ => Self::Error,
        }
    }

    #[must_use]
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A single normalized diagnostic.
///
/// Positions are 1-based. Construction clamps both coordinates to at least 1,
/// so a `Diagnostic` with a zero line or column cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    line: u32,
    column: u32,
    severity: Severity,
    message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            line: line.max(1),
            column: column.max(1),
            severity,
            message: message.into(),
        }
    }

    /// An error pinned to the start of the buffer (1:1).
    #[must_use]
    pub fn at_start(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message, 1, 1)
    }

    /// 1-based line number.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-based column.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Format as `path:line:col: severity: message`.
    #[must_use]
    pub fn display_with_path(&self, path: &Path) -> String {
        format!(
            "{}:{}:{}: {}: {}",
            path.display(),
            self.line,
            self.column,
            self.severity.label(),
            self.message,
        )
    }
}

/// Editor-surface decoration for one diagnostic.
///
/// The pipeline always produces single-point ranges (`start == end`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub severity: Severity,
    pub message: String,
}

impl From<&Diagnostic> for Marker {
    fn from(diag: &Diagnostic) -> Self {
        Self {
            start_line: diag.line,
            start_column: diag.column,
            end_line: diag.line,
            end_column: diag.column,
            severity: diag.severity,
            message: diag.message.clone(),
        }
    }
}

/// Compact status string like "E:3 W:5". Empty when there is nothing to report.
#[must_use]
pub fn status_string(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return String::new();
    }
    let errors = diagnostics.iter().filter(|d| d.severity.is_error()).count();
    format!("E:{} W:{}", errors, diagnostics.len() - errors)
}
