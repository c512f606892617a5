//! Provider error types and host-visible diagnostics.

use serde::Serialize;
use thiserror::Error;

/// Provider result type alias
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors raised while reconciling a resource against the Nexus server.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The server reported 404 for a resource the operation expected to exist.
    #[error("Resource gone: {0}")]
    Gone(String),

    /// The declared configuration is invalid, either pre-flight or as
    /// rejected by the server (400/422).
    #[error("Validation error{}: {message}", .path.as_deref().map(|p| format!(" at {p}")).unwrap_or_default())]
    Validation {
        /// Attribute path the problem is attributable to, when known
        /// (e.g. `group.member_names`).
        path: Option<String>,
        message: String,
    },

    /// The server reported 409 on create (name already exists).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Connection, TLS, or deserialization failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A non-success status outside the taxonomy; body carried verbatim.
    #[error("Unexpected response: HTTP {status}: {body}")]
    Unexpected { status: u16, body: String },

    /// The server acknowledged an operation and then contradicted it
    /// (e.g. created a repository it cannot read back).
    #[error("Inconsistent server state: {0}")]
    Inconsistent(String),

    /// The host cancelled the operation.
    #[error("Operation cancelled by host")]
    Cancelled,
}

impl ProviderError {
    /// Pre-flight validation error attached to an attribute path.
    pub fn validation_at(path: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Validation {
            path: Some(path.into()),
            message: message.into(),
        }
    }

    /// Pre-flight validation error with no attributable path.
    pub fn validation(message: impl Into<String>) -> Self {
        ProviderError::Validation {
            path: None,
            message: message.into(),
        }
    }

    /// True when the error means "the resource no longer exists server-side".
    pub fn is_gone(&self) -> bool {
        matches!(self, ProviderError::Gone(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Transport(format!("failed to decode response: {e}"))
    }
}

/// Classify a non-success HTTP response into the error taxonomy.
///
/// `context` names the object the operation was acting on; it ends up in the
/// diagnostic detail line together with the status and body.
pub fn classify_status(status: u16, body: &str, context: &str) -> ProviderError {
    match status {
        404 => ProviderError::Gone(context.to_string()),
        400 | 422 => ProviderError::Validation {
            path: None,
            message: format!("{context}: HTTP {status}: {body}"),
        },
        409 => ProviderError::Conflict(format!("{context}: {body}")),
        _ => ProviderError::Unexpected {
            status,
            body: body.to_string(),
        },
    }
}

/// Diagnostic severity, as the host protocol distinguishes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One host-visible diagnostic record.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_path: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute_path: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute_path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.attribute_path = Some(path.into());
        self
    }
}

/// Collection of diagnostics produced by one lifecycle call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, d: Diagnostic) {
        self.0.push(d);
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Translate an error into the diagnostic the host sees.
///
/// `summary` is the operation framing, e.g. "Error creating maven2 hosted
/// repository". Validation errors keep their attribute path.
pub fn error_diagnostic(err: &ProviderError, summary: &str) -> Diagnostic {
    let mut diag = Diagnostic::error(summary, err.to_string());
    if let ProviderError::Validation { path: Some(p), .. } = err {
        diag = diag.with_path(p.clone());
    }
    diag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status_maps_taxonomy() {
        assert!(matches!(
            classify_status(404, "", "repo x"),
            ProviderError::Gone(_)
        ));
        assert!(matches!(
            classify_status(400, "bad storage", "repo x"),
            ProviderError::Validation { .. }
        ));
        assert!(matches!(
            classify_status(422, "bad field", "repo x"),
            ProviderError::Validation { .. }
        ));
        assert!(matches!(
            classify_status(409, "exists", "repo x"),
            ProviderError::Conflict(_)
        ));
    }

    #[test]
    fn test_classify_status_unexpected_carries_body_verbatim() {
        let err = classify_status(503, "maintenance window", "repo x");
        match err {
            ProviderError::Unexpected { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance window");
            }
            other => panic!("expected Unexpected, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_display_names_the_attribute() {
        let err = ProviderError::validation_at("storage.write_policy", "is required");
        assert_eq!(
            err.to_string(),
            "Validation error at storage.write_policy: is required"
        );
        let pathless = ProviderError::validation("invalid plan");
        assert_eq!(pathless.to_string(), "Validation error: invalid plan");
    }

    #[test]
    fn test_error_diagnostic_keeps_attribute_path() {
        let err = ProviderError::validation_at("group.member_names", "must not be empty");
        let diag = error_diagnostic(&err, "Error creating npm group repository");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.attribute_path.as_deref(), Some("group.member_names"));
        assert!(diag.detail.contains("must not be empty"));
    }
}
