//! Classified application errors carrying a stable code and HTTP status.

use std::fmt;

use http::StatusCode;

/// An expected, classified failure raised intentionally by application code.
///
/// Every instance fixes its human-readable message, machine-readable code and
/// HTTP status at construction time; there are no setters. The canonical
/// constructors (`not_found`, `conflict`, ...) fix the status policy of a
/// variant, while `with_code` attaches the application's categorization token
/// (e.g. `"VAL_001"`).
///
/// Two errors with identical content are still distinct events, so the type
/// deliberately implements no equality.
#[derive(Debug, Clone)]
#[must_use]
pub struct AppError {
    message: String,
    code: String,
    status: StatusCode,
    detail: Option<serde_json::Value>,
}

impl AppError {
    /// Create a new error with an empty code and status 400.
    ///
    /// Client-input failures are the dominant expected case, hence the 400
    /// default.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: String::new(),
            status: StatusCode::BAD_REQUEST,
            detail: None,
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message)
    }

    /// 401 Unauthorized.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message).with_status(StatusCode::UNAUTHORIZED)
    }

    /// 403 Forbidden.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(message).with_status(StatusCode::FORBIDDEN)
    }

    /// 404 Not Found.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message).with_status(StatusCode::NOT_FOUND)
    }

    /// 409 Conflict.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(message).with_status(StatusCode::CONFLICT)
    }

    /// 500 Internal Server Error, for classified server-side conditions the
    /// caller is allowed to see (unclassified faults go through `Failure::Internal`).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message).with_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Attach structured detail that is safe to expose on the wire.
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn detail(&self) -> Option<&serde_json::Value> {
        self.detail.as_ref()
    }

    /// The message a consumer sees: `"<code>: <message>"` when a code is
    /// present, otherwise the message alone.
    #[must_use]
    pub fn rendered(&self) -> String {
        if self.code.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.code, self.message)
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for AppError {}
