//! Uniform response envelopes.
//!
//! Success and failure envelopes are structurally parallel (`message` +
//! payload + `meta`), differing only in the payload field name (`data` vs
//! `error`), so a consumer can discriminate by field presence while the HTTP
//! status stays the authoritative signal. The metadata block carries the
//! request's correlation id and the emission timestamp.

use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::context;

/// Default message for success envelopes when the handler supplies none.
pub const SUCCESS_MESSAGE: &str = "Response fetched successfully";

/// Per-response metadata: correlation id and emission timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[cfg_attr(feature = "utoipa", schema(title = "ResponseMeta"))]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    /// Correlation id of the request this response answers, if a request
    /// scope was active.
    pub request_id: Option<String>,
    /// ISO-8601 instant captured when the envelope was built, i.e. at
    /// response emission, not request entry.
    pub timestamp: String,
}

impl ResponseMeta {
    /// Capture the current correlation id (null-tolerant) and timestamp.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            request_id: context::get().map(|id| id.as_str().to_owned()),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Success envelope: `{ message, data, meta }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[cfg_attr(feature = "utoipa", schema(title = "ApiResponse"))]
#[must_use]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: ResponseMeta,
}

impl<T> ApiResponse<T> {
    /// Build a success envelope, auto-populating `meta` from the correlation
    /// context.
    pub fn new(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            message: message.into(),
            data,
            meta: ResponseMeta::capture(),
        }
    }

    /// Success envelope with the default message.
    pub fn ok(data: Option<T>) -> Self {
        Self::new(SUCCESS_MESSAGE, data)
    }
}

/// Failure envelope: `{ message, error, meta }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[cfg_attr(feature = "utoipa", schema(title = "ApiFailure"))]
#[must_use]
pub struct ApiFailure {
    pub message: String,
    pub error: Option<serde_json::Value>,
    pub meta: ResponseMeta,
}

impl ApiFailure {
    pub fn new(message: impl Into<String>, error: Option<serde_json::Value>) -> Self {
        Self {
            message: message.into(),
            error,
            meta: ResponseMeta::capture(),
        }
    }
}

/// 200 OK + success envelope.
pub fn ok_json<T: Serialize>(message: impl Into<String>, data: Option<T>) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::new(message, data)))
}

/// 201 Created + success envelope.
pub fn created_json<T: Serialize>(
    message: impl Into<String>,
    data: Option<T>,
) -> impl IntoResponse {
    (StatusCode::CREATED, Json(ApiResponse::new(message, data)))
}

/// Success envelope with a caller-chosen 2xx status.
pub fn respond<T: Serialize>(
    status: StatusCode,
    message: impl Into<String>,
    data: Option<T>,
) -> impl IntoResponse {
    (status, Json(ApiResponse::new(message, data)))
}
