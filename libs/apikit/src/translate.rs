//! Total failure translation.
//!
//! Every [`Failure`], known or not, maps to exactly one `(status, envelope)`
//! pair. The match is exhaustive over the closed classification, so
//! `Internal` is the only reachable default and nothing escapes untranslated.

use axum::http::StatusCode;
use serde_json::{Value, json};

use apikit_errors::Failure;

use crate::context::{self, RequestId};
use crate::response::ApiFailure;

/// Fixed summary for request-shape validation failures.
pub const VALIDATION_MESSAGE: &str = "Validation failed";

/// Fixed body message for unclassified failures. The real diagnostic goes to
/// the log only.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Translate a failure into the HTTP status and failure envelope to send.
///
/// Dispatch, in precedence order: classified application errors keep their
/// own status and `"<code>: <message>"` rendering; validation failures map to
/// 422 with the ordered per-field violations as detail; anything else maps to
/// 500 with a generic body while the original error is logged under the
/// current correlation id.
///
/// Meta is captured fresh on every call, so repeat translations within one
/// request scope differ only in timestamp, never in request id.
#[must_use]
pub fn translate(failure: &Failure) -> (StatusCode, ApiFailure) {
    match failure {
        Failure::App(e) => (
            e.status(),
            ApiFailure::new(e.rendered(), e.detail().cloned()),
        ),
        Failure::Validation(v) => {
            let violations = v
                .violations
                .iter()
                .map(|fv| json!({ "field": fv.field, "reason": fv.reason }))
                .collect::<Vec<_>>();
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiFailure::new(VALIDATION_MESSAGE, Some(Value::Array(violations))),
            )
        }
        Failure::Internal(e) => {
            tracing::error!(
                request_id = context::get()
                    .as_ref()
                    .map(RequestId::as_str)
                    .unwrap_or("n/a"),
                error = %e,
                "Unclassified failure"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiFailure::new(INTERNAL_MESSAGE, None),
            )
        }
    }
}
