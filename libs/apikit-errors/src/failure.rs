//! The closed failure classification the translator dispatches over.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::app_error::AppError;

/// Individual structural violation for a specific input field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[cfg_attr(feature = "utoipa", schema(title = "FieldViolation"))]
pub struct FieldViolation {
    /// Field path, e.g. "email" or "user.email"
    pub field: String,
    /// Human-readable reason the field was rejected
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Structural/type failure of the caller's input, detected before business
/// logic runs. Always mapped to 422; the violation order is preserved on the
/// wire.
#[derive(Debug, Clone, Error)]
#[error("{} invalid field(s)", .violations.len())]
pub struct ValidationFailure {
    pub violations: Vec<FieldViolation>,
}

impl ValidationFailure {
    #[must_use]
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Single-violation convenience constructor.
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation::new(field, reason)],
        }
    }
}

/// Any failure application code can signal, as a closed sum.
///
/// The variant order is the dispatch precedence: a value carrying an
/// `AppError` takes the classified path even when its content describes a
/// validation problem, and `Internal` is the only reachable default. A
/// failure is constructed as exactly one variant, so nothing can escape
/// translation unhandled.
#[derive(Debug, Error)]
pub enum Failure {
    /// Expected, classified failure with its own code and status policy.
    #[error(transparent)]
    App(#[from] AppError),
    /// Request-shape validation failure, always 422.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    /// Anything else. Detail never reaches the wire body.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Failure {
    /// Wrap an arbitrary error as an unclassified failure.
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(anyhow::Error::new(err))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn fails_with_app_error() -> Result<(), Failure> {
        Err(AppError::not_found("User not found").with_code("USR_404"))?
    }

    fn fails_with_validation() -> Result<(), Failure> {
        Err(ValidationFailure::field("email", "must contain '@'"))?
    }

    fn fails_with_anyhow() -> Result<(), Failure> {
        Err(anyhow::anyhow!("division by zero"))?
    }

    #[test]
    fn question_mark_converts_all_categories() {
        assert!(matches!(fails_with_app_error(), Err(Failure::App(_))));
        assert!(matches!(
            fails_with_validation(),
            Err(Failure::Validation(_))
        ));
        assert!(matches!(fails_with_anyhow(), Err(Failure::Internal(_))));
    }

    #[test]
    fn validation_failure_preserves_order() {
        let v = ValidationFailure::new(vec![
            FieldViolation::new("name", "must not be empty"),
            FieldViolation::new("email", "must contain '@'"),
        ]);
        assert_eq!(v.violations.len(), 2);
        assert_eq!(v.violations[0].field, "name");
        assert_eq!(v.violations[1].field, "email");
    }

    #[test]
    fn violations_serialize_as_field_reason_pairs() {
        let json =
            serde_json::to_value(vec![FieldViolation::new("email", "must contain '@'")]).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "field": "email", "reason": "must contain '@'" }])
        );
    }

    #[test]
    fn display_is_transparent_for_app_errors() {
        let f = Failure::from(AppError::new("Invalid email").with_code("VAL_001"));
        assert_eq!(f.to_string(), "VAL_001: Invalid email");
    }
}
