//! Core error types for the apikit toolkit
//!
//! This crate provides pure data types for failure classification, with no
//! dependencies on HTTP frameworks. It includes:
//! - Application errors with a stable code and HTTP status (`AppError`)
//! - Structural input-validation failures (`ValidationFailure`)
//! - The closed classification the translator dispatches over (`Failure`)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod app_error;
pub mod failure;

// Re-export commonly used types
pub use app_error::AppError;
pub use failure::{Failure, FieldViolation, ValidationFailure};
