//! Request-scoped error classification and response normalization for axum
//! services.
//!
//! Every inbound request gets a correlation id that flows through application
//! code, log records and the response body; every failure, classified or not,
//! comes back to the caller as a uniform envelope with a valid HTTP status
//! and no leaked internals.
//!
//! Typical wiring:
//!
//! ```no_run
//! use apikit::{HandlerRegistry, Rejection};
//! use apikit_errors::AppError;
//! use axum::{Router, routing::get};
//!
//! async fn user() -> Result<&'static str, Rejection> {
//!     Err(AppError::not_found("User not found").with_code("USR_404"))?
//! }
//!
//! let router = Router::new().route("/user", get(user));
//! let app = HandlerRegistry::new().apply(router);
//! # let _ = app;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod context;
pub mod logging;
pub mod registry;
pub mod response;
pub mod translate;

// Re-export commonly used types
pub use apikit_errors::{AppError, Failure, FieldViolation, ValidationFailure};
pub use config::AppConfig;
pub use context::RequestId;
pub use logging::{LoggingConfig, init_logging};
pub use registry::{HandlerRegistry, REQUEST_ID_HEADER, Rejection};
pub use response::{ApiFailure, ApiResponse, ResponseMeta};
pub use translate::translate;
