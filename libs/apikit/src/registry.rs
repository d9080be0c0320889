//! Failure interceptor bindings for axum.
//!
//! Handlers return `Result<T, Rejection>` and the registry's layer stack
//! guarantees that whatever they fail with comes back to the caller as a
//! well-formed failure envelope carrying the request's correlation id. The
//! registry itself maps application-error codes to translator bindings, with
//! a fixed catch-all so dispatch is total.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{Next, from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId as HeaderRequestId, SetRequestIdLayer,
};

use apikit_errors::Failure;

use crate::context::{self, RequestId};
use crate::response::ApiFailure;
use crate::translate::translate;

/// Header carrying the correlation id between client, server and response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generates a uuid-v4 request id for requests arriving without one.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &http::Request<B>) -> Option<HeaderRequestId> {
        let id = RequestId::generate();
        HeaderValue::from_str(id.as_str())
            .ok()
            .map(HeaderRequestId::new)
    }
}

/// Boundary adapter turning a failure result into a wire response.
///
/// Any `AppError`, `ValidationFailure`, `anyhow::Error` or [`Failure`]
/// converts into this via `?`. Rendering uses the default translation policy,
/// so translation stays total even when no registry layer is installed; the
/// original failure rides along in the response extensions so an installed
/// [`HandlerRegistry`] can re-render classified failures with its own
/// bindings.
#[derive(Debug)]
pub struct Rejection(pub Failure);

impl<E> From<E> for Rejection
where
    E: Into<Failure>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Marker attached to responses produced from a [`Rejection`].
#[derive(Clone)]
pub struct FailureMarker(pub Arc<Failure>);

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let (status, body) = translate(&self.0);
        let mut resp = (status, Json(body)).into_response();
        resp.extensions_mut().insert(FailureMarker(Arc::new(self.0)));
        resp
    }
}

/// Translator binding: failure in, `(status, envelope)` out.
pub type Translator = Arc<dyn Fn(&Failure) -> (StatusCode, ApiFailure) + Send + Sync>;

/// Maps failure categories to translator bindings.
///
/// Bindings are keyed by application-error code; re-registering a code
/// replaces the prior binding (last registration wins), which lets callers
/// override the default status for a variant without touching the taxonomy.
/// The validation binding is overridable as a whole; the unclassified
/// catch-all is fixed so the confidentiality policy cannot be displaced.
#[derive(Clone, Default)]
#[must_use]
pub struct HandlerRegistry {
    by_code: HashMap<String, Translator>,
    validation: Option<Translator>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or replace) the translator for an application-error code.
    pub fn register<F>(&mut self, code: impl Into<String>, translator: F)
    where
        F: Fn(&Failure) -> (StatusCode, ApiFailure) + Send + Sync + 'static,
    {
        self.by_code.insert(code.into(), Arc::new(translator));
    }

    /// Replace the binding used for request-shape validation failures.
    pub fn register_validation<F>(&mut self, translator: F)
    where
        F: Fn(&Failure) -> (StatusCode, ApiFailure) + Send + Sync + 'static,
    {
        self.validation = Some(Arc::new(translator));
    }

    /// Total dispatch: every failure yields exactly one `(status, envelope)`.
    #[must_use]
    pub fn dispatch(&self, failure: &Failure) -> (StatusCode, ApiFailure) {
        match failure {
            Failure::App(e) => match self.by_code.get(e.code()) {
                Some(translator) => translator(failure),
                None => translate(failure),
            },
            Failure::Validation(_) => match &self.validation {
                Some(translator) => translator(failure),
                None => translate(failure),
            },
            // Fixed catch-all: generic 500, detail suppressed.
            Failure::Internal(_) => translate(failure),
        }
    }

    /// Install the registry's interceptor bindings on a router.
    ///
    /// Outermost to innermost: set `x-request-id` (inbound id preserved,
    /// uuid-v4 otherwise), propagate it to the response headers, enter the
    /// correlation scope for everything below, and re-render marked failure
    /// responses through [`dispatch`](Self::dispatch).
    pub fn apply(self, router: Router) -> Router {
        let registry = Arc::new(self);
        let header = HeaderName::from_static(REQUEST_ID_HEADER);
        router
            .layer(from_fn_with_state(registry, failure_mapping_middleware))
            .layer(from_fn(request_scope_middleware))
            .layer(PropagateRequestIdLayer::new(header.clone()))
            .layer(SetRequestIdLayer::new(header, MakeReqId))
    }
}

/// Enter the request's correlation scope, seeding it from `x-request-id`.
///
/// Under [`HandlerRegistry::apply`] the header is always present; standalone
/// use without the set-request-id layer still gets a generated id.
pub async fn request_scope_middleware(req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(RequestId::generate, RequestId::from);
    context::scope(Some(id), next.run(req)).await
}

/// Re-render failure responses through the registry's bindings.
///
/// Unclassified failures keep the response the default policy already
/// rendered (and logged); re-dispatching classified and validation failures
/// is a pure transformation, so an override observes the same request scope.
async fn failure_mapping_middleware(
    State(registry): State<Arc<HandlerRegistry>>,
    req: Request,
    next: Next,
) -> Response {
    let resp = next.run(req).await;
    let Some(marker) = resp.extensions().get::<FailureMarker>().cloned() else {
        return resp;
    };
    match marker.0.as_ref() {
        Failure::Internal(_) => resp,
        failure => {
            let (status, body) = registry.dispatch(failure);
            (status, Json(body)).into_response()
        }
    }
}
