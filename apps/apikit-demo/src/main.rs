//! Demo HTTP server exercising the apikit toolkit end to end: correlation
//! ids, uniform envelopes and total failure translation over a handful of
//! illustrative routes.

use std::path::PathBuf;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use clap::Parser;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use apikit::{
    AppConfig, HandlerRegistry, REQUEST_ID_HEADER, Rejection, init_logging,
    response::{ApiResponse, ok_json},
};
use apikit_errors::{AppError, FieldViolation, ValidationFailure};

/// apikit demo server
#[derive(Parser)]
#[command(name = "apikit-demo")]
#[command(about = "Demo server for the apikit error/response toolkit")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address override (overrides config)
    #[arg(short, long)]
    bind: Option<String>,
}

async fn get_user(Path(id): Path<u64>) -> Result<impl IntoResponse, Rejection> {
    if id == 0 {
        Err(AppError::not_found("User not found").with_code("USR_404"))?;
    }
    tracing::info!(user_id = id, "User looked up");
    Ok(ok_json(
        "User retrieved successfully",
        Some(json!({ "user_id": id })),
    ))
}

async fn create_user(Json(body): Json<Value>) -> Result<impl IntoResponse, Rejection> {
    let mut violations = Vec::new();
    if body
        .get("name")
        .and_then(Value::as_str)
        .is_none_or(str::is_empty)
    {
        violations.push(FieldViolation::new("name", "must not be empty"));
    }
    if !body
        .get("email")
        .and_then(Value::as_str)
        .is_some_and(|e| e.contains('@'))
    {
        violations.push(FieldViolation::new("email", "must contain '@'"));
    }
    if !violations.is_empty() {
        Err(ValidationFailure::new(violations))?;
    }
    if body.get("name").and_then(Value::as_str) == Some("admin") {
        Err(AppError::conflict("User already exists").with_code("USR_409"))?;
    }
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("User created", Some(body))),
    ))
}

/// Deliberately unclassified fault: shows up as a generic 500 on the wire
/// while the real diagnostic lands in the log under the request id.
async fn boom() -> Result<&'static str, Rejection> {
    let denominator = 0u64;
    let _ = 1u64
        .checked_div(denominator)
        .ok_or_else(|| anyhow::anyhow!("division by zero"))?;
    Ok("unreachable")
}

fn build_router() -> Router {
    let mut registry = HandlerRegistry::new();
    // Teapots, not conflicts, for duplicate resources.
    registry.register("USR_409", |f| {
        let (_, body) = apikit::translate(f);
        (StatusCode::IM_A_TEAPOT, body)
    });

    // Registered before the registry layers, so the span opens inside the
    // request scope with the id header already set.
    let router = Router::new()
        .route("/users/{id}", get(get_user))
        .route("/users", post(create_user))
        .route("/boom", get(boom))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http().make_span_with(
            |req: &axum::http::Request<axum::body::Body>| {
                let rid = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    request_id = %rid,
                )
            },
        ));

    registry.apply(router)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }

    let _guard = init_logging(&config.logging)?;
    tracing::debug!("Effective configuration:\n{config:#?}");

    let app = build_router();
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!("HTTP server bound on {}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await?;

    Ok(())
}
