//! HTTP boundary: the location endpoint plus liveness probe
//!
//! `GET /location` runs one evaluation with a fresh connector and returns
//! the report as JSON. Every response carries a CORS allow-origin header.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use homeward_core::Error;
use homeward_egress::{TractiveConfig, TractiveConnector};
use homeward_evaluator::{evaluate, EvalConfig};
use std::sync::Arc;
use tracing::warn;

/// Shared state for the location routes
#[derive(Clone)]
pub struct AppState {
    pub eval_config: Arc<EvalConfig>,
    pub tractive_config: TractiveConfig,
}

impl AppState {
    pub fn new(eval_config: EvalConfig, tractive_config: TractiveConfig) -> Self {
        Self {
            eval_config: Arc::new(eval_config),
            tractive_config,
        }
    }
}

/// Create the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/location", get(location))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

/// Liveness probe handler
async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run one evaluation and serialize the report.
///
/// The connector is per-request: the session token lives for exactly one
/// invocation.
async fn location(State(state): State<AppState>) -> Response {
    let connector = match TractiveConnector::new(state.tractive_config.clone()) {
        Ok(connector) => connector,
        Err(e) => return error_response(e),
    };

    match evaluate(&connector, &state.eval_config).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: Error) -> Response {
    let status = match &err {
        Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        // Everything upstream-shaped: auth, transport, missing location
        _ => StatusCode::BAD_GATEWAY,
    };

    warn!("Evaluation failed: {}", err);

    (
        status,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}

/// Middleware for CORS headers
pub async fn cors_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        header::HeaderValue::from_static("*"),
    );

    response
}
