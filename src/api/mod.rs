// HTTP API routes: retired pages and endpoints, trending topics, diagnostics.

pub mod retired;
pub mod trending;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::ad_sdk::AdSdkConfig;
use crate::metrics;
use crate::retirement::{RetirementMode, RetirementTable};
use crate::topics::{DiscoveryError, TopicDiscovery};

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub retirements: Arc<RetirementTable>,
    pub topics: Arc<dyn TopicDiscovery>,
    pub ad_sdk: Arc<AdSdkConfig>,
}

impl AppState {
    pub fn new(
        retirements: RetirementTable,
        topics: Arc<dyn TopicDiscovery>,
        ad_sdk: AdSdkConfig,
    ) -> Self {
        Self {
            retirements: Arc::new(retirements),
            topics,
            ad_sdk: Arc::new(ad_sdk),
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────

pub const GENERIC_ERROR_MESSAGE: &str = "An internal error occurred.";

/// Errors surfaced at the HTTP boundary. Every variant renders a JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),
    /// A collaborator failed.
    #[error("{0}")]
    Upstream(String),
    /// The endpoint was retired.
    #[error("{0}")]
    Deprecated(String),
    #[error("Not found")]
    NotFound,
}

impl From<DiscoveryError> for ApiError {
    fn from(e: DiscoveryError) -> Self {
        let message = e.to_string();
        if message.trim().is_empty() {
            ApiError::Upstream(GENERIC_ERROR_MESSAGE.to_string())
        } else {
            ApiError::Upstream(message)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => json_message(StatusCode::BAD_REQUEST, &msg),
            ApiError::Upstream(msg) => json_message(StatusCode::INTERNAL_SERVER_ERROR, &msg),
            ApiError::Deprecated(msg) => json_error(StatusCode::GONE, &msg),
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, "Not found"),
        }
    }
}

fn json_error(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "error": msg }))).into_response()
}

fn json_message(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "message": msg }))).into_response()
}

// ── Router ────────────────────────────────────────────────────────────

/// Routes without cross-cutting layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/api/retirements", get(list_retirements))
        .route("/api/trending-topics", post(trending::trending_topics))
        // Everything else is checked against the retirement table.
        .fallback(retired::dispatch)
        .with_state(state)
}

/// Full application: routes plus CORS and request metrics.
pub fn app(state: AppState) -> Router {
    router(state)
        .layer(axum::middleware::from_fn(track_metrics))
        .layer(CorsLayer::permissive())
}

async fn track_metrics(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| metrics::normalize_path(p.as_str()))
        .unwrap_or_else(|| "<fallback>".to_string());
    let start = Instant::now();

    let resp = next.run(req).await;

    metrics::observe_request(
        &method,
        &endpoint,
        resp.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    resp
}

// ── Diagnostics ──────────────────────────────────────────────────────

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "retired-routes-backend" }))
}

async fn get_metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

#[derive(Debug, Serialize)]
struct RetirementView<'a> {
    old_path: &'a str,
    mode: RetirementMode,
    replacement_path: Option<&'a str>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cycle: Option<String>,
}

async fn list_retirements(State(state): State<AppState>) -> impl IntoResponse {
    let table = &state.retirements;
    let views: Vec<RetirementView<'_>> = table
        .entries()
        .map(|entry| {
            let (final_destination, cycle) = match entry.mode {
                RetirementMode::GoneResponse => (None, None),
                RetirementMode::ClientRedirect => match table.resolve_chain(&entry.old_path) {
                    Ok(dest) => (Some(dest), None),
                    Err(e) => (None, Some(e.to_string())),
                },
            };
            RetirementView {
                old_path: &entry.old_path,
                mode: entry.mode,
                replacement_path: entry.replacement_path.as_deref(),
                message: &entry.message,
                final_destination,
                cycle,
            }
        })
        .collect();
    (StatusCode::OK, Json(json!(views))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_error_maps_to_upstream_message() {
        let err: ApiError = DiscoveryError::Other("boom".into()).into();
        assert!(matches!(err, ApiError::Upstream(ref m) if m == "boom"));

        let err: ApiError = DiscoveryError::Other(String::new()).into();
        assert!(matches!(err, ApiError::Upstream(ref m) if m == GENERIC_ERROR_MESSAGE));
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            ApiError::Validation("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Upstream("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Deprecated("x".into()).into_response().status(),
            StatusCode::GONE
        );
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
