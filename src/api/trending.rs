// Trending topics: validate the platform and hand off to the topic-discovery flow.

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;

use super::{ApiError, AppState};
use crate::metrics;

pub const PLATFORM_REQUIRED: &str = "Platform is required.";

/// Extract a non-empty `platform` string from a raw JSON body.
fn parse_platform(body: &[u8]) -> Result<String, ApiError> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("platform"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .ok_or_else(|| ApiError::Validation(PLATFORM_REQUIRED.to_string()))
}

pub async fn trending_topics(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let platform = match parse_platform(&body) {
        Ok(p) => p,
        Err(e) => {
            metrics::TRENDING_TOPIC_REQUESTS_TOTAL
                .with_label_values(&["invalid"])
                .inc();
            return Err(e);
        }
    };

    match state.topics.discover(&platform).await {
        Ok(topics) => {
            metrics::TRENDING_TOPIC_REQUESTS_TOTAL
                .with_label_values(&["ok"])
                .inc();
            Ok((StatusCode::OK, Json(topics)))
        }
        Err(e) => {
            tracing::error!(%platform, "topic discovery failed: {e}");
            metrics::TRENDING_TOPIC_REQUESTS_TOTAL
                .with_label_values(&["error"])
                .inc();
            Err(e.into())
        }
    }
}
