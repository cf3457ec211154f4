// Handlers for retired pages (placeholder + one-shot redirect) and retired endpoints (410).

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};

use super::{ApiError, AppState};
use crate::metrics;
use crate::placeholder::Placeholder;
use crate::retirement::{RetirementMode, RouteRetirementEntry};

/// Fallback for every path without a live route.
///
/// Retired endpoints answer `410 Gone` for any method without reading the
/// body. Retired pages answer `GET`/`HEAD` with the redirect placeholder.
pub async fn dispatch(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let Some(entry) = state.retirements.lookup(uri.path()) else {
        return ApiError::NotFound.into_response();
    };

    metrics::RETIRED_ROUTE_HITS_TOTAL
        .with_label_values(&[entry.mode.as_str(), &entry.old_path])
        .inc();

    match entry.mode {
        RetirementMode::GoneResponse => gone(entry, &method),
        RetirementMode::ClientRedirect => {
            if method == Method::GET || method == Method::HEAD {
                placeholder_page(entry, &state)
            } else {
                (
                    StatusCode::METHOD_NOT_ALLOWED,
                    [(header::ALLOW, "GET, HEAD")],
                )
                    .into_response()
            }
        }
    }
}

fn gone(entry: &RouteRetirementEntry, method: &Method) -> Response {
    tracing::info!(path = %entry.old_path, %method, "request to retired endpoint");
    ApiError::Deprecated(entry.message.clone()).into_response()
}

fn placeholder_page(entry: &RouteRetirementEntry, state: &AppState) -> Response {
    tracing::info!(
        path = %entry.old_path,
        destination = entry.destination(),
        "serving retired page placeholder"
    );
    let html = Placeholder::for_entry(entry, &state.ad_sdk).render();
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, "no-store")],
        Html(html),
    )
        .into_response()
}
