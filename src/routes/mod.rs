pub mod integrations;
pub mod leads;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Integration settings
        .route(
            "/api/v1/integrations",
            get(integrations::get).put(integrations::update),
        )
        .route(
            "/api/v1/nodul/proxy",
            post(integrations::nodul_proxy).options(preflight),
        )
        .route("/api/v1/integrations/{kind}/test", post(integrations::test))
}

pub fn lead_routes() -> Router<SharedState> {
    Router::new().route("/api/v1/leads", post(leads::create).options(preflight))
}

/// Origin to echo back: `*` when nothing is configured, the caller's origin
/// when it is on the list, otherwise the first configured origin.
pub fn cors_origin(state: &SharedState, headers: &HeaderMap) -> String {
    let allowed = &state.config.cors_origins;
    if allowed.is_empty() {
        return "*".to_string();
    }

    let origin = headers.get("origin").and_then(|v| v.to_str().ok());
    match origin {
        Some(o) if allowed.iter().any(|a| a == o) => o.to_string(),
        _ => allowed[0].clone(),
    }
}

pub fn with_cors(mut response: Response, state: &SharedState, headers: &HeaderMap) -> Response {
    if let Ok(value) = HeaderValue::from_str(&cors_origin(state, headers)) {
        response
            .headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    response
}

pub async fn preflight(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    (
        [
            ("Access-Control-Allow-Origin", cors_origin(&state, &headers)),
            ("Access-Control-Allow-Methods", "POST, OPTIONS".to_string()),
            (
                "Access-Control-Allow-Headers",
                "Content-Type, Authorization".to_string(),
            ),
            ("Access-Control-Max-Age", "86400".to_string()),
        ],
        StatusCode::NO_CONTENT,
    )
        .into_response()
}
