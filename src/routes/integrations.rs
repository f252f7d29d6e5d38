use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::Operator;
use crate::error::AppError;
use crate::integrations::{DispatchError, IntegrationKind, nodul};
use crate::routes::with_cors;
use crate::settings::{self, IntegrationSettings};
use crate::state::SharedState;

fn describe(state: &SharedState, settings: &IntegrationSettings) -> serde_json::Value {
    let integrations: Vec<serde_json::Value> = state
        .dispatcher
        .registry()
        .list()
        .iter()
        .map(|i| {
            let url = settings.url_for(i.kind());
            json!({
                "id": i.kind().id(),
                "name": i.name(),
                "settings_key": i.kind().settings_key(),
                "url": url,
                "enabled": !url.is_empty(),
            })
        })
        .collect();

    json!({ "settings": settings, "integrations": integrations })
}

pub async fn get(
    _operator: Operator,
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let settings = state.settings.load().await?;
    Ok(Json(describe(&state, &settings)))
}

pub async fn update(
    _operator: Operator,
    State(state): State<SharedState>,
    Json(req): Json<IntegrationSettings>,
) -> Result<Json<serde_json::Value>, AppError> {
    let settings = req.normalized()?;
    state.settings.save(&settings).await?;

    tracing::info!(
        "Integration settings updated ({} enabled)",
        settings.configured().len()
    );
    Ok(Json(describe(&state, &settings)))
}

#[derive(Debug, Default, Deserialize)]
pub struct TestRequest {
    pub url: Option<String>,
}

/// Send the synthetic lead to one integration, either to the URL in the body
/// or to the stored one.
pub async fn test(
    _operator: Operator,
    State(state): State<SharedState>,
    Path(kind): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let kind = IntegrationKind::from_id(&kind)
        .ok_or_else(|| AppError::NotFound(format!("Unknown integration: {kind}")))?;

    let req: TestRequest = if body.is_empty() {
        TestRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(format!("Invalid JSON: {e}")))?
    };

    let url = match req.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
        Some(url) => url,
        None => state.settings.load().await?.url_for(kind).to_string(),
    };
    if !url.is_empty() {
        settings::check_url(kind.settings_key(), &url)?;
    }

    let lead = state.leads.config();
    match state.dispatcher.test(kind, &url, &lead.source, &lead.course).await {
        Ok(delivery) => Ok(Json(json!({
            "status": "delivered",
            "message": "Test lead delivered",
            "status_code": delivery.status_code,
        }))),
        Err(e @ DispatchError::NotConfigured(_)) => Err(AppError::BadRequest(e.to_string())),
        Err(e) => Err(AppError::BadGateway(e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct ProxyRequest {
    pub webhook_url: String,
    pub payload: serde_json::Value,
}

/// Forward a body to a Nodul hook on behalf of a browser-hosted caller.
///
/// Rejections are answered here rather than by the extractors so that auth
/// and body errors still carry the CORS header.
pub async fn nodul_proxy(
    operator: Result<Operator, AppError>,
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<ProxyRequest>, JsonRejection>,
) -> Response {
    let result = async {
        operator?;
        let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
        let url = req.webhook_url.trim();
        settings::check_url("webhook_url", url)?;

        let delivery = nodul::forward(state.dispatcher.client(), url, &req.payload)
            .await
            .map_err(|e| AppError::BadGateway(e.to_string()))?;

        Ok::<_, AppError>(
            (
                StatusCode::OK,
                Json(json!({
                    "status": "delivered",
                    "status_code": delivery.status_code,
                    "body": delivery.body,
                })),
            )
                .into_response(),
        )
    }
    .await;

    let response = result.unwrap_or_else(|e| e.into_response());
    with_cors(response, &state, &headers)
}
