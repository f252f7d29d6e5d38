use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::AppError;
use crate::form::{ContactForm, SubmitOutcome};
use crate::routes::with_cors;
use crate::state::SharedState;
use crate::submission::{metadata, parser};

pub async fn create(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let response = match submit(&state, addr, &headers, body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };
    with_cors(response, &state, &headers)
}

async fn submit(
    state: &SharedState,
    addr: SocketAddr,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let raw = parser::parse_lead(headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let meta = metadata::extract(headers, Some(addr.ip()), &state.config.trusted_proxies);
    tracing::debug!("Lead submission from {} ({})", meta.ip, meta.user_agent);

    let mut form = ContactForm::from_input(&raw);
    match form.submit(&state.leads, &meta.ip, meta.website).await {
        SubmitOutcome::Accepted(submitted) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "status": "created",
                "lead_id": submitted.record.id,
            })),
        )
            .into_response()),
        SubmitOutcome::Invalid(errors) => Err(AppError::Validation(errors)),
        SubmitOutcome::Throttled(retry_after) => {
            let notice = form
                .notice()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "Too many attempts".to_string());
            Err(AppError::RateLimited {
                message: notice,
                retry_after_secs: retry_after.as_secs().max(1),
            })
        }
        SubmitOutcome::Failed(message) => Err(AppError::Unavailable(message)),
        SubmitOutcome::Ignored => Err(AppError::Internal(
            "Fresh contact form was not editable".to_string(),
        )),
    }
}
