use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use crate::auth::token;
use crate::error::AppError;
use crate::state::SharedState;

/// Caller holding the operator token; required for integration settings.
#[derive(Debug, Clone)]
pub struct Operator;

impl FromRequestParts<SharedState> for Operator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.operator_token_sha256.as_deref() else {
            return Err(AppError::Forbidden(
                "Operator API is disabled".to_string(),
            ));
        };

        let bearer = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|v| v.trim().to_string());

        let presented = bearer.or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get("operator_token")
                .map(|c| c.value().to_string())
        });

        let Some(presented) = presented else {
            return Err(AppError::Unauthorized(
                "Missing operator token".to_string(),
            ));
        };

        if token::verify_token(&presented, expected) {
            Ok(Operator)
        } else {
            Err(AppError::Unauthorized("Invalid operator token".to_string()))
        }
    }
}
