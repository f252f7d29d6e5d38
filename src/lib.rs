pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod form;
pub mod integrations;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod settings;
pub mod state;
pub mod store;
pub mod submission;
pub mod validate;
pub mod views;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::email::LeadMailer;
use crate::form::LeadService;
use crate::integrations::Dispatcher;
use crate::rate_limit::SlidingWindowLimiter;
use crate::settings::SettingsStore;
use crate::state::{AppState, SharedState};
use crate::store::LeadStore;

/// Wire the collaborators into shared state. Stores and limiter are passed
/// in so tests can substitute in-memory versions and a manual clock.
pub fn build_state(
    config: Config,
    store: Arc<dyn LeadStore>,
    settings: Arc<dyn SettingsStore>,
    limiter: Arc<SlidingWindowLimiter>,
) -> Result<SharedState, String> {
    let dispatcher = Arc::new(
        Dispatcher::new(Duration::from_secs(config.lead.webhook_timeout_secs))
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?,
    );

    let mut leads = LeadService::new(
        limiter.clone(),
        store,
        settings.clone(),
        dispatcher.clone(),
        config.lead.clone(),
    );

    if let Some(smtp) = config.smtp.as_ref() {
        match LeadMailer::new(smtp) {
            Ok(mailer) => {
                tracing::info!("Lead notification email configured");
                leads = leads.with_mailer(Arc::new(mailer));
            }
            Err(e) => {
                tracing::warn!("Lead notification email not available: {e}");
            }
        }
    }

    Ok(Arc::new(AppState {
        config,
        leads,
        settings,
        dispatcher,
        limiter,
    }))
}

pub fn build_app(state: SharedState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::api_routes())
        .merge(routes::lead_routes())
        .merge(views::view_routes())
        .nest_service("/static", ServeDir::new("static"))
        .route("/health", axum::routing::get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body_size)),
        )
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

/// Periodically drop limiter keys whose attempts have all aged out.
pub fn spawn_limiter_cleanup(state: SharedState, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            state.limiter.cleanup(state.leads.window());
            tracing::debug!("Rate limiter tracking {} keys", state.limiter.tracked_keys());
        }
    })
}

async fn health() -> &'static str {
    "ok"
}
