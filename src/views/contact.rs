use std::net::SocketAddr;

use askama::Template;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::form::{ContactForm, FormState, SubmitOutcome};
use crate::state::SharedState;
use crate::submission::{metadata, parser};

#[derive(Template)]
#[template(path = "contact.html")]
struct ContactTemplate {
    source: String,
    name: String,
    phone: String,
    social: String,
    name_error: String,
    phone_error: String,
    social_error: String,
    banner: String,
    success: bool,
    failed: bool,
}

impl ContactTemplate {
    fn from_form(form: &ContactForm, source: &str) -> Self {
        let error = |field: &str| form.errors().get(field).cloned().unwrap_or_default();

        let (banner, success, failed) = match form.state() {
            FormState::Success { .. } => (String::new(), true, false),
            FormState::Error { message } => (message.clone(), false, true),
            _ => (
                form.notice().map(|n| n.to_string()).unwrap_or_default(),
                false,
                false,
            ),
        };

        Self {
            source: source.to_string(),
            name: form.input().name.clone(),
            phone: form.input().phone.clone(),
            social: form.input().social.clone(),
            name_error: error("name"),
            phone_error: error("phone"),
            social_error: error("social"),
            banner,
            success,
            failed,
        }
    }
}

fn render(form: &ContactForm, source: &str, status: StatusCode) -> Response {
    let template = ContactTemplate::from_form(form, source);
    (status, Html(template.render().unwrap_or_default())).into_response()
}

pub async fn page(State(state): State<SharedState>) -> Response {
    render(&ContactForm::new(), &state.config.lead.source, StatusCode::OK)
}

pub async fn submit(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let source = &state.config.lead.source;

    let raw = match parser::parse_lead(&headers, body).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!("Unreadable contact form post: {e}");
            return render(&ContactForm::new(), source, StatusCode::BAD_REQUEST);
        }
    };

    let meta = metadata::extract(&headers, Some(addr.ip()), &state.config.trusted_proxies);

    let mut form = ContactForm::from_input(&raw);
    let status = match form.submit(&state.leads, &meta.ip, meta.website).await {
        SubmitOutcome::Accepted(_) => StatusCode::OK,
        SubmitOutcome::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SubmitOutcome::Throttled(_) => StatusCode::TOO_MANY_REQUESTS,
        SubmitOutcome::Failed(_) => StatusCode::SERVICE_UNAVAILABLE,
        SubmitOutcome::Ignored => StatusCode::CONFLICT,
    };

    render(&form, source, status)
}
