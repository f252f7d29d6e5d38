use async_trait::async_trait;
use serde::Serialize;

use super::{Delivery, DispatchError, Integration, IntegrationKind, LeadPayload};

const MAX_RESPONSE_BODY: usize = 1024;

/// Plain JSON POST target. Serves both the generic webhook and Zapier catch hooks.
pub struct JsonWebhook {
    kind: IntegrationKind,
    name: &'static str,
    client: reqwest::Client,
}

impl JsonWebhook {
    pub fn generic(client: reqwest::Client) -> Self {
        Self {
            kind: IntegrationKind::Webhook,
            name: "Webhook",
            client,
        }
    }

    pub fn zapier(client: reqwest::Client) -> Self {
        Self {
            kind: IntegrationKind::Zapier,
            name: "Zapier",
            client,
        }
    }
}

#[async_trait]
impl Integration for JsonWebhook {
    fn kind(&self) -> IntegrationKind {
        self.kind
    }

    fn name(&self) -> &str {
        self.name
    }

    async fn deliver(&self, url: &str, payload: &LeadPayload) -> Result<Delivery, DispatchError> {
        post_json(&self.client, url, payload).await
    }
}

/// Single POST with a JSON body. No retry; anything but 2xx is an error.
pub async fn post_json<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    body: &T,
) -> Result<Delivery, DispatchError> {
    let resp = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| DispatchError::Transport(format!("request to {url} failed: {e}")))?;

    let status_code = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_RESPONSE_BODY)
        .collect::<String>();

    if (200..300).contains(&status_code) {
        Ok(Delivery { status_code, body })
    } else {
        Err(DispatchError::Status { status_code, body })
    }
}
