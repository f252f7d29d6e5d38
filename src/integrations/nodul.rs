use async_trait::async_trait;

use super::webhook::post_json;
use super::{Delivery, DispatchError, Integration, IntegrationKind, LeadPayload};

/// Failure texts Nodul returns when the scenario behind a hook is not live.
const UNDEPLOYED_MARKERS: [&str; 2] = ["cant find webhook", "deployed scenario to prod"];

pub struct NodulIntegration {
    client: reqwest::Client,
}

impl NodulIntegration {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Integration for NodulIntegration {
    fn kind(&self) -> IntegrationKind {
        IntegrationKind::Nodul
    }

    fn name(&self) -> &str {
        "Nodul"
    }

    async fn deliver(&self, url: &str, payload: &LeadPayload) -> Result<Delivery, DispatchError> {
        let body = serde_json::to_value(payload)
            .map_err(|e| DispatchError::Transport(format!("payload encoding failed: {e}")))?;
        forward(&self.client, url, &body).await
    }
}

/// Forward `body` unchanged to a Nodul hook, turning its "scenario not deployed"
/// answers into [`DispatchError::NodulScenarioNotDeployed`].
pub async fn forward(
    client: &reqwest::Client,
    url: &str,
    body: &serde_json::Value,
) -> Result<Delivery, DispatchError> {
    post_json(client, url, body).await.map_err(|err| {
        let text = match &err {
            DispatchError::Status { body, .. } => body.as_str(),
            DispatchError::Transport(msg) => msg.as_str(),
            _ => "",
        };
        if is_undeployed_scenario(text) {
            DispatchError::NodulScenarioNotDeployed
        } else {
            err
        }
    })
}

pub fn is_undeployed_scenario(text: &str) -> bool {
    let text = text.to_lowercase();
    UNDEPLOYED_MARKERS.iter().any(|m| text.contains(m))
}
