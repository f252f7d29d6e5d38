use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::nodul::NodulIntegration;
use super::webhook::JsonWebhook;
use super::{Delivery, DispatchError, IntegrationKind, IntegrationRegistry, LeadPayload};
use crate::settings::IntegrationSettings;

/// Fans a lead out to every configured integration.
pub struct Dispatcher {
    registry: IntegrationRegistry,
    client: reqwest::Client,
}

impl Dispatcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let mut registry = IntegrationRegistry::new();
        registry.register(Arc::new(JsonWebhook::generic(client.clone())));
        registry.register(Arc::new(JsonWebhook::zapier(client.clone())));
        registry.register(Arc::new(NodulIntegration::new(client.clone())));

        Ok(Self { registry, client })
    }

    pub fn registry(&self) -> &IntegrationRegistry {
        &self.registry
    }

    /// Shared outbound client, also used by the Nodul proxy endpoint.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Start one independent delivery per configured integration and return
    /// without waiting. Failures are logged, never raised to the submitter.
    pub fn dispatch(
        &self,
        settings: &IntegrationSettings,
        payload: &LeadPayload,
    ) -> Vec<JoinHandle<Result<Delivery, DispatchError>>> {
        settings
            .configured()
            .into_iter()
            .filter_map(|(kind, url)| {
                let Some(integration) = self.registry.get(kind).cloned() else {
                    tracing::warn!("No integration registered for {}", kind.id());
                    return None;
                };
                let payload = payload.clone();

                Some(tokio::spawn(async move {
                    let result = integration.deliver(&url, &payload).await;
                    match &result {
                        Ok(delivery) => tracing::info!(
                            "Lead delivered to {} (HTTP {})",
                            integration.name(),
                            delivery.status_code
                        ),
                        Err(e) => tracing::warn!("Lead delivery to {} failed: {e}", integration.name()),
                    }
                    result
                }))
            })
            .collect()
    }

    pub async fn send(
        &self,
        kind: IntegrationKind,
        url: &str,
        payload: &LeadPayload,
    ) -> Result<Delivery, DispatchError> {
        if url.trim().is_empty() {
            return Err(DispatchError::NotConfigured(kind));
        }
        let integration = self
            .registry
            .get(kind)
            .ok_or(DispatchError::NotConfigured(kind))?;
        integration.deliver(url.trim(), payload).await
    }

    /// Send the synthetic test lead so an operator can verify a target.
    pub async fn test(
        &self,
        kind: IntegrationKind,
        url: &str,
        source: &str,
        course: &str,
    ) -> Result<Delivery, DispatchError> {
        let payload = LeadPayload::test(source, course);
        let result = self.send(kind, url, &payload).await;
        if let Err(e) = &result {
            tracing::info!("Test delivery to {} failed: {e}", kind.id());
        }
        result
    }
}
