pub mod dispatcher;
pub mod nodul;
pub mod payload;
pub mod webhook;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use dispatcher::Dispatcher;
pub use payload::LeadPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationKind {
    Webhook,
    Zapier,
    Nodul,
}

impl IntegrationKind {
    pub const ALL: [IntegrationKind; 3] = [
        IntegrationKind::Webhook,
        IntegrationKind::Zapier,
        IntegrationKind::Nodul,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            IntegrationKind::Webhook => "webhook",
            IntegrationKind::Zapier => "zapier",
            IntegrationKind::Nodul => "nodul",
        }
    }

    /// Key the URL is persisted under.
    pub fn settings_key(&self) -> &'static str {
        match self {
            IntegrationKind::Webhook => "webhook_url",
            IntegrationKind::Zapier => "zapier_webhook_url",
            IntegrationKind::Nodul => "nodul_webhook_url",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }
}

/// A 2xx answer from an integration target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub status_code: u16,
    pub body: String,
}

#[derive(Debug, Clone)]
pub enum DispatchError {
    Transport(String),
    Status { status_code: u16, body: String },
    NodulScenarioNotDeployed,
    NotConfigured(IntegrationKind),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::Transport(msg) => write!(f, "Could not deliver: {msg}"),
            DispatchError::Status { status_code, .. } => {
                write!(f, "Could not deliver: target answered with HTTP {status_code}")
            }
            DispatchError::NodulScenarioNotDeployed => write!(
                f,
                "Could not deliver: Nodul cannot find this webhook. Deploy the scenario to prod and try again"
            ),
            DispatchError::NotConfigured(kind) => {
                write!(f, "No URL configured for the {} integration", kind.id())
            }
        }
    }
}

impl std::error::Error for DispatchError {}

#[async_trait]
pub trait Integration: Send + Sync {
    fn kind(&self) -> IntegrationKind;
    fn name(&self) -> &str;
    async fn deliver(&self, url: &str, payload: &LeadPayload) -> Result<Delivery, DispatchError>;
}

pub struct IntegrationRegistry {
    integrations: HashMap<IntegrationKind, Arc<dyn Integration>>,
}

impl IntegrationRegistry {
    pub fn new() -> Self {
        Self {
            integrations: HashMap::new(),
        }
    }

    pub fn register(&mut self, integration: Arc<dyn Integration>) {
        self.integrations.insert(integration.kind(), integration);
    }

    pub fn get(&self, kind: IntegrationKind) -> Option<&Arc<dyn Integration>> {
        self.integrations.get(&kind)
    }

    pub fn list(&self) -> Vec<&Arc<dyn Integration>> {
        let mut all: Vec<_> = self.integrations.values().collect();
        all.sort_by_key(|i| i.kind().id());
        all
    }
}

impl Default for IntegrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
