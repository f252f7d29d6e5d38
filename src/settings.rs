//! Operator-managed integration URLs.
//!
//! Stored as a flat JSON object under fixed keys and read back every time a
//! lead is dispatched, so edits take effect without a restart.

use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::integrations::IntegrationKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default)]
    pub zapier_webhook_url: String,
    #[serde(default)]
    pub nodul_webhook_url: String,
}

impl IntegrationSettings {
    pub fn url_for(&self, kind: IntegrationKind) -> &str {
        match kind {
            IntegrationKind::Webhook => &self.webhook_url,
            IntegrationKind::Zapier => &self.zapier_webhook_url,
            IntegrationKind::Nodul => &self.nodul_webhook_url,
        }
    }

    /// Every integration with a non-empty URL.
    pub fn configured(&self) -> Vec<(IntegrationKind, String)> {
        IntegrationKind::ALL
            .iter()
            .map(|kind| (*kind, self.url_for(*kind).trim()))
            .filter(|(_, url)| !url.is_empty())
            .map(|(kind, url)| (kind, url.to_string()))
            .collect()
    }

    /// Trim every URL and reject anything that is neither empty nor an http(s) URL.
    pub fn normalized(&self) -> Result<Self, SettingsError> {
        let mut out = IntegrationSettings::default();
        for kind in IntegrationKind::ALL {
            let url = self.url_for(kind).trim();
            if !url.is_empty() {
                check_url(kind.settings_key(), url)?;
            }
            match kind {
                IntegrationKind::Webhook => out.webhook_url = url.to_string(),
                IntegrationKind::Zapier => out.zapier_webhook_url = url.to_string(),
                IntegrationKind::Nodul => out.nodul_webhook_url = url.to_string(),
            }
        }
        Ok(out)
    }
}

/// Accept only absolute http/https URLs with a host.
pub fn check_url(key: &str, url: &str) -> Result<(), SettingsError> {
    let invalid = || SettingsError::InvalidUrl {
        key: key.to_string(),
        url: url.to_string(),
    };

    let parsed = Url::parse(url).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }
    Ok(())
}

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidUrl { key: String, url: String },
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(err) => write!(f, "Settings I/O error: {err}"),
            SettingsError::Parse(err) => write!(f, "Settings file is not valid JSON: {err}"),
            SettingsError::InvalidUrl { key, url } => {
                write!(f, "{key} must be an http(s) URL, got '{url}'")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        SettingsError::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Parse(err)
    }
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<IntegrationSettings, SettingsError>;
    async fn save(&self, settings: &IntegrationSettings) -> Result<(), SettingsError>;
}

/// JSON file on local disk. A missing file loads as "nothing configured".
pub struct FileSettingsStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<IntegrationSettings, SettingsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(IntegrationSettings::default()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(IntegrationSettings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, settings: &IntegrationSettings) -> Result<(), SettingsError> {
        let _guard = self.write_lock.lock().await;

        let body = serde_json::to_string_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::info!("Integration settings saved to {}", self.path.display());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    settings: RwLock<IntegrationSettings>,
}

impl MemorySettingsStore {
    pub fn new(settings: IntegrationSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<IntegrationSettings, SettingsError> {
        Ok(self
            .settings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    async fn save(&self, settings: &IntegrationSettings) -> Result<(), SettingsError> {
        *self.settings.write().unwrap_or_else(|e| e.into_inner()) = settings.clone();
        Ok(())
    }
}
