use std::net::IpAddr;
use std::path::PathBuf;

use ipnet::IpNet;

use crate::validate;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub trusted_proxies: Vec<IpNet>,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub settings_path: PathBuf,
    /// SHA-256 of the operator bearer token, hex encoded. `None` disables the settings API.
    pub operator_token_sha256: Option<String>,
    pub lead: LeadConfig,
    pub smtp: Option<SmtpConfig>,
}

/// Fixed tags and limits applied to every lead.
#[derive(Debug, Clone)]
pub struct LeadConfig {
    pub source: String,
    pub course: String,
    pub submit_limit: usize,
    pub submit_window_ms: u64,
    pub webhook_timeout_secs: u64,
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            source: "Leaders Club".to_string(),
            course: "male".to_string(),
            submit_limit: 3,
            submit_window_ms: 60_000,
            webhook_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub notify: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("LEADHOOK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid LEADHOOK_HOST: {e}"))?;

        let port: u16 = env_or("LEADHOOK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid LEADHOOK_PORT: {e}"))?;

        let max_body_size: usize = env_or("LEADHOOK_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid LEADHOOK_MAX_BODY_SIZE: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_list("LEADHOOK_TRUSTED_PROXIES")
            .into_iter()
            .map(|s| {
                s.parse()
                    .map_err(|e| format!("Invalid LEADHOOK_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cors_origins = env_list("LEADHOOK_CORS_ORIGINS");

        let log_level = env_or("LEADHOOK_LOG_LEVEL", "info");

        let settings_path = PathBuf::from(env_or("LEADHOOK_SETTINGS_PATH", "integrations.json"));

        let operator_token_sha256 = match std::env::var("LEADHOOK_OPERATOR_TOKEN_SHA256").ok() {
            Some(digest) => {
                let digest = digest.trim().to_lowercase();
                let bytes = hex::decode(&digest)
                    .map_err(|e| format!("Invalid LEADHOOK_OPERATOR_TOKEN_SHA256: {e}"))?;
                if bytes.len() != 32 {
                    return Err("Invalid LEADHOOK_OPERATOR_TOKEN_SHA256: expected 32 bytes".to_string());
                }
                Some(digest)
            }
            None => None,
        };

        let defaults = LeadConfig::default();
        let lead = LeadConfig {
            source: env_or("LEADHOOK_SOURCE", &defaults.source),
            course: env_or("LEADHOOK_COURSE", &defaults.course),
            submit_limit: env_or("LEADHOOK_SUBMIT_LIMIT", "3")
                .parse()
                .map_err(|e| format!("Invalid LEADHOOK_SUBMIT_LIMIT: {e}"))?,
            submit_window_ms: env_or("LEADHOOK_SUBMIT_WINDOW_MS", "60000")
                .parse()
                .map_err(|e| format!("Invalid LEADHOOK_SUBMIT_WINDOW_MS: {e}"))?,
            webhook_timeout_secs: env_or("LEADHOOK_WEBHOOK_TIMEOUT_SECS", "10")
                .parse()
                .map_err(|e| format!("Invalid LEADHOOK_WEBHOOK_TIMEOUT_SECS: {e}"))?,
        };

        let smtp = match (
            std::env::var("LEADHOOK_SMTP_HOST").ok(),
            std::env::var("LEADHOOK_SMTP_PORT").ok(),
            std::env::var("LEADHOOK_SMTP_USER").ok(),
            std::env::var("LEADHOOK_SMTP_PASS").ok(),
            std::env::var("LEADHOOK_SMTP_FROM").ok(),
            std::env::var("LEADHOOK_NOTIFY_EMAIL").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from), Some(notify)) => {
                if !validate::validate_email(&notify) {
                    return Err(format!("Invalid LEADHOOK_NOTIFY_EMAIL: {notify}"));
                }
                Some(SmtpConfig {
                    host,
                    port: port
                        .parse()
                        .map_err(|e| format!("Invalid LEADHOOK_SMTP_PORT: {e}"))?,
                    user,
                    pass,
                    from,
                    notify,
                })
            }
            _ => None,
        };

        Ok(Config {
            database_url,
            host,
            port,
            max_body_size,
            trusted_proxies,
            cors_origins,
            log_level,
            settings_path,
            operator_token_sha256,
            lead,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_list(key: &str) -> Vec<String> {
    env_or(key, "")
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
