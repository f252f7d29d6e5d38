#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode as AxumStatus;
use axum::routing::post;
use axum::{Json, Router};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use leadhook::auth::token;
use leadhook::config::{Config, LeadConfig};
use leadhook::form::LeadService;
use leadhook::integrations::Dispatcher;
use leadhook::rate_limit::{ManualClock, SlidingWindowLimiter};
use leadhook::settings::{IntegrationSettings, MemorySettingsStore};
use leadhook::state::SharedState;
use leadhook::store::MemoryLeadStore;

pub const OPERATOR_TOKEN: &str = "operator-token-1";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        max_body_size: 65_536,
        trusted_proxies: vec![],
        cors_origins: vec![],
        log_level: "warn".to_string(),
        settings_path: std::env::temp_dir().join("leadhook-unused.json"),
        operator_token_sha256: Some(token::hash_token(OPERATOR_TOKEN)),
        lead: LeadConfig::default(),
        smtp: None,
    }
}

/// Collaborators of a lead service, kept around so tests can poke at them.
pub struct Harness {
    pub service: LeadService,
    pub store: Arc<MemoryLeadStore>,
    pub settings: Arc<MemorySettingsStore>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(settings: IntegrationSettings) -> Harness {
    let store = Arc::new(MemoryLeadStore::new());
    let settings = Arc::new(MemorySettingsStore::new(settings));
    let clock = Arc::new(ManualClock::new());
    let limiter = Arc::new(SlidingWindowLimiter::with_clock(clock.clone()));
    let dispatcher = Arc::new(Dispatcher::new(Duration::from_secs(5)).unwrap());

    let service = LeadService::new(
        limiter,
        store.clone(),
        settings.clone(),
        dispatcher,
        LeadConfig::default(),
    );

    Harness {
        service,
        store,
        settings,
        clock,
    }
}

/// A running test server backed by in-memory stores and a manual clock.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
    pub store: Arc<MemoryLeadStore>,
    pub settings: Arc<MemorySettingsStore>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit a lead as JSON, return (body, status).
    pub async fn submit_lead(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/leads"))
            .json(data)
            .send()
            .await
            .expect("submit lead failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get_operator(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(OPERATOR_TOKEN)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_operator(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(OPERATOR_TOKEN)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put_operator(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(OPERATOR_TOKEN)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let store = Arc::new(MemoryLeadStore::new());
    let settings = Arc::new(MemorySettingsStore::default());
    let clock = Arc::new(ManualClock::new());
    let limiter = Arc::new(SlidingWindowLimiter::with_clock(clock.clone()));

    let state = leadhook::build_state(config, store.clone(), settings.clone(), limiter)
        .expect("Failed to build state");
    let app = leadhook::build_app(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        state,
        store,
        settings,
        clock,
    }
}

/// Local stand-in for a webhook target that records every JSON body it gets.
pub struct Receiver {
    pub addr: SocketAddr,
    hits: Arc<Mutex<Vec<Value>>>,
}

impl Receiver {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> Vec<Value> {
        self.hits.lock().unwrap().clone()
    }

    /// Poll until at least `n` bodies arrived or two seconds pass.
    pub async fn wait_for(&self, n: usize) -> Vec<Value> {
        for _ in 0..100 {
            let hits = self.hits();
            if hits.len() >= n {
                return hits;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.hits()
    }
}

pub async fn spawn_receiver(status: u16, reply: &'static str) -> Receiver {
    let hits = Arc::new(Mutex::new(Vec::new()));
    let captured = hits.clone();
    let status = AxumStatus::from_u16(status).unwrap();

    let app = Router::new().route(
        "/{*path}",
        post(move |Json(body): Json<Value>| {
            let captured = captured.clone();
            async move {
                captured.lock().unwrap().push(body);
                (status, reply)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Receiver { addr, hits }
}

pub fn ivan() -> Value {
    json!({ "name": "Иван", "phone": "+79991234567", "social": "@ivan" })
}
