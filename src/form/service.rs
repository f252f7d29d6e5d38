use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::LeadConfig;
use crate::email::LeadMailer;
use crate::integrations::{Delivery, DispatchError, Dispatcher, LeadPayload};
use crate::models::{LeadInput, LeadRecord, NewLead};
use crate::rate_limit::SlidingWindowLimiter;
use crate::settings::SettingsStore;
use crate::store::{LeadStore, StoreError};
use crate::validate::{self, FieldErrors};

/// Rate limiter key for contact form submissions.
pub const SUBMIT_ACTION: &str = "contact-form-submit";

#[derive(Debug)]
pub enum SubmitError {
    Invalid(FieldErrors),
    RateLimited { retry_after: Duration },
    Store(StoreError),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Invalid(errors) => {
                let fields: Vec<&str> = errors.keys().copied().collect();
                write!(f, "Invalid fields: {}", fields.join(", "))
            }
            SubmitError::RateLimited { retry_after } => {
                write!(f, "Rate limited. Retry after {}s", retry_after.as_secs().max(1))
            }
            SubmitError::Store(err) => write!(f, "Failed to store lead: {err}"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// An accepted lead plus the deliveries it kicked off.
pub struct Submitted {
    pub record: LeadRecord,
    /// In-flight integration deliveries. Dropping these does not cancel them.
    pub deliveries: Vec<JoinHandle<Result<Delivery, DispatchError>>>,
}

/// Gate, persist, then fan out a single lead.
pub struct LeadService {
    limiter: Arc<SlidingWindowLimiter>,
    store: Arc<dyn LeadStore>,
    settings: Arc<dyn SettingsStore>,
    dispatcher: Arc<Dispatcher>,
    mailer: Option<Arc<LeadMailer>>,
    config: LeadConfig,
}

impl LeadService {
    pub fn new(
        limiter: Arc<SlidingWindowLimiter>,
        store: Arc<dyn LeadStore>,
        settings: Arc<dyn SettingsStore>,
        dispatcher: Arc<Dispatcher>,
        config: LeadConfig,
    ) -> Self {
        Self {
            limiter,
            store,
            settings,
            dispatcher,
            mailer: None,
            config,
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<LeadMailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn config(&self) -> &LeadConfig {
        &self.config
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.config.submit_window_ms)
    }

    /// Submit an already sanitized lead on behalf of `client_key`.
    ///
    /// The store write decides success. Integrations and the notification
    /// mail are started afterwards and never awaited here.
    pub async fn submit(
        &self,
        input: &LeadInput,
        client_key: &str,
        website: Option<String>,
    ) -> Result<Submitted, SubmitError> {
        let errors = validate::validate_lead(input);
        if !errors.is_empty() {
            return Err(SubmitError::Invalid(errors));
        }

        let key = limiter_key(client_key);
        let window = self.window();
        if !self
            .limiter
            .is_allowed(&key, self.config.submit_limit, window)
        {
            let retry_after = self
                .limiter
                .retry_after(&key, self.config.submit_limit, window);
            tracing::warn!("Lead submission throttled for {key}");
            return Err(SubmitError::RateLimited { retry_after });
        }

        let lead = NewLead {
            name: input.name.clone(),
            phone: validate::normalize_phone(&input.phone),
            course: self.config.course.clone(),
            social: input.social.clone(),
        };

        let record = self.store.save(&lead).await.map_err(|e| {
            tracing::error!("Failed to store lead: {e}");
            SubmitError::Store(e)
        })?;

        tracing::info!("Lead {} captured", record.id);

        let deliveries = self.fan_out(&record, website).await;
        Ok(Submitted { record, deliveries })
    }

    async fn fan_out(
        &self,
        record: &LeadRecord,
        website: Option<String>,
    ) -> Vec<JoinHandle<Result<Delivery, DispatchError>>> {
        if let Some(mailer) = &self.mailer {
            let mailer = mailer.clone();
            let record = record.clone();
            let source = self.config.source.clone();
            tokio::spawn(async move {
                if let Err(e) = mailer.send_lead_notification(&record, &source).await {
                    tracing::warn!("Lead notification email failed: {e}");
                }
            });
        }

        let settings = match self.settings.load().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Could not load integration settings, skipping dispatch: {e}");
                return Vec::new();
            }
        };

        let payload = LeadPayload::from_record(record, &self.config.source, website);
        self.dispatcher.dispatch(&settings, &payload)
    }
}

fn limiter_key(client_key: &str) -> String {
    if client_key.is_empty() {
        SUBMIT_ACTION.to_string()
    } else {
        format!("{SUBMIT_ACTION}:{client_key}")
    }
}
