use std::sync::Arc;

use crate::config::Config;
use crate::form::LeadService;
use crate::integrations::Dispatcher;
use crate::rate_limit::SlidingWindowLimiter;
use crate::settings::SettingsStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub leads: LeadService,
    pub settings: Arc<dyn SettingsStore>,
    pub dispatcher: Arc<Dispatcher>,
    pub limiter: Arc<SlidingWindowLimiter>,
}
