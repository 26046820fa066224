use std::sync::Arc;

use crate::config::{Config, SettingsStore};
use crate::email::MailTransport;
use crate::rate_limit::SubmissionLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub settings: SettingsStore,
    pub mailer: Option<Arc<dyn MailTransport>>,
    pub http: reqwest::Client,
    pub limiter: SubmissionLimiter,
}
