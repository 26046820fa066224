use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::submission::fields::{SUBJECT_MAX, SUBJECT_MIN};
use crate::submission::sanitize;

pub const DEFAULT_RATE_LIMIT: u32 = 3;
pub const RATE_LIMIT_MIN: u32 = 1;
pub const RATE_LIMIT_MAX: u32 = 30;
pub const MAX_SUBJECTS: usize = 10;

const DEFAULT_THANK_YOU: &str = "Your message has been sent. We aim to respond within 24 hours.";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub site_name: String,
    pub nonce_secret: String,
    pub nonce_ttl_secs: u64,
    pub admin_email: String,
    pub settings_path: PathBuf,
    pub max_body_size: usize,
    pub allowed_origins: Vec<String>,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let nonce_secret = env_required("FINCH_RELAY_NONCE_SECRET")?;

        let host: IpAddr = env_or("FINCH_RELAY_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FINCH_RELAY_HOST: {e}"))?;

        let port: u16 = env_or("FINCH_RELAY_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid FINCH_RELAY_PORT: {e}"))?;

        let site_name = env_or("FINCH_RELAY_SITE_NAME", "Finch Relay");

        let nonce_ttl_secs: u64 = env_or("FINCH_RELAY_NONCE_TTL_SECS", "3600")
            .parse()
            .map_err(|e| format!("Invalid FINCH_RELAY_NONCE_TTL_SECS: {e}"))?;

        let admin_email = env_or("FINCH_RELAY_ADMIN_EMAIL", "");

        let settings_path = PathBuf::from(env_or("FINCH_RELAY_SETTINGS_PATH", "settings.json"));

        let max_body_size: usize = env_or("FINCH_RELAY_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid FINCH_RELAY_MAX_BODY_SIZE: {e}"))?;

        let allowed_origins: Vec<String> = env_or("FINCH_RELAY_ALLOWED_ORIGINS", "")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let log_level = env_or("FINCH_RELAY_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("FINCH_RELAY_SMTP_HOST").ok(),
            std::env::var("FINCH_RELAY_SMTP_PORT").ok(),
            std::env::var("FINCH_RELAY_SMTP_USER").ok(),
            std::env::var("FINCH_RELAY_SMTP_PASS").ok(),
            std::env::var("FINCH_RELAY_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid FINCH_RELAY_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            host,
            port,
            site_name,
            nonce_secret,
            nonce_ttl_secs,
            admin_email,
            settings_path,
            max_body_size,
            allowed_origins,
            log_level,
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

/// Form settings document. Edited out-of-band by the admin surface and
/// loaded fresh for every request so changes apply without a restart.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    pub turnstile_site_key: String,
    pub turnstile_secret_key: String,
    pub recipient_email: String,
    pub rate_limit_per_min: u32,
    pub subjects: Vec<String>,
    pub thank_you_message: String,
    pub log_submissions: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            turnstile_site_key: String::new(),
            turnstile_secret_key: String::new(),
            recipient_email: String::new(),
            rate_limit_per_min: DEFAULT_RATE_LIMIT,
            subjects: Vec::new(),
            thank_you_message: DEFAULT_THANK_YOU.to_string(),
            log_submissions: false,
        }
    }
}

impl FormSettings {
    /// Apply the administrative sanitization rules. Invariant afterwards:
    /// at most [`MAX_SUBJECTS`] subjects, each within the subject length
    /// bounds, and the rate limit within its permitted range.
    pub fn sanitized(mut self) -> Self {
        self.rate_limit_per_min = self.rate_limit_per_min.clamp(RATE_LIMIT_MIN, RATE_LIMIT_MAX);
        self.subjects = sanitize_subjects(&self.subjects);
        self.turnstile_site_key = sanitize::text(&self.turnstile_site_key);
        self.turnstile_secret_key = sanitize::text(&self.turnstile_secret_key);
        self.thank_you_message = sanitize::text(&self.thank_you_message);
        if self.thank_you_message.is_empty() {
            self.thank_you_message = DEFAULT_THANK_YOU.to_string();
        }
        self.recipient_email = sanitize::text(&self.recipient_email);
        if !crate::submission::fields::is_email(&self.recipient_email) {
            self.recipient_email.clear();
        }
        self
    }
}

/// Keep subjects that survive sanitization with a length within the
/// form's own subject bounds. Order is preserved so the form offers
/// them exactly as configured.
pub fn sanitize_subjects(input: &[String]) -> Vec<String> {
    let mut subjects = Vec::new();
    for raw in input {
        let subject = sanitize::text(raw);
        if (SUBJECT_MIN..=SUBJECT_MAX).contains(&subject.len()) {
            subjects.push(subject);
        }
        if subjects.len() >= MAX_SUBJECTS {
            break;
        }
    }
    subjects
}

/// Handle to the settings document on disk.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and sanitize the settings document. A missing or unreadable
    /// document falls back to defaults; the service keeps answering with
    /// Turnstile skipped and the admin fallback recipient.
    pub async fn load(&self) -> FormSettings {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str::<FormSettings>(&raw) {
                Ok(settings) => settings.sanitized(),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), "Invalid settings document: {e}");
                    FormSettings::default()
                }
            },
            Err(_) => FormSettings::default(),
        }
    }
}
