use std::net::IpAddr;
use std::time::Duration;

use axum::http::HeaderMap;
use serde::Serialize;
use serde_json::Value;

use crate::email;
use crate::nonce;
use crate::state::SharedState;
use crate::submission::fields::{self, ContactFields};
use crate::submission::{client_ip, honeypot};
use crate::turnstile;

/// Window over which relayed submissions are counted.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

pub const NONCE_FIELD: &str = "form_nonce";
pub const CHALLENGE_FIELD: &str = "cf-turnstile-response";

const MSG_NONCE: &str = "Security check failed. Please refresh and try again.";
const MSG_REJECTED: &str = "Submission not accepted.";
const MSG_RATE_LIMITED: &str = "Too many submissions. Please try again later.";
const MSG_CHALLENGE: &str = "Verification failed. Please complete the challenge and try again.";
const MSG_MISCONFIGURED: &str = "Server configuration error. Please try again later.";
const MSG_SEND_FAILED: &str =
    "Sorry, we could not send your message at the moment. Please try again later.";

/// What the submitter gets back. Always serialized under HTTP 200; the
/// `success` flag is the real verdict.
#[derive(Debug, Serialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl SubmissionOutcome {
    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            errors: None,
        }
    }

    fn invalid(errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: errors.join(" "),
            errors: Some(errors),
        }
    }

    fn sent(message: String) -> Self {
        Self {
            success: true,
            message,
            errors: None,
        }
    }
}

/// Run a raw submission through the full intake sequence: nonce,
/// honeypot, rate limit, field validation, challenge verification,
/// then relay. Security rejections answer with generic wording so the
/// response never reveals which gate fired.
pub async fn run(
    state: &SharedState,
    headers: &HeaderMap,
    peer_addr: Option<IpAddr>,
    raw: Value,
) -> SubmissionOutcome {
    let settings = state.settings.load().await;
    let ip = client_ip::resolve(headers, peer_addr);

    let nonce_ok = raw
        .get(NONCE_FIELD)
        .and_then(|v| v.as_str())
        .is_some_and(|token| {
            nonce::verify(token, &state.config.nonce_secret, nonce::SUBMIT_ACTION)
        });
    if !nonce_ok {
        tracing::debug!(%ip, "Submission rejected: bad or missing nonce");
        return SubmissionOutcome::rejected(MSG_NONCE);
    }

    if honeypot::is_tripped(&raw) {
        tracing::debug!(%ip, "Submission rejected: honeypot tripped");
        return SubmissionOutcome::rejected(MSG_REJECTED);
    }

    if !state
        .limiter
        .allow(ip, settings.rate_limit_per_min, RATE_WINDOW)
    {
        tracing::info!(%ip, "Submission rejected: rate limited");
        return SubmissionOutcome::rejected(MSG_RATE_LIMITED);
    }

    let contact = ContactFields::from_raw(&raw);
    let errors = fields::validate(&contact);
    if !errors.is_empty() {
        return SubmissionOutcome::invalid(errors);
    }

    if !settings.turnstile_secret_key.is_empty() {
        let token = raw
            .get(CHALLENGE_FIELD)
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let remote_ip = (!client_ip::is_unknown(ip)).then_some(ip);
        let verdict = turnstile::verify(
            &state.http,
            token,
            &settings.turnstile_secret_key,
            remote_ip,
        )
        .await;
        if !verdict.success {
            tracing::info!(
                %ip,
                codes = ?verdict.error_codes,
                "Submission rejected: challenge verification failed"
            );
            return SubmissionOutcome::rejected(MSG_CHALLENGE);
        }
    }

    let recipient = if settings.recipient_email.is_empty() {
        state.config.admin_email.clone()
    } else {
        settings.recipient_email.clone()
    };
    if !fields::is_email(&recipient) {
        tracing::error!("No valid recipient address configured; submission dropped");
        return SubmissionOutcome::rejected(MSG_MISCONFIGURED);
    }
    let Some(mailer) = state.mailer.as_ref() else {
        tracing::error!("No mail transport configured; submission dropped");
        return SubmissionOutcome::rejected(MSG_MISCONFIGURED);
    };

    let mail = match email::compose(&state.config.site_name, &recipient, &contact) {
        Ok(mail) => mail,
        Err(e) => {
            tracing::error!("Failed to compose notification: {e}");
            return SubmissionOutcome::rejected(MSG_MISCONFIGURED);
        }
    };

    if settings.log_submissions {
        tracing::debug!(
            %ip,
            name = %contact.name,
            email = %contact.email,
            subject = %contact.subject,
            "Relaying contact submission"
        );
    }

    match mailer.send(mail).await {
        Ok(()) => {
            state.limiter.record(ip, RATE_WINDOW);
            SubmissionOutcome::sent(settings.thank_you_message)
        }
        Err(e) => {
            tracing::error!(%ip, "Failed to relay submission: {e}");
            SubmissionOutcome::rejected(MSG_SEND_FAILED)
        }
    }
}
