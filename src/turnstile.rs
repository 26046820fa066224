use std::net::IpAddr;
use std::time::Duration;

use serde::Deserialize;

pub const SITEVERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

const VERIFY_TIMEOUT: Duration = Duration::from_secs(15);

/// Tokens are bounded; oversized payloads never reach the verification
/// endpoint.
const MAX_TOKEN_LEN: usize = 2048;

/// Outcome of a SiteVerify exchange. `error_codes` carries the
/// verifier's machine-readable codes verbatim, or a single synthetic
/// code when the call was short-circuited or failed.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub success: bool,
    pub error_codes: Vec<String>,
}

impl VerificationResult {
    fn failure(code: &str) -> Self {
        Self {
            success: false,
            error_codes: vec![code.to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verify a client-supplied challenge token against Cloudflare.
///
/// The token is one-time: the caller must have the client reset its
/// widget after every attempt, whatever the outcome here.
pub async fn verify(
    http: &reqwest::Client,
    token: &str,
    secret: &str,
    remote_ip: Option<IpAddr>,
) -> VerificationResult {
    siteverify(http, SITEVERIFY_URL, token, secret, remote_ip).await
}

async fn siteverify(
    http: &reqwest::Client,
    endpoint: &str,
    token: &str,
    secret: &str,
    remote_ip: Option<IpAddr>,
) -> VerificationResult {
    if secret.is_empty() {
        return VerificationResult::failure("missing-input-secret");
    }

    let token = token.trim();
    if token.is_empty() {
        return VerificationResult::failure("missing-input-response");
    }
    if token.len() > MAX_TOKEN_LEN {
        return VerificationResult::failure("invalid-input-response");
    }

    let mut form: Vec<(&str, String)> = vec![
        ("secret", secret.to_string()),
        ("response", token.to_string()),
    ];
    if let Some(ip) = remote_ip {
        form.push(("remoteip", ip.to_string()));
    }

    let response = match http
        .post(endpoint)
        .timeout(VERIFY_TIMEOUT)
        .form(&form)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Turnstile siteverify request failed: {e}");
            return VerificationResult::failure("internal-error");
        }
    };

    match response.json::<SiteVerifyResponse>().await {
        Ok(data) => VerificationResult {
            success: data.success,
            error_codes: data.error_codes,
        },
        Err(e) => {
            tracing::warn!("Turnstile siteverify returned an unparseable body: {e}");
            VerificationResult::failure("internal-error")
        }
    }
}
