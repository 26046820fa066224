use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Action name bound into submit tokens. A token minted for one action
/// never verifies for another.
pub const SUBMIT_ACTION: &str = "finch_submit";

#[derive(Debug, Serialize, Deserialize)]
struct NonceClaims {
    act: String,
    iat: i64,
    exp: i64,
}

/// Mint a signed, action-scoped token valid for `ttl_secs`.
pub fn issue(secret: &str, action: &str, ttl_secs: u64) -> Result<String, String> {
    let now = now_ts();
    let claims = NonceClaims {
        act: action.to_string(),
        iat: now,
        exp: now + ttl_secs as i64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Nonce encode failed: {e}"))
}

/// True when the token carries a valid signature, has not expired, and
/// was minted for exactly this action.
pub fn verify(token: &str, secret: &str, action: &str) -> bool {
    let validation = Validation::default();
    match decode::<NonceClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => data.claims.act == action,
        Err(_) => false,
    }
}

fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
