use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::nonce;
use crate::state::SharedState;
use crate::submission::fields;

/// Everything a client needs to render and submit the form: a fresh
/// nonce, the challenge site key (empty when the challenge is off),
/// the configured subject choices, and the field bounds for client-side
/// hints.
pub async fn bootstrap(State(state): State<SharedState>) -> Result<Json<Value>, AppError> {
    let settings = state.settings.load().await;

    let nonce = nonce::issue(
        &state.config.nonce_secret,
        nonce::SUBMIT_ACTION,
        state.config.nonce_ttl_secs,
    )
    .map_err(AppError::Internal)?;

    Ok(Json(json!({
        "nonce": nonce,
        "turnstile_site_key": settings.turnstile_site_key,
        "subjects": settings.subjects,
        "limits": {
            "name_min": fields::NAME_MIN,
            "name_max": fields::NAME_MAX,
            "email_max": fields::EMAIL_MAX,
            "subject_min": fields::SUBJECT_MIN,
            "subject_max": fields::SUBJECT_MAX,
            "message_min": fields::MESSAGE_MIN,
            "message_max": fields::MESSAGE_MAX,
        },
    })))
}
