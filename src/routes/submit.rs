use std::net::{IpAddr, SocketAddr};

use axum::Json;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};

use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::{parser, pipeline};

/// Accept a contact form submission. Malformed bodies are the only
/// non-200 answer; every pipeline outcome rides an HTTP 200 with the
/// verdict in the payload.
pub async fn submit(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<pipeline::SubmissionOutcome>), AppError> {
    let content_type = headers.get("content-type").and_then(|v| v.to_str().ok());

    let raw = if content_type.is_some_and(|ct| ct.contains("multipart/form-data")) {
        parser::parse_multipart(&headers, body)
            .await
            .map_err(AppError::BadRequest)?
    } else {
        parser::parse_body(content_type, &body).map_err(AppError::BadRequest)?
    };

    let peer_ip: Option<IpAddr> = Some(addr.ip());
    let outcome = pipeline::run(&state, &headers, peer_ip, raw).await;

    Ok((StatusCode::OK, Json(outcome)))
}
