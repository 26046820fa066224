pub mod config;
pub mod email;
pub mod error;
pub mod nonce;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod submission;
pub mod turnstile;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{Config, SettingsStore};
use crate::email::{MailTransport, SmtpMailer};
use crate::rate_limit::SubmissionLimiter;
use crate::state::{AppState, SharedState};

/// Assemble the router and its shared state. Passing a mailer overrides
/// the SMTP transport built from config; tests use this to substitute
/// their own.
pub fn build_app(
    config: Config,
    mailer: Option<Arc<dyn MailTransport>>,
) -> (Router, SharedState) {
    let mailer = mailer.or_else(|| {
        config.smtp.as_ref().and_then(|smtp| match SmtpMailer::new(smtp) {
            Ok(mailer) => {
                tracing::info!("SMTP transport configured");
                Some(Arc::new(mailer) as Arc<dyn MailTransport>)
            }
            Err(e) => {
                tracing::warn!("SMTP transport not available: {e}");
                None
            }
        })
    });

    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    };

    let max_body_size = config.max_body_size;
    let settings = SettingsStore::new(config.settings_path.clone());

    let state: SharedState = Arc::new(AppState {
        config,
        settings,
        mailer,
        http: reqwest::Client::new(),
        limiter: SubmissionLimiter::new(),
    });

    let app = Router::new()
        .merge(routes::form_routes())
        .route("/health", axum::routing::get(health))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

async fn health() -> &'static str {
    "ok"
}
