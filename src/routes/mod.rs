pub mod form;
pub mod submit;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn form_routes() -> Router<SharedState> {
    Router::new()
        .route("/v1/form", get(form::bootstrap))
        .route("/v1/submit", post(submit::submit))
}
