use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use super::handlers::{healthcheck, submit};
use super::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/resources/:editor", post(submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
