//! Axum HTTP surface for the status API

pub mod handlers;
pub mod state;

pub use state::AppState;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/status", get(handlers::get_status))
        .route("/health", get(handlers::basic_health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
