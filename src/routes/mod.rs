pub mod doener;
pub mod import;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new().merge(doener::routes()).merge(import::routes())
}

/// Full application: API under `/api`, liveness routes at the root,
/// permissive CORS like the original service.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", create_router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Doener API up"
}

async fn health_check() -> &'static str {
    "OK"
}
