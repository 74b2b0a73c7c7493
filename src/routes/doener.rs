use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::handlers::doener::{
    add_comment, create_doener, delete_comment, delete_doener, list_doener, rate_doener,
    update_doener,
};
use crate::state::AppState;

// No route here is protected: the admin/user distinction lives entirely in
// the client.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/doener", get(list_doener).post(create_doener))
        .route("/doener/{id}", put(update_doener).delete(delete_doener))
        .route("/doener/{id}/rate", axum::routing::post(rate_doener))
        .route("/doener/{id}/comment", axum::routing::post(add_comment))
        .route("/doener/{id}/comment/{comment_id}", delete(delete_comment))
}
