use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::import::{import_osm, ping};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/import/osm", post(import_osm))
        .route("/import/osm/ping", get(ping))
}
