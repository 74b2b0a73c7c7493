use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::dtos::import::{ImportOsmRequest, ImportOsmResponse};
use crate::error::AppError;
use crate::overpass;
use crate::state::AppState;

pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// Bulk import from Overpass: one fetch, then a linear upsert loop keyed by
/// external id. Upserts committed before a failure stay committed.
pub async fn import_osm(
    State(AppState { store, http, overpass_url }): State<AppState>,
    Json(req): Json<ImportOsmRequest>,
) -> Result<Json<ImportOsmResponse>, AppError> {
    let bbox = req.bounds()?;

    let elements = overpass::fetch_elements(&http, &overpass_url, &bbox).await?;

    let mut imported = 0u64;
    let mut processed = 0u64;
    for element in &elements {
        processed += 1;
        let Some(candidate) = element.candidate() else {
            tracing::debug!(element = %element.external_id(), "skipped, no coordinates");
            continue;
        };
        if store.insert_if_absent(candidate).await? {
            imported += 1;
        }
    }

    tracing::info!(processed, imported, "OSM import finished");
    Ok(Json(ImportOsmResponse { imported, processed }))
}
