mod common;

use anyhow::Result;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use common::{build_test_client, spawn_app, spawn_app_with_overpass, spawn_router};
use serde_json::{json, Value};

// Fake Overpass endpoint answering every POST with a canned body.
fn overpass_stub(status: StatusCode, body: Value) -> Router {
    Router::new().route(
        "/",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    )
}

fn kebab_node(id: i64) -> Value {
    json!({
        "type": "node",
        "id": id,
        "lat": 47.37,
        "lon": 8.54,
        "tags": { "name": "X", "cuisine": "kebab" }
    })
}

fn bbox() -> Value {
    json!({ "south": 47, "west": 8, "north": 48, "east": 9 })
}

#[tokio::test]
async fn import_creates_records_keyed_by_external_id() -> Result<()> {
    let upstream = spawn_router(overpass_stub(
        StatusCode::OK,
        json!({ "elements": [kebab_node(111)] }),
    ))
    .await?;
    let server = spawn_app_with_overpass(&upstream.url("/")).await?;
    let client = build_test_client()?;

    let response = client
        .post(server.url("/api/import/osm"))
        .json(&bbox())
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let counts: Value = response.json().await?;
    assert_eq!(counts["imported"], 1);
    assert_eq!(counts["processed"], 1);

    let list: Value = client.get(server.url("/api/doener")).send().await?.json().await?;
    let shop = &list[0];
    assert_eq!(shop["name"], "X");
    assert_eq!(shop["source"], "osm");
    assert_eq!(shop["sourceId"], "node/111");
    assert_eq!(shop["coordinates"]["lat"], 47.37);
    assert_eq!(shop["ratings"], json!([]));
    Ok(())
}

#[tokio::test]
async fn repeated_import_inserts_nothing_new() -> Result<()> {
    let upstream = spawn_router(overpass_stub(
        StatusCode::OK,
        json!({ "elements": [kebab_node(111)] }),
    ))
    .await?;
    let server = spawn_app_with_overpass(&upstream.url("/")).await?;
    let client = build_test_client()?;

    let first: Value = client
        .post(server.url("/api/import/osm"))
        .json(&bbox())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(first["imported"], 1);

    let second: Value = client
        .post(server.url("/api/import/osm"))
        .json(&bbox())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(second["imported"], 0);
    assert_eq!(second["processed"], 1);

    let list: Value = client.get(server.url("/api/doener")).send().await?.json().await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn reimport_leaves_existing_records_untouched() -> Result<()> {
    let upstream = spawn_router(overpass_stub(
        StatusCode::OK,
        json!({ "elements": [kebab_node(111)] }),
    ))
    .await?;
    let server = spawn_app_with_overpass(&upstream.url("/")).await?;
    let client = build_test_client()?;

    client.post(server.url("/api/import/osm")).json(&bbox()).send().await?;
    let list: Value = client.get(server.url("/api/doener")).send().await?.json().await?;
    let id = list[0]["id"].as_i64().unwrap();

    client
        .post(server.url(&format!("/api/doener/{id}/rate")))
        .json(&json!({ "stars": 5 }))
        .send()
        .await?;

    client.post(server.url("/api/import/osm")).json(&bbox()).send().await?;
    let list: Value = client.get(server.url("/api/doener")).send().await?.json().await?;
    assert_eq!(list[0]["ratings"], json!([5]));
    Ok(())
}

#[tokio::test]
async fn elements_without_coordinates_are_skipped() -> Result<()> {
    let upstream = spawn_router(overpass_stub(
        StatusCode::OK,
        json!({ "elements": [
            kebab_node(1),
            { "type": "rel", "id": 2, "tags": { "name": "No coords" } }
        ] }),
    ))
    .await?;
    let server = spawn_app_with_overpass(&upstream.url("/")).await?;
    let client = build_test_client()?;

    let counts: Value = client
        .post(server.url("/api/import/osm"))
        .json(&bbox())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(counts["imported"], 1);
    assert_eq!(counts["processed"], 2);

    let list: Value = client.get(server.url("/api/doener")).send().await?.json().await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn ways_use_center_coordinates_and_address_tags() -> Result<()> {
    let upstream = spawn_router(overpass_stub(
        StatusCode::OK,
        json!({ "elements": [{
            "type": "way",
            "id": 77,
            "center": { "lat": 47.1, "lon": 8.1 },
            "tags": {
                "cuisine": "doner",
                "addr:street": "Langstrasse",
                "addr:housenumber": "50",
                "addr:city": "Zürich"
            }
        }] }),
    ))
    .await?;
    let server = spawn_app_with_overpass(&upstream.url("/")).await?;
    let client = build_test_client()?;

    client.post(server.url("/api/import/osm")).json(&bbox()).send().await?;
    let list: Value = client.get(server.url("/api/doener")).send().await?.json().await?;
    let shop = &list[0];
    assert_eq!(shop["sourceId"], "way/77");
    assert_eq!(shop["name"], "Unnamed");
    assert_eq!(shop["location"], "Langstrasse 50 · Zürich");
    assert_eq!(shop["coordinates"]["lng"], 8.1);
    Ok(())
}

#[tokio::test]
async fn missing_bounds_are_rejected() -> Result<()> {
    let server = spawn_app().await?;
    let client = build_test_client()?;

    let response = client
        .post(server.url("/api/import/osm"))
        .json(&json!({ "south": 47, "west": 8, "north": 48 }))
        .send()
        .await?;
    assert_eq!(response.status(), 400);

    let list: Value = client.get(server.url("/api/doener")).send().await?.json().await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn upstream_error_status_fails_the_job() -> Result<()> {
    let upstream = spawn_router(overpass_stub(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "remark": "rate limited" }),
    ))
    .await?;
    let server = spawn_app_with_overpass(&upstream.url("/")).await?;
    let client = build_test_client()?;

    let response = client
        .post(server.url("/api/import/osm"))
        .json(&bbox())
        .send()
        .await?;
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "OSM import failed");
    assert!(body["detail"].as_str().unwrap().contains("429"));
    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_fails_the_job() -> Result<()> {
    // Nothing listens on the stub address.
    let server = spawn_app_with_overpass("http://127.0.0.1:9/unreachable").await?;
    let client = build_test_client()?;

    let response = client
        .post(server.url("/api/import/osm"))
        .json(&bbox())
        .send()
        .await?;
    assert_eq!(response.status(), 500);
    Ok(())
}

#[tokio::test]
async fn ping_answers_ok() -> Result<()> {
    let server = spawn_app().await?;
    let client = build_test_client()?;

    let body: Value = client
        .get(server.url("/api/import/osm/ping"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body, json!({ "ok": true }));
    Ok(())
}
