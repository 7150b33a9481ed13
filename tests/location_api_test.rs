//! Location tracking integration tests

mod common;

use common::TestApp;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

async fn record(app: &TestApp, room_id: &str, username: &str) -> Value {
    let response = app
        .http_client()
        .post(app.api_url("/locations"))
        .json(&json!({"room_id": room_id, "username": username}))
        .send()
        .await
        .expect("Failed to record location");
    assert_eq!(response.status().as_u16(), 200);
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_record_and_list_locations() {
    let app = TestApp::spawn().await;

    record(&app, "kitchen", "alice").await;
    record(&app, "hallway", "bob").await;

    let response = app
        .http_client()
        .get(app.api_url("/locations"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_latest_returns_most_recent_observation() {
    let app = TestApp::spawn().await;

    record(&app, "kitchen", "alice").await;
    record(&app, "hallway", "alice").await;

    let response = app
        .http_client()
        .get(app.api_url("/locations/latest"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["room_id"], "hallway");
}

#[tokio::test]
async fn test_latest_with_no_observations_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .http_client()
        .get(app.api_url("/locations/latest"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_get_by_id_roundtrip() {
    let app = TestApp::spawn().await;

    let created = record(&app, "kitchen", "alice").await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .http_client()
        .get(app.api_url(&format!("/locations/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["room_id"], "kitchen");
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let app = TestApp::spawn().await;

    let created = record(&app, "kitchen", "alice").await;
    let id = created["id"].as_str().unwrap();

    let deleted = app
        .http_client()
        .delete(app.api_url(&format!("/locations/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 200);

    let response = app
        .http_client()
        .get(app.api_url(&format!("/locations/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_record_rejects_blank_fields() {
    let app = TestApp::spawn().await;

    let response = app
        .http_client()
        .post(app.api_url("/locations"))
        .json(&json!({"room_id": "", "username": "alice"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 422);
}
