//! Signed upload URL issuance over HTTP.

mod helpers;

use axum::http::{HeaderName, HeaderValue, Method};
use helpers::{api_path, bearer, setup_test_app};
use licenca_core::models::upload::MISSING_FIELDS_MESSAGE;
use serde_json::{json, Value};
use uuid::Uuid;

fn upload_body(process_id: &str) -> Value {
    json!({
        "process_id": process_id,
        "filename": "contrato.pdf",
        "contentType": "application/pdf"
    })
}

#[tokio::test]
async fn test_owner_receives_signed_url() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let process = app.store.seed_process(owner).await;

    let response = app
        .client()
        .post(&api_path("/uploads/signed-url"))
        .add_header("Authorization", bearer(owner))
        .json(&upload_body(&process.id.to_string()))
        .await;

    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    let storage_path = data["storagePath"].as_str().unwrap();
    assert!(storage_path.starts_with(&format!("{}/", process.id)));
    assert!(storage_path.ends_with("-contrato.pdf"));
    let upload_url = data["uploadUrl"].as_str().unwrap();
    assert!(upload_url.starts_with("http://localhost/storage/"));
    assert!(upload_url.contains("method=PUT"));
    assert!(upload_url.contains("signature="));
    assert!(Uuid::parse_str(data["fileId"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_missing_authorization_header() {
    let app = setup_test_app().await;

    // An empty body still reports the missing identity first.
    let response = app
        .client()
        .post(&api_path("/uploads/signed-url"))
        .json(&json!({}))
        .await;

    assert_eq!(response.status_code(), 401);
    let data: Value = response.json();
    assert_eq!(data["error"], "Missing authorization header");
}

#[tokio::test]
async fn test_invalid_token() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post(&api_path("/uploads/signed-url"))
        .add_header("Authorization", "Bearer not-a-jwt")
        .json(&upload_body(&Uuid::new_v4().to_string()))
        .await;

    assert_eq!(response.status_code(), 401);
    let data: Value = response.json();
    assert_eq!(data["error"], "Unauthorized");
}

#[tokio::test]
async fn test_missing_fields() {
    let app = setup_test_app().await;
    let caller = Uuid::new_v4();

    for body in [
        json!({ "filename": "a.pdf", "contentType": "application/pdf" }),
        json!({ "process_id": Uuid::new_v4(), "contentType": "application/pdf" }),
        json!({ "process_id": Uuid::new_v4(), "filename": "", "contentType": "application/pdf" }),
    ] {
        let response = app
            .client()
            .post(&api_path("/uploads/signed-url"))
            .add_header("Authorization", bearer(caller))
            .json(&body)
            .await;
        assert_eq!(response.status_code(), 400, "{body}");
        let data: Value = response.json();
        assert_eq!(data["error"], MISSING_FIELDS_MESSAGE);
    }
}

#[tokio::test]
async fn test_disallowed_content_type() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let process = app.store.seed_process(owner).await;

    let response = app
        .client()
        .post(&api_path("/uploads/signed-url"))
        .add_header("Authorization", bearer(owner))
        .json(&json!({
            "process_id": process.id,
            "filename": "setup.exe",
            "contentType": "application/x-msdownload"
        }))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_unknown_process() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post(&api_path("/uploads/signed-url"))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .json(&upload_body(&Uuid::new_v4().to_string()))
        .await;

    assert_eq!(response.status_code(), 404);
    let data: Value = response.json();
    assert_eq!(data["error"], "Process not found");
}

#[tokio::test]
async fn test_other_users_process_is_forbidden() {
    let app = setup_test_app().await;
    let process = app.store.seed_process(Uuid::new_v4()).await;

    let response = app
        .client()
        .post(&api_path("/uploads/signed-url"))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .json(&upload_body(&process.id.to_string()))
        .await;

    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .method(Method::OPTIONS, &api_path("/uploads/signed-url"))
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("http://app.example.com"),
        )
        .add_header(
            HeaderName::from_static("access-control-request-method"),
            HeaderValue::from_static("POST"),
        )
        .add_header(
            HeaderName::from_static("access-control-request-headers"),
            HeaderValue::from_static("authorization,content-type"),
        )
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("access-control-allow-origin"), "*");
}
