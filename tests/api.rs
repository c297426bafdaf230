//! Drives the HTTP router end to end against an in-memory store.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use std::sync::Arc;

use codevault::{app::build_app, config::AppConfig, state::AppState, store::MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    build_app(AppState::in_memory())
}

fn app_with_body_limit(max_body_bytes: usize) -> Router {
    let config = AppConfig {
        max_body_bytes,
        ..AppConfig::default()
    };
    build_app(AppState::from_parts(Arc::new(MemoryStore::new()), Arc::new(config)))
}

async fn post_raw(app: &Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Option<String>, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let content_type = res
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, content_type, serde_json::from_slice(&bytes).unwrap())
}

async fn act(app: &Router, body: Value) -> Value {
    let (status, _, json) = post_raw(app, "/api/v1/exec", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    json
}

async fn register_and_login(app: &Router, name: &str) -> String {
    let email = format!("{name}@example.com");
    let res = act(
        app,
        json!({"action": "register", "name": name, "email": email, "password": "pw"}),
    )
    .await;
    assert_eq!(res["success"], true);
    let res = act(app, json!({"action": "login", "email": email, "password": "pw"})).await;
    res["user"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_answers_ok() {
    let res = app()
        .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn preflight_gets_permissive_cors_headers() {
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/exec")
        .header(header::ORIGIN, "https://vault.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let res = app().oneshot(req).await.unwrap();

    assert!(res.status().is_success());
    let headers = res.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
}

#[tokio::test]
async fn bare_root_endpoint_accepts_actions() {
    let app = app();
    let (status, content_type, json) =
        post_raw(&app, "/", json!({"action": "resetPassword", "email": "x@y.z"}).to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn failures_are_reported_in_band_with_200() {
    let app = app();

    let res = act(&app, json!({"action": "nope"})).await;
    assert_eq!(res, json!({"success": false, "message": "Invalid action"}));

    let (status, _, res) = post_raw(&app, "/api/v1/exec", "this is not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["success"], false);
    assert!(res["message"].as_str().unwrap().starts_with("Error: "));
}

#[tokio::test]
async fn oversized_body_is_reported_in_band_with_200() {
    let app = app_with_body_limit(1024);
    let body = json!({"action": "createProject", "project": {
        "userId": "u", "name": "Big", "version": "1", "frontendCode": "x".repeat(4096)
    }});
    let (status, content_type, res) = post_raw(&app, "/api/v1/exec", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(res["success"], false);
    assert!(res["message"].as_str().unwrap().starts_with("Error: "));

    // small bodies still go through under the same limit
    let res = act(&app, json!({"action": "resetPassword", "email": "a@b.c"})).await;
    assert_eq!(res["success"], true);
}

#[tokio::test]
async fn default_limit_accepts_multi_megabyte_code() {
    let app = app();
    let ada = register_and_login(&app, "ada").await;
    let code = "x".repeat(3 * 1024 * 1024);
    let res = act(
        &app,
        json!({"action": "createProject", "project": {
            "userId": ada, "name": "Big", "version": "1", "frontendCode": code
        }}),
    )
    .await;
    assert_eq!(res["message"], "Project created successfully");
    let pid = res["projectId"].as_str().unwrap().to_string();

    let res = act(&app, json!({"action": "getProject", "projectId": pid})).await;
    assert_eq!(res["project"]["frontendCode"].as_str().unwrap().len(), code.len());
}

#[tokio::test]
async fn login_response_has_no_digest() {
    let app = app();
    register_and_login(&app, "ada").await;
    let res = act(
        &app,
        json!({"action": "login", "email": "ada@example.com", "password": "pw"}),
    )
    .await;
    let user = res["user"].as_object().unwrap();
    let mut keys: Vec<_> = user.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["createdAt", "email", "id", "name"]);
}

#[tokio::test]
async fn project_lifecycle_over_http() {
    let app = app();
    let ada = register_and_login(&app, "ada").await;
    let bob = register_and_login(&app, "bob").await;

    let res = act(
        &app,
        json!({"action": "createProject", "project": {
            "userId": ada, "name": "Vault", "version": "1.0", "category": "web",
            "frontendCode": "<p>hi</p>", "isPrivate": true
        }}),
    )
    .await;
    assert_eq!(res["message"], "Project created successfully");
    let pid = res["projectId"].as_str().unwrap().to_string();

    let res = act(&app, json!({"action": "getProject", "projectId": pid, "userId": ada})).await;
    assert_eq!(res["project"]["frontendCode"], "<p>hi</p>");
    assert_eq!(res["project"]["isPrivate"], true);
    assert_eq!(res["project"]["createdAt"], res["project"]["updatedAt"]);

    let res = act(&app, json!({"action": "getProject", "projectId": pid, "userId": bob})).await;
    assert_eq!(res["message"], "You do not have permission to view this project");

    let res = act(&app, json!({"action": "getSharedProjects", "userId": bob})).await;
    assert_eq!(res, json!({"success": true, "projects": []}));

    let res = act(
        &app,
        json!({"action": "updateProject", "project": {
            "id": pid, "userId": ada, "name": "Vault", "version": "1.1", "isPrivate": false
        }}),
    )
    .await;
    assert_eq!(res["success"], true);

    let res = act(&app, json!({"action": "getSharedProjects", "userId": bob})).await;
    assert_eq!(res["projects"][0]["id"], pid.as_str());
    assert_eq!(res["projects"][0]["version"], "1.1");

    let res = act(&app, json!({"action": "deleteProject", "projectId": pid, "userId": bob})).await;
    assert_eq!(res["message"], "You do not have permission to delete this project");

    let res = act(&app, json!({"action": "deleteProject", "projectId": pid, "userId": ada})).await;
    assert_eq!(res["message"], "Project deleted successfully");

    let res = act(&app, json!({"action": "getProject", "projectId": pid})).await;
    assert_eq!(res, json!({"success": false, "message": "Project not found"}));

    let res = act(&app, json!({"action": "getUserProjects", "userId": ada})).await;
    assert_eq!(res, json!({"success": true, "projects": []}));
}
