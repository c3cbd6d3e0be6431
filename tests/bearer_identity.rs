//! Bearer Identity Tests
//!
//! Owner-scoped tables behind the JWT resolver: the `sub` claim of a valid
//! token is the owner, anything else is refused before SQL runs.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use rowgate::auth::{BearerIdentity, JwtConfig, JwtManager};
use rowgate::driver::SqliteDriver;
use rowgate::schema::{TableDescriptor, TableRegistry};
use rowgate::RestServer;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "test-secret-key-for-bearer-identity";

async fn setup() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let driver = Arc::new(SqliteDriver::open(dir.path().join("notes.db")).await.unwrap());
    sqlx::query("CREATE TABLE notes (id INTEGER PRIMARY KEY, owner TEXT, text TEXT)")
        .execute(driver.pool())
        .await
        .unwrap();
    sqlx::query("INSERT INTO notes (owner, text) VALUES ('alice', 'a'), ('bob', 'b')")
        .execute(driver.pool())
        .await
        .unwrap();

    let mut registry = TableRegistry::new();
    registry
        .register(TableDescriptor::new("notes").writable(true).with_owner_column("owner"))
        .unwrap();
    registry.load_columns(driver.as_ref()).await;

    let identity = Arc::new(BearerIdentity::new(JwtManager::new(JwtConfig::new(SECRET))));
    let router = RestServer::new(registry.freeze(), driver, identity).router();
    (dir, router)
}

fn token(secret: &str, subject: &str) -> String {
    JwtManager::new(JwtConfig::new(secret)).issue_token(subject).unwrap()
}

async fn get(router: &Router, bearer: Option<String>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri("/notes");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let response = router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_subject_claim_scopes_rows() {
    let (_dir, router) = setup().await;

    let (status, rows) = get(&router, Some(token(SECRET, "alice"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows, json!([{"id": 1, "owner": "alice", "text": "a"}]));
}

#[tokio::test]
async fn test_missing_or_forged_token_is_forbidden() {
    let (_dir, router) = setup().await;

    let (status, body) = get(&router, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);

    let (status, _) = get(&router, Some(token("some-other-secret", "alice"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get(&router, Some("not.a.jwt".to_string())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_insert_stamps_subject() {
    let (_dir, router) = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/notes")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(SECRET, "bob")))
        .body(Body::from(json!([{"text": "mine", "owner": "alice"}]).to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, rows) = get(&router, Some(token(SECRET, "bob"))).await;
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert!(rows.as_array().unwrap().iter().all(|row| row["owner"] == "bob"));
}
