use assignmate_boot::db::AccountsStorage;
use assignmate_boot::router::{AppState, app_router};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

async fn storage() -> AccountsStorage {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    AccountsStorage::new(pool)
}

fn health_request() -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("failed to build request")
}

#[tokio::test]
async fn health_is_ok_while_store_answers() {
    let app = app_router(AppState::new(storage().await));

    let resp = app.oneshot(health_request()).await.expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body_str = std::str::from_utf8(&body).expect("response body was not utf-8");
    assert_eq!(body_str, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn health_is_unavailable_once_store_is_gone() {
    let storage = storage().await;
    storage.pool().close().await;
    let app = app_router(AppState::new(storage));

    let resp = app.oneshot(health_request()).await.expect("request failed");

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body_str = std::str::from_utf8(&body).expect("response body was not utf-8");
    assert!(body_str.contains(r#""code":"STORE_UNAVAILABLE""#));
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = app_router(AppState::new(storage().await));

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/admin")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
