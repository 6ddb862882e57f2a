//! HTTP host tests, driven in-process through the axum router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use route_dispatch::http::response::X_DISPATCH_FAILURE;
use route_dispatch::http::HttpServer;

mod common;

fn server() -> axum::Router {
    HttpServer::new(common::config(), common::app()).router()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_successful_dispatch() {
    let response = server()
        .oneshot(Request::builder().uri("/blog/show/hi%20there").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(!response.headers().contains_key(X_DISPATCH_FAILURE));
    assert_eq!(body_text(response).await, "<h1>hi there</h1>");
}

#[tokio::test]
async fn test_root_is_no_match() {
    let response = server()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[X_DISPATCH_FAILURE], "noMatch");
    assert!(body_text(response).await.starts_with("404 Not Found"));
}

#[tokio::test]
async fn test_identity_headers() {
    let anonymous = server()
        .oneshot(Request::builder().uri("/status/whoami").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.headers()[X_DISPATCH_FAILURE], "notAuthenticated");

    let response = server()
        .oneshot(
            Request::builder()
                .uri("/status/whoami")
                .header("x-user-id", "ann")
                .header("x-user-roles", "editor,reader")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["user"], "ann");
    assert_eq!(body["roles"], serde_json::json!(["editor", "reader"]));
}

#[tokio::test]
async fn test_forbidden_role() {
    let response = server()
        .oneshot(
            Request::builder()
                .uri("/blog/drafts")
                .header("x-user-id", "ann")
                .header("x-user-roles", "reader")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers()[X_DISPATCH_FAILURE], "notAuthorized");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let id = "6f2c1f5e-3c1a-4c55-9b1e-2b8f0d0b7a11";
    let response = server()
        .oneshot(
            Request::builder()
                .uri("/status/index")
                .header("x-request-id", id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], id);
    assert!(body_text(response).await.contains(id));
}

#[tokio::test]
async fn test_fallback_over_http() {
    let server = HttpServer::new(common::config(), common::broken_app()).router();
    let response = server
        .oneshot(Request::builder().uri("/blog/panic").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[X_DISPATCH_FAILURE], "uncaught");
    assert!(body_text(response).await.starts_with("500 Internal Server Error"));
}
