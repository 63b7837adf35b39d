use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::{seed_member, setup_guarded_app, setup_test_app, setup_test_db};

#[tokio::test]
async fn test_default_policies_allow_anonymous_writes() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let request = Request::builder()
        .method("POST")
        .uri("/api/members")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "Alice"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_guarded_create_requires_authentication() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_guarded_app(db);

    let request = Request::builder()
        .method("POST")
        .uri("/api/members")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "Alice"}).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        error["detail"],
        "Authentication credentials were not provided."
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/members")
        .header("content-type", "application/json")
        .header("x-test-role", "user")
        .body(Body::from(json!({"name": "Alice"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_guarded_delete_requires_admin() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let seeded = seed_member(&db, "Alice", None, true).await;
    let app = setup_guarded_app(db);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/members/{}", seeded.id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/members/{}", seeded.id))
        .header("x-test-role", "user")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        error["detail"],
        "You do not have permission to perform this action."
    );

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/members/{}", seeded.id))
        .header("x-test-role", "admin")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_guarded_inactive_listing_requires_admin() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    seed_member(&db, "Alice", None, false).await;
    let app = setup_guarded_app(db);

    let request = Request::builder()
        .method("GET")
        .uri("/api/members/inactive")
        .header("x-test-role", "user")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = Request::builder()
        .method("GET")
        .uri("/api/members/inactive")
        .header("x-test-role", "admin")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unlisted_actions_fall_back_to_allow_any() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    seed_member(&db, "Alice", None, true).await;
    let app = setup_guarded_app(db);

    let request = Request::builder()
        .method("GET")
        .uri("/api/members")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("GET")
        .uri("/api/members/search?name=al")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_authorization_runs_before_lookups() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_guarded_app(db);

    // A forbidden caller learns nothing about which ids exist
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/members/999")
        .header("x-test-role", "user")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
