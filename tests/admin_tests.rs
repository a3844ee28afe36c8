mod common;

use axum::http::StatusCode;
use common::{body_json, spawn_app};
use serde_json::json;

#[tokio::test]
async fn test_admin_login_reports_admin_role() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/api/login",
            json!({"username": "admin", "password": common::ADMIN_PASSWORD}),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = common::session_cookie(&response).unwrap();
    assert_eq!(body_json(response).await, json!({"role": "admin"}));

    let response = app.get("/api/session", Some(&cookie)).await;
    assert_eq!(
        body_json(response).await,
        json!({"loggedIn": true, "user": {"username": "admin", "role": "admin"}})
    );
}

#[tokio::test]
async fn test_list_users_hides_admin_and_hashes() {
    let app = spawn_app();
    app.register("alice", "plain-secret-1").await;
    app.register("bob", "pw2").await;

    let admin = app.login_as_admin().await;
    let response = app.get("/api/users", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert_ne!(user["username"], "admin");
        assert!(user.get("password").is_none());
        assert_eq!(user["blocked"], false);
    }

    let on_disk = std::fs::read_to_string(&app.users_path).unwrap();
    assert!(on_disk.contains("$argon2id$"));
    assert!(!on_disk.contains("plain-secret-1"));
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = spawn_app();
    let member = app.register_and_login("mallory", "pw").await;

    for uri in ["/api/users", "/api/metrics"] {
        let response = app.get(uri, Some(&member)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");

        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = app
        .post_json(
            "/api/users/block",
            json!({"username": "mallory", "blocked": true}),
            Some(&member),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await,
        json!({"message": "You are not allowed to perform this action."})
    );

    let response = app.delete("/api/users/mallory", Some(&member)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Nothing changed.
    let (status, _) = app.login("mallory", "pw").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_user() {
    let app = spawn_app();
    app.register("frank", "pw").await;
    let admin = app.login_as_admin().await;

    let response = app.delete("/api/users/frank", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"message": "User deleted."}));

    let (status, _) = app.login("frank", "pw").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let users = body_json(app.get("/api/users", Some(&admin)).await).await;
    assert_eq!(users, json!([]));

    // The name is free again.
    assert_eq!(app.register("frank", "new").await, StatusCode::CREATED);
}

#[tokio::test]
async fn test_delete_unknown_user_succeeds() {
    let app = spawn_app();
    let admin = app.login_as_admin().await;

    let response = app.delete("/api/users/ghost", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_block_unknown_user_is_not_found() {
    let app = spawn_app();
    let admin = app.login_as_admin().await;

    let response = app
        .post_json(
            "/api/users/block",
            json!({"username": "ghost", "blocked": true}),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"message": "User not found."}));
}

#[tokio::test]
async fn test_blocked_flag_shows_in_list() {
    let app = spawn_app();
    app.register("gina", "pw").await;
    let admin = app.login_as_admin().await;

    app.post_json(
        "/api/users/block",
        json!({"username": "gina", "blocked": true}),
        Some(&admin),
    )
    .await;

    let users = body_json(app.get("/api/users", Some(&admin)).await).await;
    assert_eq!(users, json!([{"username": "gina", "blocked": true}]));
}

#[tokio::test]
async fn test_block_keeps_existing_session() {
    let app = spawn_app();
    let member = app.register_and_login("hank", "pw").await;
    let admin = app.login_as_admin().await;

    app.post_json(
        "/api/users/block",
        json!({"username": "hank", "blocked": true}),
        Some(&admin),
    )
    .await;

    let response = app.get("/api/session", Some(&member)).await;
    assert_eq!(body_json(response).await["loggedIn"], true);
}
