use super::test_helpers::{json_response, test_client as client, test_config as config};
use super::*;
use crate::storage::MemoryStorage;
use axum::Router;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use serde_json::json;
use std::sync::Arc;

// =============================================================
// login
// =============================================================

#[tokio::test]
async fn login_success_writes_session_and_authenticates() {
    let api = client(Router::new().route(
        "/login",
        post(|axum::Json(body): axum::Json<Value>| async move {
            assert_eq!(body, json!({ "username": "ada", "password": "pw" }));
            json_response(200, json!({ "success": true, "message": "welcome" }))
        }),
    ))
    .await;

    let payload = api.login("ada", "pw", LoginOptions::default()).await.unwrap();
    assert_eq!(payload["message"], "welcome");

    let session = api.sessions().get_session().unwrap().unwrap();
    assert_eq!(session, Session::logged_in("ada", Some("welcome".into())));
    assert!(api.sessions().is_authenticated().unwrap());

    api.sessions().clear_session().unwrap();
    assert!(!api.sessions().is_authenticated().unwrap());
}

#[tokio::test]
async fn login_success_false_keeps_exact_message_and_writes_nothing() {
    let api = client(Router::new().route(
        "/login",
        post(|| async { json_response(200, json!({ "success": false, "message": "bad creds" })) }),
    ))
    .await;

    let err = api.login("ada", "wrong", LoginOptions::default()).await.unwrap_err();
    assert_eq!(err.to_string(), "bad creds");
    assert_eq!(api.sessions().get_session().unwrap(), None);
}

#[tokio::test]
async fn login_times_out_and_writes_nothing() {
    let api = client(Router::new().route(
        "/login",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            json_response(200, json!({ "success": true }))
        }),
    ))
    .await;

    let options = LoginOptions { timeout: Some(Duration::from_millis(100)), include_credentials: false };
    let err = api.login("ada", "pw", options).await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout { operation: "login", timeout_ms: 100 }));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(api.sessions().get_session().unwrap(), None);
}

#[tokio::test]
async fn login_non_json_body_is_invalid_response() {
    let api = client(Router::new().route("/login", post(|| async { "<html>oops</html>" }))).await;
    let err = api.login("ada", "pw", LoginOptions::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse));
}

#[tokio::test]
async fn login_error_status_uses_server_message() {
    let api = client(Router::new().route(
        "/login",
        post(|| async { json_response(423, json!({ "message": "account locked" })) }),
    ))
    .await;
    let err = api.login("ada", "pw", LoginOptions::default()).await.unwrap_err();
    assert!(matches!(&err, ApiError::Request { status: 423, message } if message == "account locked"));
}

#[tokio::test]
async fn login_sends_cookie_only_when_credentials_included() {
    let router = Router::new().route(
        "/login",
        post(|headers: HeaderMap| async move {
            let cookie = headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_owned();
            json_response(200, json!({ "success": true, "message": cookie }))
        }),
    );
    let api = client(router).await;

    let without = api.login("ada", "pw", LoginOptions::default()).await.unwrap();
    assert_eq!(without["message"], "");

    let options = LoginOptions { timeout: None, include_credentials: true };
    let with = api.login("ada", "pw", options).await.unwrap();
    assert_eq!(with["message"], "sid=abc");
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sessions = SessionStore::new(Arc::new(MemoryStorage::new()));
    let api = ApiClient::new(&config(format!("http://{addr}")), sessions).unwrap();
    let err = api.login("ada", "pw", LoginOptions::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { operation: "login", .. }));
}

// =============================================================
// signup
// =============================================================

#[tokio::test]
async fn signup_success_leaves_session_store_unchanged() {
    let api = client(Router::new().route(
        "/signup",
        post(|| async { json_response(200, json!({ "success": true, "message": "ok" })) }),
    ))
    .await;
    api.sessions().set_session(&Session::logged_in("operator", None)).unwrap();
    let before = api.sessions().get_session().unwrap();

    let outcome = api.signup("newbie", "pw", SignupOptions::default()).await.unwrap();
    assert_eq!(outcome.message, "Account created, please login");
    assert_eq!(api.sessions().get_session().unwrap(), before);
}

#[tokio::test]
async fn signup_rejected_is_signup_error() {
    let api = client(Router::new().route(
        "/signup",
        post(|| async { json_response(200, json!({ "success": false, "message": "username taken" })) }),
    ))
    .await;
    let err = api.signup("ada", "pw", SignupOptions::default()).await.unwrap_err();
    assert!(matches!(&err, ApiError::Signup(m) if m == "username taken"));
    assert_eq!(api.sessions().get_session().unwrap(), None);
}

// =============================================================
// admin
// =============================================================

#[tokio::test]
async fn stats_endpoints_apply_defaults() {
    let api = client(
        Router::new()
            .route("/users/total", get(|| async { json_response(200, json!({ "totalUsers": 42 })) }))
            .route("/users/online", get(|| async { json_response(200, json!({ "online": ["a", "b", "c"] })) })),
    )
    .await;
    assert_eq!(api.total_users().await.unwrap(), 42);
    assert_eq!(api.active_users().await.unwrap(), 3);

    let api = client(
        Router::new()
            .route("/users/total", get(|| async { json_response(200, json!({})) }))
            .route("/users/online", get(|| async { json_response(200, json!({ "online": 7 })) })),
    )
    .await;
    assert_eq!(api.total_users().await.unwrap(), 0);
    assert_eq!(api.active_users().await.unwrap(), 0);
}

#[tokio::test]
async fn admin_error_status_uses_operation_message() {
    let api = client(
        Router::new()
            .route("/users/total", get(|| async { json_response(500, json!({ "message": "db down" })) }))
            .route("/users/banned", get(|| async { json_response(503, json!({})) })),
    )
    .await;
    let err = api.total_users().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch total users");
    let err = api.banned_user_details().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch banned users (503)");
}

#[tokio::test]
async fn user_details_default_to_empty_list() {
    let api = client(Router::new().route(
        "/users/details",
        get(|| async { json_response(200, json!({ "users": null })) }),
    ))
    .await;
    assert!(api.all_user_details().await.unwrap().is_empty());
}

#[tokio::test]
async fn banned_details_probe_each_shape() {
    let api = client(Router::new().route(
        "/users/banned",
        get(|| async { json_response(200, json!({ "banned": [{ "id": 1 }] })) }),
    ))
    .await;
    assert_eq!(api.banned_user_details().await.unwrap(), vec![json!({ "id": 1 })]);

    let api = client(Router::new().route(
        "/users/banned",
        get(|| async { json_response(200, json!({ "foo": [{ "id": 2 }] })) }),
    ))
    .await;
    assert_eq!(api.banned_user_details().await.unwrap(), vec![json!({ "id": 2 })]);

    let api = client(Router::new().route("/users/banned", get(|| async { json_response(200, json!({})) }))).await;
    assert!(api.banned_user_details().await.unwrap().is_empty());

    let api = client(Router::new().route("/users/banned", get(|| async { "{broken" }))).await;
    assert!(matches!(api.banned_user_details().await.unwrap_err(), ApiError::InvalidResponse));
}

#[tokio::test]
async fn ban_and_unban_post_username() {
    let api = client(
        Router::new()
            .route(
                "/users/ban",
                post(|axum::Json(body): axum::Json<Value>| async move {
                    json_response(200, json!({ "success": true, "message": format!("banned {}", body["username"].as_str().unwrap_or("")) }))
                }),
            )
            .route("/users/unban", post(|| async { json_response(404, json!({})) })),
    )
    .await;
    let payload = api.ban_user("ada").await.unwrap();
    assert_eq!(payload["message"], "banned ada");

    let err = api.unban_user("ada").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to unban user");
}

#[tokio::test]
async fn fetch_player_reads_user_record_or_reports_not_found() {
    let api = client(Router::new().route(
        "/users/details/fetch",
        post(|axum::Json(body): axum::Json<Value>| async move {
            if body["username"] == "ada" {
                json_response(200, json!({
                    "success": true,
                    "user": {
                        "_id": "u1",
                        "username": "ada",
                        "playername": "Countess",
                        "level": 12,
                        "coins": "340",
                        "EnemiesDefeated": 9,
                        "accountStatus": "banned",
                        "onlineStatus": false
                    }
                }))
            } else {
                json_response(200, json!({ "success": false }))
            }
        }),
    ))
    .await;

    let player = api.fetch_player("ada").await.unwrap();
    assert_eq!(player.id.as_deref(), Some("u1"));
    assert_eq!(player.playername.as_deref(), Some("Countess"));
    assert_eq!(player.coins, Some(340));
    assert!(player.is_banned());

    let err = api.fetch_player("ghost").await.unwrap_err();
    assert!(matches!(&err, ApiError::NotFound(m) if m == "Player not found"));
}

#[tokio::test]
async fn fetch_player_rejects_user_sent_with_success_false() {
    let api = client(Router::new().route(
        "/users/details/fetch",
        post(|| async { json_response(200, json!({ "success": false, "user": { "username": "x" } })) }),
    ))
    .await;

    let err = api.fetch_player("x").await.unwrap_err();
    assert!(matches!(&err, ApiError::NotFound(m) if m == "Player not found"));
}

#[tokio::test]
async fn fetch_player_without_success_field_still_reads_user() {
    let api = client(Router::new().route(
        "/users/details/fetch",
        post(|| async { json_response(200, json!({ "user": { "username": "x" } })) }),
    ))
    .await;

    assert_eq!(api.fetch_player("x").await.unwrap().username, "x");
}
