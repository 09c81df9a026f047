#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::todo,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    missing_debug_implementations,
    clippy::clone_on_ref_ptr,
    clippy::items_after_statements,
    unreachable_pub,
    clippy::print_stdout,
    clippy::similar_names
)]
use reqwest::StatusCode;
use serde_json::{Value, json};

mod common;

#[tokio::test]
async fn test_signup_and_login_flow() {
    let app = common::TestApp::spawn().await;
    let username = common::generate_username("alice");
    let mobile = common::generate_mobile();

    let resp = app
        .client
        .post(app.api("/users"))
        .json(&json!({ "username": username, "mobile": mobile, "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["username"], username.as_str());
    assert_eq!(body["user"]["mobile"], mobile);
    assert!(body["user"].get("password").is_none(), "password must never be returned");

    // Mobile may be sent as a string as well.
    let resp = app
        .client
        .post(app.api("/login"))
        .json(&json!({ "mobile": mobile.to_string(), "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], username.as_str());
}

#[tokio::test]
async fn test_signup_duplicate_is_conflict() {
    let app = common::TestApp::spawn().await;
    let user = app.register_user("dup").await;

    // Same mobile, different username.
    let resp = app
        .client
        .post(app.api("/users"))
        .json(&json!({
            "username": common::generate_username("other"),
            "mobile": user.mobile,
            "password": "password12345"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Same username, different mobile.
    let resp = app
        .client
        .post(app.api("/users"))
        .json(&json!({
            "username": user.username,
            "mobile": common::generate_mobile(),
            "password": "password12345"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signup_missing_fields() {
    let app = common::TestApp::spawn().await;

    let resp = app
        .client
        .post(app.api("/users"))
        .json(&json!({ "username": common::generate_username("nopw"), "mobile": common::generate_mobile() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .client
        .post(app.api("/users"))
        .json(&json!({ "username": "", "mobile": common::generate_mobile(), "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = common::TestApp::spawn().await;
    let user = app.register_user("bob").await;

    let wrong_password = app
        .client
        .post(app.api("/login"))
        .json(&json!({ "mobile": user.mobile, "password": "not-the-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_body: Value = wrong_password.json().await.unwrap();

    let unknown_user = app
        .client
        .post(app.api("/login"))
        .json(&json!({ "mobile": common::generate_mobile(), "password": "password12345" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_body: Value = unknown_user.json().await.unwrap();

    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Invalid mobile number or password");
}

#[tokio::test]
async fn test_legacy_plaintext_password_is_upgraded() {
    let app = common::TestApp::spawn().await;
    let username = common::generate_username("legacy");
    let mobile = common::generate_mobile();

    sqlx::query("INSERT INTO users (id, username, mobile, password_hash) VALUES ($1, $2, $3, $4)")
        .bind(uuid::Uuid::new_v4())
        .bind(&username)
        .bind(mobile)
        .bind("plain-secret")
        .execute(&app.pool)
        .await
        .unwrap();

    let resp = app
        .client
        .post(app.api("/login"))
        .json(&json!({ "mobile": mobile, "password": "plain-secret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let stored: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE mobile = $1")
        .bind(mobile)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(stored.starts_with("$argon2"), "legacy password should be rehashed, got {stored}");

    // Still works after the upgrade.
    let resp = app
        .client
        .post(app.api("/login"))
        .json(&json!({ "mobile": mobile, "password": "plain-secret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_users_excludes_caller() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;

    let resp = app.client.get(app.api(&format!("/users?currentUserId={}", alice.id))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    let ids: Vec<&str> = body["users"].as_array().unwrap().iter().map(|u| u["id"].as_str().unwrap()).collect();
    assert!(ids.contains(&bob.id.to_string().as_str()));
    assert!(!ids.contains(&alice.id.to_string().as_str()));
}

#[tokio::test]
async fn test_search_users() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let target = app.register_user("searchme").await;

    // Case-insensitive substring of the username.
    let fragment = target.username[target.username.len() - 8..].to_uppercase();
    let resp = app
        .client
        .get(app.api("/users/search"))
        .query(&[("q", fragment.as_str()), ("currentUserId", alice.id.to_string().as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], target.id.to_string().as_str());

    // Exact mobile match.
    let resp = app
        .client
        .get(app.api("/users/search"))
        .query(&[("q", target.mobile.to_string())])
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["users"].as_array().unwrap().iter().any(|u| u["id"] == target.id.to_string().as_str()));

    // The caller never finds themselves.
    let resp = app
        .client
        .get(app.api("/users/search"))
        .query(&[("q", alice.username.as_str()), ("currentUserId", alice.id.to_string().as_str())])
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["users"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(app.api("/users/search?q=%20%20")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Search query is required");
}
