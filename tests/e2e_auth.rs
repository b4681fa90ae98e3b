//! E2E tests for registration, login, and the profile endpoint

mod common;

use common::{TEST_TOKEN_SECRET, TestServer};
use ideaboard::auth::verify_access_token;
use serde_json::Value;

#[tokio::test]
async fn test_register_returns_token_for_new_user() {
    let server = TestServer::new().await;

    let body = server
        .register_user("alice", "alice@example.com", "secret1")
        .await;

    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["message"], "User registered successfully");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());

    // The returned token must verify back to the new user's id
    let token = body["token"].as_str().unwrap();
    let decoded = verify_access_token(token, TEST_TOKEN_SECRET).unwrap();
    assert_eq!(decoded.user_id, body["id"].as_str().unwrap());
}

#[tokio::test]
async fn test_register_normalizes_email() {
    let server = TestServer::new().await;

    let body = server
        .register_user("alice", "  Alice@Example.COM ", "secret1")
        .await;

    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn test_register_duplicate_email_rejected() {
    let server = TestServer::new().await;
    server
        .register_user("alice", "alice@example.com", "secret1")
        .await;

    let response = server
        .client
        .post(server.url("/auth/register"))
        .json(&serde_json::json!({
            "username": "someone",
            "email": "alice@example.com",
            "password": "secret1",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Email already in use.");
}

#[tokio::test]
async fn test_register_duplicate_username_rejected() {
    let server = TestServer::new().await;
    server
        .register_user("alice", "alice@example.com", "secret1")
        .await;

    let response = server
        .client
        .post(server.url("/auth/register"))
        .json(&serde_json::json!({
            "username": "alice",
            "email": "new@example.com",
            "password": "secret1",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Username already taken.");
}

#[tokio::test]
async fn test_register_duplicate_on_both_fields_reports_email() {
    let server = TestServer::new().await;
    server
        .register_user("alice", "alice@example.com", "secret1")
        .await;

    let response = server
        .client
        .post(server.url("/auth/register"))
        .json(&serde_json::json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "secret1",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Email already in use.");
}

#[tokio::test]
async fn test_register_validation_errors_joined() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/auth/register"))
        .json(&serde_json::json!({
            "username": "",
            "email": "not-an-email",
            "password": "short",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Please provide a username"));
    assert!(message.contains("Please provide a valid email"));
    assert!(message.contains("Password must be at least 6 characters long"));
}

#[tokio::test]
async fn test_login_with_email_and_with_username() {
    let server = TestServer::new().await;
    let registered = server
        .register_user("alice", "alice@example.com", "secret1")
        .await;

    for identifier in ["alice@example.com", "alice"] {
        let response = server
            .client
            .post(server.url("/auth/login"))
            .json(&serde_json::json!({
                "emailOrUsername": identifier,
                "password": "secret1",
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["id"], registered["id"]);
        assert_eq!(body["message"], "Login successful");

        let token = body["token"].as_str().unwrap();
        let decoded = verify_access_token(token, TEST_TOKEN_SECRET).unwrap();
        assert_eq!(decoded.user_id, registered["id"].as_str().unwrap());
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let server = TestServer::new().await;
    server
        .register_user("alice", "alice@example.com", "secret1")
        .await;

    let wrong_password = server
        .client
        .post(server.url("/auth/login"))
        .json(&serde_json::json!({
            "emailOrUsername": "alice",
            "password": "wrong-password",
        }))
        .send()
        .await
        .unwrap();
    let unknown_user = server
        .client
        .post(server.url("/auth/login"))
        .json(&serde_json::json!({
            "emailOrUsername": "nobody",
            "password": "secret1",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), 401);
    assert_eq!(unknown_user.status(), 401);

    let wrong_password_body: Value = wrong_password.json().await.unwrap();
    let unknown_user_body: Value = unknown_user.json().await.unwrap();
    assert_eq!(wrong_password_body, unknown_user_body);
    assert_eq!(wrong_password_body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_missing_fields_rejected() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/auth/login"))
        .json(&serde_json::json!({ "emailOrUsername": "alice" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Please provide email/username and password");
}

#[tokio::test]
async fn test_me_returns_profile_without_hash() {
    let server = TestServer::new().await;
    let registered = server
        .register_user("alice", "alice@example.com", "secret1")
        .await;
    let token = registered["token"].as_str().unwrap();

    let response = server
        .client
        .get(server.url("/auth/me"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], registered["id"]);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_me_without_token_rejected() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/auth/me"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_me_with_garbage_token_rejected() {
    let server = TestServer::new().await;

    for header in ["Bearer not-a-real-token", "Basic abc", "Bearer "] {
        let response = server
            .client
            .get(server.url("/auth/me"))
            .header("Authorization", header)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 401, "header {header:?} must be rejected");
    }
}
