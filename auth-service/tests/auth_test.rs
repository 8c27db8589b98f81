mod common;

use common::{TestApp, test_config};
use serde_json::Value;

#[tokio::test]
async fn sign_up_returns_created_user_without_password() {
    let app = TestApp::spawn().await;

    let response = app.sign_up("ana", "pa55word", 1).await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "ana");
    assert_eq!(body["enabled"], true);
    assert_eq!(body["roles"][0]["name"], "ADMIN");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn log_in_issues_token_for_registered_user() {
    let app = TestApp::spawn().await;
    app.sign_up("ana", "pa55word", 2).await;

    let response = app.log_in("ana", "pa55word").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "ana");
    assert_eq!(body["message"], "User logged in");
    assert_eq!(body["status"], true);

    let token = body["jwt"].as_str().unwrap();
    let claims = app.jwt().validate(token).unwrap();
    assert_eq!(claims.sub, "ana");
    assert_eq!(claims.authorities, "ROLE_USER");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;
    app.sign_up("ana", "pa55word", 2).await;

    let response = app.log_in("ana", "wrong").await;

    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = TestApp::spawn().await;
    app.sign_up("ana", "pa55word", 2).await;

    let response = app.sign_up("ana", "another", 2).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "The username already exists");
}

#[tokio::test]
async fn overlong_username_fails_validation() {
    let app = TestApp::spawn().await;

    let response = app.sign_up(&"a".repeat(101), "pa55word", 2).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("Username is too long"));
}

#[tokio::test]
async fn unknown_role_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app.sign_up("ana", "pa55word", 9).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Role not found");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/auth/log-in"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn repeated_log_in_attempts_are_rate_limited() {
    let app = TestApp::spawn_with(test_config(2)).await;

    for _ in 0..2 {
        let response = app.log_in("ghost", "pw").await;
        assert_eq!(response.status().as_u16(), 401);
    }
    let response = app.log_in("ghost", "pw").await;

    assert_eq!(response.status().as_u16(), 429);
    assert!(response.headers().contains_key("retry-after"));
}
