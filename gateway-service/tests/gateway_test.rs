mod common;

use common::{TestApp, staff_token, token_for};
use serde_json::json;
use service_core::error::ErrorBody;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn auth_routes_pass_through_without_token() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/log-in"))
        .and(body_json(json!({"username": "ana", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "ana",
            "message": "User logged in",
            "jwt": "token",
            "status": true
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .post("/api/auth/log-in")
        .json(&json!({"username": "ana", "password": "pw"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User logged in");
}

#[tokio::test]
async fn missing_token_is_rejected_before_the_upstream() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/api/clients/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let response = app.get("/api/clients/1").send().await.unwrap();

    assert_eq!(response.status().as_u16(), 401);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.message, "Invalid token");
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let app = TestApp::spawn().await;
    let mut token = staff_token();
    token.push('x');

    let response = app
        .get("/api/clients/1")
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn token_without_staff_role_is_forbidden() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/products/1")
        .bearer_auth(token_for("guest", &[]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn identity_from_token_replaces_spoofed_headers() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/api/products/7"))
        .and(header("user", "ana"))
        .and(header("roles", "ROLE_USER"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .get("/api/products/7")
        .bearer_auth(staff_token())
        .header("user", "root")
        .header("roles", "ROLE_ADMIN")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], 7);
}

#[tokio::test]
async fn query_string_is_forwarded() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/api/sales"))
        .and(query_param("page", "2"))
        .and(query_param("size", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .get("/api/sales?page=2&size=5&orderBy=date")
        .bearer_auth(staff_token())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn upstream_errors_are_relayed_unchanged() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/api/sales"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"status": 400, "message": "Product repeated"})),
        )
        .mount(&app.upstream)
        .await;

    let response = app
        .post("/api/sales")
        .bearer_auth(staff_token())
        .json(&json!({"clientId": 1, "details": []}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.message, "Product repeated");
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/inventory")
        .bearer_auth(staff_token())
        .json(&json!({"productId": 1, "quantity": 2, "movementType": "ENTRADA"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 502);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.status, 502);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/suppliers")
        .bearer_auth(staff_token())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn floods_from_one_ip_are_limited() {
    let app = TestApp::spawn_with_rate_limit(2).await;

    for _ in 0..2 {
        let response = app.get("/health").send().await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    let response = app.get("/health").send().await.unwrap();

    assert_eq!(response.status().as_u16(), 429);
    assert!(response.headers().contains_key("retry-after"));
}
