mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_works_without_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/health")
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["service"], "gateway-service");
}

#[tokio::test]
async fn ready_with_configured_routes() {
    let app = TestApp::spawn().await;

    let response = app.get("/ready").send().await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
}
