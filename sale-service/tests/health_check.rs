mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["service"], "sale-service");
}

#[tokio::test]
async fn metrics_are_public() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("/metrics")).send().await.unwrap();

    assert!(response.status().is_success());
}
