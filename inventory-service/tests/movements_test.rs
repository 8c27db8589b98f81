mod common;

use common::{TestApp, product_json};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn outbound_movement_debits_product_and_is_recorded() {
    let app = TestApp::spawn().await;
    app.mock_product(1, 10).await;
    Mock::given(method("PUT"))
        .and(path("/api/products/stock/1/4/SALIDA"))
        .and(header("user", "ana"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(1, 6)))
        .expect(1)
        .mount(&app.product_service)
        .await;

    let response = app
        .as_staff(app.client.post(app.url("/api/inventory")))
        .json(&json!({"productId": 1, "quantity": 4, "movementType": "SALIDA"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["productId"], 1);
    assert_eq!(body["quantity"], 4);
    assert_eq!(body["movementType"], "SALIDA");
    assert!(body["registeredAt"].is_string());
    assert_eq!(app.movements.all().await.len(), 1);
}

#[tokio::test]
async fn outbound_without_stock_returns_400() {
    let app = TestApp::spawn().await;
    app.mock_product(1, 0).await;

    let response = app
        .as_staff(app.client.post(app.url("/api/inventory")))
        .json(&json!({"productId": 1, "quantity": 5, "movementType": "SALIDA"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "There is no stock for the product");
    assert!(app.movements.all().await.is_empty());
}

#[tokio::test]
async fn unknown_product_is_rejected() {
    let app = TestApp::spawn().await;
    app.mock_missing_product(7).await;

    let response = app
        .as_staff(app.client.post(app.url("/api/inventory")))
        .json(&json!({"productId": 7, "quantity": 1, "movementType": "ENTRADA"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "The product is invalid");
}

#[tokio::test]
async fn product_refusal_passes_through() {
    let app = TestApp::spawn().await;
    app.mock_product(1, 2).await;
    Mock::given(method("PUT"))
        .and(path("/api/products/stock/1/3/SALIDA"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": 400,
            "message": "Stock can't be less than or equal to 0"
        })))
        .mount(&app.product_service)
        .await;

    let response = app
        .as_staff(app.client.post(app.url("/api/inventory")))
        .json(&json!({"productId": 1, "quantity": 3, "movementType": "salida"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Stock can't be less than or equal to 0");
    assert!(app.movements.all().await.is_empty());
}

#[tokio::test]
async fn invalid_movement_type_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .as_staff(app.client.post(app.url("/api/inventory")))
        .json(&json!({"productId": 1, "quantity": 3, "movementType": "TRANSFER"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "The type of movement is invalid");
}

#[tokio::test]
async fn movements_are_listed_newest_first() {
    let app = TestApp::spawn().await;
    app.mock_product(1, 0).await;
    for quantity in [2, 5] {
        Mock::given(method("PUT"))
            .and(path(format!("/api/products/stock/1/{}/ENTRADA", quantity)))
            .respond_with(ResponseTemplate::new(200).set_body_json(product_json(1, quantity)))
            .mount(&app.product_service)
            .await;
        let response = app
            .as_staff(app.client.post(app.url("/api/inventory")))
            .json(&json!({"productId": 1, "quantity": quantity, "movementType": "ENTRADA"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    let response = app
        .as_staff(app.client.post(app.url("/api/inventory/1")))
        .json(&json!({"page": 1, "size": 10, "orderBy": "id"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["totalElements"], 2);
    assert_eq!(body["content"][0]["quantity"], 5);
    assert_eq!(body["content"][1]["quantity"], 2);
}

#[tokio::test]
async fn listing_with_bad_sort_key_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .as_staff(app.client.post(app.url("/api/inventory/1")))
        .json(&json!({"page": 1, "size": 10, "orderBy": "price"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Sort name is invalid");
}

#[tokio::test]
async fn requests_without_identity_are_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/inventory"))
        .json(&json!({"productId": 1, "quantity": 3, "movementType": "ENTRADA"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}
