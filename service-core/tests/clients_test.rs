use rust_decimal_macros::dec;
use serde_json::json;
use service_core::auth::{CallerIdentity, Role};
use service_core::clients::{
    CallContext, ClientCallError, ClientServiceClient, InventoryServiceClient, MovementKind,
    MovementRequest, ProductServiceClient, ServiceClientConfig,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ctx() -> CallContext {
    CallContext {
        identity: CallerIdentity::new("ana", vec![Role::Admin]),
        request_id: Some("req-1".to_string()),
    }
}

#[tokio::test]
async fn client_lookup_forwards_identity_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/clients/1"))
        .and(header("user", "ana"))
        .and(header("roles", "ROLE_ADMIN"))
        .and(header("x-request-id", "req-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "givenName": "Ana",
            "familyName": "Torres",
            "documentType": "DNI",
            "documentNumber": "12345678",
            "birthDate": "1990-04-02"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClientServiceClient::new(ServiceClientConfig::new(server.uri())).unwrap();
    let found = client.find_client(&ctx(), 1).await.unwrap().unwrap();

    assert_eq!(found.full_name(), "Ana Torres");
}

#[tokio::test]
async fn client_lookup_maps_404_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/clients/9"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"status": 404, "message": "Client not found"})),
        )
        .mount(&server)
        .await;

    let client = ClientServiceClient::new(ServiceClientConfig::new(server.uri())).unwrap();
    assert!(client.find_client(&ctx(), 9).await.unwrap().is_none());
}

#[tokio::test]
async fn product_lookup_reads_decimal_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": "Coffee",
            "description": "Ground coffee 500g",
            "price": 5.0,
            "active": true,
            "createdAt": "2024-01-10",
            "stock": 10
        })))
        .mount(&server)
        .await;

    let client = ProductServiceClient::new(ServiceClientConfig::new(server.uri())).unwrap();
    let product = client.find_product(&ctx(), 1).await.unwrap().unwrap();

    assert_eq!(product.price, dec!(5));
    assert_eq!(product.stock, 10);
}

#[tokio::test]
async fn stock_update_surfaces_rejection_message() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/products/stock/1/20/SALIDA"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"status": 400, "message": "Stock can't be less than or equal to 0"})),
        )
        .mount(&server)
        .await;

    let client = ProductServiceClient::new(ServiceClientConfig::new(server.uri())).unwrap();
    let err = client
        .update_stock(&ctx(), 1, 20, MovementKind::Outbound)
        .await
        .unwrap_err();

    match err {
        ClientCallError::Rejected { status, message, .. } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Stock can't be less than or equal to 0");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn movement_registration_posts_outbound_debit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/inventory"))
        .and(body_json(json!({"productId": 1, "quantity": 10, "movementType": "SALIDA"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3,
            "productId": 1,
            "quantity": 10,
            "movementType": "SALIDA",
            "registeredAt": "2024-01-10T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = InventoryServiceClient::new(ServiceClientConfig::new(server.uri())).unwrap();
    let movement = client
        .register_movement(&ctx(), &MovementRequest::outbound(1, 10))
        .await
        .unwrap();

    assert_eq!(movement.movement_type, MovementKind::Outbound);
    assert_eq!(movement.quantity, 10);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let client = ClientServiceClient::new(ServiceClientConfig::new("http://127.0.0.1:9")).unwrap();
    let err = client.find_client(&ctx(), 1).await.unwrap_err();
    assert!(matches!(err, ClientCallError::Transport { .. }));
}
