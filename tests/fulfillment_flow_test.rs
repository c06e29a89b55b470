use anyhow::Result;
use chrono::TimeZone;
use httpmock::prelude::*;
use nefol_fulfillment::adapters::memory::{
    InMemoryCredentialStore, InMemoryOrderStore, InMemoryShipmentStore,
};
use nefol_fulfillment::config::CarrierConfig;
use nefol_fulfillment::domain::model::{Address, OrderItem, PaymentMethod};
use nefol_fulfillment::{FulfillmentConfig, FulfillmentError, FulfillmentService, Order};
use std::sync::Arc;

type Service =
    FulfillmentService<InMemoryCredentialStore, InMemoryShipmentStore, InMemoryOrderStore>;

fn test_config(server: &MockServer) -> FulfillmentConfig {
    FulfillmentConfig {
        carrier: CarrierConfig {
            base_url: Some(server.base_url()),
            timeout_seconds: Some(5),
            pickup_location: None,
        },
    }
}

fn cod_order(id: i64, order_number: &str) -> Order {
    Order {
        id,
        order_number: order_number.to_string(),
        customer_name: "Asha Verma".to_string(),
        customer_email: "asha@example.com".to_string(),
        shipping_address: Address {
            street: "12 MG Road".to_string(),
            city: "Lucknow".to_string(),
            state: "UP".to_string(),
            postal_code: "226001".to_string(),
            country: "India".to_string(),
            phone: Some("+919876543210".to_string()),
            apartment: None,
        },
        billing_address: None,
        items: vec![OrderItem {
            name: "Face Serum".to_string(),
            sku: "NF-SER-01".to_string(),
            quantity: 1,
            unit_price: 899.0,
        }],
        subtotal: 899.0,
        shipping_fee: 0.0,
        discount: 0.0,
        total: 899.0,
        payment_method: PaymentMethod::Cod,
        created_at: chrono::Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap(),
    }
}

async fn service_with_order(server: &MockServer, order: Order) -> Result<(Service, InMemoryShipmentStore)> {
    let orders = InMemoryOrderStore::new();
    orders.insert(order).await;
    let shipments = InMemoryShipmentStore::new();

    let service = FulfillmentService::new(
        &test_config(server),
        InMemoryCredentialStore::new(),
        shipments.clone(),
        orders,
    )?;
    service.save_credentials("ops@nefol.in", "secret").await?;
    Ok((service, shipments))
}

fn mock_login(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST).path("/auth/login");
        then.status(200)
            .json_body(serde_json::json!({"token": "tok_test"}));
    });
}

/// Scenario A: the carrier rejects the initial pickup location, echoes the
/// valid one in the error body, the retry succeeds and AWB + label follow.
#[tokio::test]
async fn test_pickup_retry_then_awb_and_label() -> Result<()> {
    let server = MockServer::start();
    mock_login(&server);
    server.mock(|when, then| {
        when.method(GET).path("/settings/company/pickup");
        then.status(200).json_body(serde_json::json!({
            "data": {"data": [{"pickup_location": "Store", "id": 1}]}
        }));
    });
    let rejected_create = server.mock(|when, then| {
        when.method(POST)
            .path("/orders/create/adhoc")
            .json_body_partial(r#"{"pickup_location": "Store"}"#);
        then.status(422).json_body(serde_json::json!({
            "message": "Pickup location Store is invalid",
            "data": {"data": [{"pickup_location": "Home", "id": 1}]}
        }));
    });
    let accepted_create = server.mock(|when, then| {
        when.method(POST)
            .path("/orders/create/adhoc")
            .json_body_partial(r#"{"pickup_location": "Home"}"#);
        then.status(200)
            .json_body(serde_json::json!({"shipment_id": 555111}));
    });
    let awb = server.mock(|when, then| {
        when.method(POST).path("/courier/assign/awb");
        then.status(200)
            .json_body(serde_json::json!({"awb_code": "AWBX1"}));
    });
    let label = server.mock(|when, then| {
        when.method(POST).path("/courier/generate/label");
        then.status(200)
            .json_body(serde_json::json!({"label_url": "https://cdn.carrier.test/555111.pdf"}));
    });

    let (service, shipments) = service_with_order(&server, cod_order(1001, "NEFOL-1001")).await?;
    let record = service.create_shipment(1001).await?;

    rejected_create.assert_hits(1);
    accepted_create.assert_hits(1);
    awb.assert_hits(1);
    label.assert_hits(1);

    assert_eq!(record.order_id, 1001);
    assert_eq!(record.shipment_id.as_deref(), Some("555111"));
    assert_eq!(record.awb_code.as_deref(), Some("AWBX1"));
    assert_eq!(
        record.label_url.as_deref(),
        Some("https://cdn.carrier.test/555111.pdf")
    );
    assert_eq!(record.status, "ready_to_ship");
    assert_eq!(shipments.len().await, 1);
    Ok(())
}

/// Scenario B: incomplete shipping address fails validation before any
/// carrier call and writes nothing.
#[tokio::test]
async fn test_incomplete_address_rejected_without_carrier_call() -> Result<()> {
    let server = MockServer::start();
    mock_login(&server);
    let create = server.mock(|when, then| {
        when.method(POST).path("/orders/create/adhoc");
        then.status(200);
    });

    let mut order = cod_order(1002, "NEFOL-1002");
    order.shipping_address.postal_code = String::new();
    let (service, shipments) = service_with_order(&server, order).await?;

    let err = service.create_shipment(1002).await.unwrap_err();

    assert!(matches!(err, FulfillmentError::ValidationError { .. }));
    assert!(shipments.is_empty().await);
    create.assert_hits(0);
    Ok(())
}

/// Scenario C: create succeeds without a shipment_id anywhere, the recovery
/// lookup also comes back empty, and the record is persisted for manual
/// reconciliation. A later AWB request is rejected without a carrier call.
#[tokio::test]
async fn test_recovery_miss_yields_record_needing_manual_check() -> Result<()> {
    let server = MockServer::start();
    mock_login(&server);
    server.mock(|when, then| {
        when.method(GET).path("/settings/company/pickup");
        then.status(200)
            .json_body(serde_json::json!({"data": {"data": [{"pickup_location": "Home"}]}}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/orders/create/adhoc");
        then.status(200)
            .json_body(serde_json::json!({"success": true}));
    });
    let recovery = server.mock(|when, then| {
        when.method(GET)
            .path("/orders")
            .query_param("order_id", "NEFOL-1003");
        then.status(200).json_body(serde_json::json!({"data": []}));
    });
    let awb = server.mock(|when, then| {
        when.method(POST).path("/courier/assign/awb");
        then.status(200);
    });

    let (service, shipments) = service_with_order(&server, cod_order(1003, "NEFOL-1003")).await?;
    let record = service.create_shipment(1003).await?;

    recovery.assert_hits(1);
    awb.assert_hits(0);
    assert!(record.shipment_id.is_none());
    assert!(record.needs_manual_check());
    assert_eq!(record.status, "pending");
    assert_eq!(shipments.len().await, 1);

    let err = service.assign_awb_and_label(1003, None).await.unwrap_err();
    assert!(matches!(err, FulfillmentError::PreconditionError { .. }));
    awb.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_create_twice_yields_one_record_and_one_carrier_create() -> Result<()> {
    let server = MockServer::start();
    mock_login(&server);
    server.mock(|when, then| {
        when.method(GET).path("/settings/company/pickup");
        then.status(200)
            .json_body(serde_json::json!({"data": {"data": [{"pickup_location": "Home"}]}}));
    });
    let create = server.mock(|when, then| {
        when.method(POST).path("/orders/create/adhoc");
        then.status(200)
            .json_body(serde_json::json!({"shipment_id": 900100}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/courier/assign/awb");
        then.status(400)
            .json_body(serde_json::json!({"message": "no courier available"}));
    });

    let (service, shipments) = service_with_order(&server, cod_order(1004, "NEFOL-1004")).await?;

    let first = service.create_shipment(1004).await?;
    let second = service.create_shipment(1004).await?;

    create.assert_hits(1);
    assert_eq!(shipments.len().await, 1);
    assert_eq!(first.shipment_id, second.shipment_id);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_creates_are_single_flight() -> Result<()> {
    let server = MockServer::start();
    mock_login(&server);
    server.mock(|when, then| {
        when.method(GET).path("/settings/company/pickup");
        then.status(200)
            .json_body(serde_json::json!({"data": {"data": [{"pickup_location": "Home"}]}}));
    });
    let create = server.mock(|when, then| {
        when.method(POST).path("/orders/create/adhoc");
        then.status(200)
            .json_body(serde_json::json!({"shipment_id": 900200}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/courier/assign/awb");
        then.status(400)
            .json_body(serde_json::json!({"message": "no courier available"}));
    });

    let (service, shipments) = service_with_order(&server, cod_order(1005, "NEFOL-1005")).await?;
    let service = Arc::new(service);

    let a = {
        let service = service.clone();
        tokio::spawn(async move { service.create_shipment(1005).await })
    };
    let b = {
        let service = service.clone();
        tokio::spawn(async move { service.create_shipment(1005).await })
    };

    let first = a.await??;
    let second = b.await??;

    // the loser of the race observes the winner's record instead of
    // triggering a second carrier-side shipment
    create.assert_hits(1);
    assert_eq!(shipments.len().await, 1);
    assert_eq!(first.shipment_id.as_deref(), Some("900200"));
    assert_eq!(second.shipment_id.as_deref(), Some("900200"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_order_is_not_found() -> Result<()> {
    let server = MockServer::start();
    mock_login(&server);

    let (service, _) = service_with_order(&server, cod_order(1006, "NEFOL-1006")).await?;
    let err = service.create_shipment(4040).await.unwrap_err();

    assert!(matches!(err, FulfillmentError::NotFoundError { .. }));
    Ok(())
}
