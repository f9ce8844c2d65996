// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Integration tests for the HTTP billing backend client

use serde_json::json;
use wiremock::matchers::{body_json_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weighbridge_telemetry::capture::{
    BillingBackend, BillingError, CaptureRecord, HttpBillingBackend,
};
use weighbridge_telemetry::config::BillingConfig;

async fn backend_for(server: &MockServer) -> HttpBillingBackend {
    let config = BillingConfig {
        base_url: server.uri(),
        timeout_secs: 2,
    };
    HttpBillingBackend::new(&config).expect("client builds")
}

#[tokio::test]
async fn test_previous_weights_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weights/previous/KA01AB1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "first_weight": 4800.0,
            "second_weight": 1200.0,
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server).await;
    let pair = backend
        .previous_weights("KA01AB1234")
        .await
        .unwrap()
        .expect("pair present");

    assert_eq!(pair.first_weight, 4800.0);
    assert_eq!(pair.second_weight, 1200.0);
}

#[tokio::test]
async fn test_previous_weights_absent_maps_404_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weights/previous/KA01AB1234"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let backend = backend_for(&server).await;
    assert!(backend
        .previous_weights("KA01AB1234")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_previous_weights_server_error_surfaces_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weights/previous/KA01AB1234"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
        .mount(&server)
        .await;

    let backend = backend_for(&server).await;
    let err = backend.previous_weights("KA01AB1234").await.unwrap_err();

    match err {
        BillingError::Backend { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database offline");
        }
        other => panic!("expected backend error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_next_serial() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bills/next-serial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"serial_no": 4217})))
        .mount(&server)
        .await;

    let backend = backend_for(&server).await;
    assert_eq!(backend.next_serial().await.unwrap(), 4217);
}

#[tokio::test]
async fn test_load_bill_roundtrip() {
    let mut record = CaptureRecord::default();
    record.serial_no = Some(42);
    record.vehicle_no = "KA01AB1234".into();
    record.party_name = "Acme Aggregates".into();
    record.material_name = "Gravel".into();
    record.set_first_weight(4800.0);
    record.set_second_weight(1200.0);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bills/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&record))
        .mount(&server)
        .await;

    let backend = backend_for(&server).await;
    let loaded = backend.load_bill(42).await.unwrap().expect("bill present");

    assert_eq!(loaded, record);
    assert_eq!(loaded.net_weight(), Some(3600.0));
}

#[tokio::test]
async fn test_submit_posts_record_and_returns_ack() {
    let mut record = CaptureRecord::default();
    record.serial_no = Some(42);
    record.vehicle_no = "KA01AB1234".into();
    record.party_name = "Acme Aggregates".into();
    record.material_name = "Gravel".into();
    record.set_first_weight(5000.0);
    record.set_second_weight(2000.0);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bills"))
        .and(body_json_string(
            serde_json::to_string(&record).unwrap(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "serial_no": 42,
            "message": "Bill saved",
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server).await;
    let ack = backend.submit(&record).await.unwrap();

    assert_eq!(ack.serial_no, 42);
    assert_eq!(ack.message, "Bill saved");
}

#[tokio::test]
async fn test_submit_failure_surfaces_reason_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bills"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate serial number"))
        .mount(&server)
        .await;

    let backend = backend_for(&server).await;
    let err = backend.submit(&CaptureRecord::default()).await.unwrap_err();

    assert!(err.to_string().contains("duplicate serial number"));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    // Port is bound then released, nothing listens there anymore
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let config = BillingConfig {
        base_url: uri,
        timeout_secs: 1,
    };
    let backend = HttpBillingBackend::new(&config).unwrap();

    assert!(matches!(
        backend.next_serial().await.unwrap_err(),
        BillingError::Transport(_)
    ));
}
