// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Integration tests for the ingress and point endpoints

use rocket::config::LogLevel;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use weighbridge_telemetry::config::Config;
use weighbridge_telemetry::server::build_rocket;
use weighbridge_telemetry::telemetry::{ReadingConsumer, SharedWeightStream};

const TEST_SECRET: &str = "test-relay-secret-with-sufficient-length";

fn get_figment() -> rocket::figment::Figment {
    rocket::Config::figment()
        .merge(("port", 0))
        .merge(("address", "127.0.0.1"))
        .merge(("log_level", LogLevel::Off))
}

async fn test_client(stream: SharedWeightStream) -> Client {
    let mut config = Config::default();
    config.server.ingress_secret = TEST_SECRET.to_string();

    let rocket = build_rocket(get_figment(), Arc::new(config), stream).await;
    Client::tracked(rocket).await.expect("valid rocket instance")
}

#[rocket::async_test]
async fn test_wrong_secret_is_rejected_and_never_reaches_the_hub() {
    let stream = SharedWeightStream::new(8);
    let mut consumer = ReadingConsumer::new(&stream);
    let client = test_client(stream.clone()).await;

    let response = client
        .post("/api/weight")
        .header(ContentType::JSON)
        .body(json!({"value": "N+012345.67", "secret": "wrong-secret"}).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Unauthorized);
    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["message"], "Unauthorized");

    // The hub saw zero publishes and the subscriber received nothing
    assert_eq!(stream.get_stats().total_published, 0);
    assert!(stream.get_latest().is_none());
    assert!(timeout(Duration::from_millis(50), consumer.next_reading())
        .await
        .is_err());
}

#[rocket::async_test]
async fn test_valid_push_is_broadcast_to_prior_subscribers_only() {
    let stream = SharedWeightStream::new(8);
    let mut early1 = ReadingConsumer::new(&stream);
    let mut early2 = ReadingConsumer::new(&stream);
    let client = test_client(stream.clone()).await;

    let response = client
        .post("/api/weight")
        .header(ContentType::JSON)
        .body(json!({"value": "N+012345.67", "secret": TEST_SECRET}).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["message"], "Broadcasted");

    // Both prior subscribers receive the value exactly once
    assert_eq!(early1.next_reading().await.unwrap().value, "N+012345.67");
    assert_eq!(early2.next_reading().await.unwrap().value, "N+012345.67");

    // A subscriber opened after the publish receives nothing from it
    let mut late = ReadingConsumer::new(&stream);
    assert!(timeout(Duration::from_millis(50), late.next_reading())
        .await
        .is_err());
}

#[rocket::async_test]
async fn test_malformed_values_pass_through_unvalidated() {
    let stream = SharedWeightStream::new(8);
    let mut consumer = ReadingConsumer::new(&stream);
    let client = test_client(stream.clone()).await;

    // Ingress does no shape validation; filtering is the subscriber-side
    // parser's job
    let response = client
        .post("/api/weight")
        .header(ContentType::JSON)
        .body(json!({"value": "garbage-frame", "secret": TEST_SECRET}).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(consumer.next_reading().await.unwrap().value, "garbage-frame");
}

#[rocket::async_test]
async fn test_latest_reading_endpoint() {
    let stream = SharedWeightStream::new(8);
    let client = test_client(stream.clone()).await;

    // Nothing published yet
    let response = client.get("/api/weight/latest").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    client
        .post("/api/weight")
        .header(ContentType::JSON)
        .body(json!({"value": "N+004500.25", "secret": TEST_SECRET}).to_string())
        .dispatch()
        .await;

    let response = client.get("/api/weight/latest").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["value"], "N+004500.25");
    assert_eq!(body["seq"], 1);
}

#[rocket::async_test]
async fn test_stream_stats_endpoint() {
    let stream = SharedWeightStream::new(8);
    let _consumer = ReadingConsumer::new(&stream);
    let client = test_client(stream.clone()).await;

    for _ in 0..3 {
        client
            .post("/api/weight")
            .header(ContentType::JSON)
            .body(json!({"value": "N+000100.0", "secret": TEST_SECRET}).to_string())
            .dispatch()
            .await;
    }

    let response = client.get("/api/stream/stats").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["total_published"], 3);
    assert_eq!(body["active_sessions"], 1);
    assert_eq!(body["dropped_sends"], 0);
}

#[rocket::async_test]
async fn test_cors_preflight_is_accepted() {
    let stream = SharedWeightStream::new(8);
    let client = test_client(stream).await;

    let response = client.options("/api/weight").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response
            .headers()
            .get_one("Access-Control-Allow-Origin")
            .unwrap(),
        "*"
    );
}
