// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Weight streaming API endpoints
//!
//! This module provides the HTTP endpoints for streaming live weight
//! readings to browser sessions in real-time using Server-Sent Events (SSE),
//! plus point queries for the latest reading and stream statistics.

use rocket::futures::stream::Stream;
use rocket::response::stream::{Event, EventStream};
use rocket::serde::json::Json;
use rocket::{get, State};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

use crate::server::TelemetryState;
use crate::telemetry::{RawReading, ReadingConsumer, StreamStats};

/// Seconds of silence before a heartbeat event is emitted
const HEARTBEAT_SECS: u64 = 5;

/// Response structure for one published reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingResponse {
    /// Raw payload exactly as pushed by the relay
    pub value: String,
    /// Timestamp when the reading was published (milliseconds since epoch)
    pub timestamp: u64,
    /// Sequential publish number
    pub seq: u64,
}

impl From<RawReading> for ReadingResponse {
    fn from(reading: RawReading) -> Self {
        Self {
            value: reading.value,
            timestamp: reading.timestamp,
            seq: reading.seq,
        }
    }
}

/// Stream live weight readings via Server-Sent Events
///
/// Registers a new session with the broadcast hub and emits each published
/// value as one event frame carrying the raw payload as text, exactly as the
/// relay pushed it; the reading parser runs on the subscriber side.
///
/// The transport stays open until the client disconnects, which is the only
/// cleanup trigger: dropping the stream unregisters the session. A heartbeat
/// event is sent after 5 seconds of silence so intermediaries do not time
/// the connection out.
///
/// ### Response Format
///
/// ```text
/// data: ST,GS,N+012345.67
///
/// data: {"type":"heartbeat"}
/// ```
#[get("/api/stream/weight")]
pub fn stream_weight(state: &State<TelemetryState>) -> EventStream<impl Stream<Item = Event>> {
    let stream = state.stream.clone();

    EventStream! {
        let mut consumer = ReadingConsumer::new(&stream);
        log::debug!("weight stream opened for session {}", consumer.session_id());

        loop {
            match timeout(Duration::from_secs(HEARTBEAT_SECS), consumer.next_reading()).await {
                Ok(Some(reading)) => {
                    yield Event::data(reading.value);
                },
                Ok(None) => {
                    log::info!("weight stream closed");
                    break;
                },
                Err(_) => {
                    yield Event::data(r#"{"type":"heartbeat"}"#);
                }
            }
        }
    }
}

/// Get the latest published reading
///
/// Returns the most recent reading without subscribing to the stream.
/// Useful for populating the display before the first live frame arrives,
/// or for testing connectivity. Responds 404 while nothing has been
/// published yet.
#[get("/api/weight/latest")]
pub fn get_latest_reading(state: &State<TelemetryState>) -> Option<Json<ReadingResponse>> {
    state.stream.get_latest().map(|reading| Json(reading.into()))
}

/// Get weight stream statistics
///
/// Returns information about the stream including publish counts, dropped
/// sends and the number of active subscriber sessions.
#[get("/api/stream/stats")]
pub fn get_stream_stats(state: &State<TelemetryState>) -> Json<StreamStats> {
    Json(state.stream.get_stats())
}
