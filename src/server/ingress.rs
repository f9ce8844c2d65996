// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Ingress endpoint
//!
//! Receives readings pushed by the local relay process and forwards them to
//! the broadcast hub. The relay authenticates with a shared secret carried
//! in the request body; a mismatch is rejected at the boundary with a fixed
//! 401 response and never reaches the hub.
//!
//! The reading's shape is NOT validated here: validation is the reading
//! parser's job, executed by each subscriber independently, so malformed
//! frames travel through the hub and are filtered downstream.

use log::{debug, warn};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{post, State};
use serde::{Deserialize, Serialize};

use crate::server::TelemetryState;

/// One reading pushed by the relay
#[derive(Debug, Deserialize)]
pub struct IngressRequest {
    /// Raw indicator payload, forwarded verbatim
    pub value: String,
    /// Shared secret configured on both the relay and this server
    pub secret: String,
}

/// Fixed-shape ingress response
#[derive(Debug, Serialize)]
pub struct IngressResponse {
    pub message: String,
}

/// Compare two secrets without short-circuiting on the first mismatch
///
/// The comparison touches every byte of the presented secret regardless of
/// where the first difference occurs, so response timing does not leak the
/// matching prefix length.
fn constant_time_eq(presented: &str, expected: &str) -> bool {
    let presented = presented.as_bytes();
    let expected = expected.as_bytes();

    let mut diff = presented.len() ^ expected.len();
    for i in 0..presented.len().max(expected.len()) {
        let a = presented.get(i).copied().unwrap_or(0);
        let b = expected.get(i).copied().unwrap_or(0);
        diff |= (a ^ b) as usize;
    }
    diff == 0
}

/// Accept one pushed reading from the relay
///
/// ### Request
///
/// `POST /api/weight` with body `{ "value": "<raw reading>", "secret": "<string>" }`
///
/// ### Responses
///
/// * `200` `{"message": "Broadcasted"}` - the value was handed to the hub
/// * `401` `{"message": "Unauthorized"}` - secret mismatch, hub untouched
#[post("/api/weight", format = "json", data = "<request>")]
pub fn push_weight(
    request: Json<IngressRequest>,
    state: &State<TelemetryState>,
) -> (Status, Json<IngressResponse>) {
    let request = request.into_inner();

    if !constant_time_eq(&request.secret, &state.ingress_secret) {
        warn!("ingress rejected: secret mismatch");
        return (
            Status::Unauthorized,
            Json(IngressResponse {
                message: "Unauthorized".to_string(),
            }),
        );
    }

    debug!("broadcasting reading: {:?}", request.value);
    state.stream.publish(request.value);

    (
        Status::Ok,
        Json(IngressResponse {
            message: "Broadcasted".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq_matches_equal_secrets() {
        assert!(constant_time_eq("relay-secret", "relay-secret"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn test_constant_time_eq_rejects_differences() {
        assert!(!constant_time_eq("relay-secret", "relay-secreT"));
        assert!(!constant_time_eq("relay-secret", "relay-secret-longer"));
        assert!(!constant_time_eq("relay", "relay-secret"));
        assert!(!constant_time_eq("", "relay-secret"));
    }
}
