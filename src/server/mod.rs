// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Web server for the telemetry pipeline
//!
//! This module provides the Rocket server tying the pipeline together:
//!
//! - **Ingress endpoint**: authenticated POST receiving readings pushed by
//!   the local relay process
//! - **Subscription endpoint**: one Server-Sent Events stream per browser
//!   session, fed by the broadcast hub
//! - **Point endpoints**: latest reading and stream statistics
//! - **CORS support**: the operator terminals are served from the billing
//!   web application on a different origin
//!
//! The server is configured through the provided `figment` configuration
//! system, allowing customization of the bind address, port and server
//! identity.

pub mod builder;
pub mod cors;
pub mod ingress;
pub mod streaming;

pub use self::builder::build_rocket;

use crate::telemetry::SharedWeightStream;

/// Telemetry state managed by Rocket
///
/// Shared by the ingress and subscription endpoints: the broadcast hub and
/// the secret the relay must present on every pushed reading.
pub struct TelemetryState {
    pub stream: SharedWeightStream,
    pub ingress_secret: String,
}
