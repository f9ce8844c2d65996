// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Telemetry web server configuration
//!
//! This module defines the structure for configuring the web server that
//! receives pushed readings from the relay and streams them out to browser
//! sessions.

use serde::{Deserialize, Serialize};

/// Configuration for the telemetry web server.
///
/// This structure contains the network binding parameters for the Rocket
/// server, the shared secret expected on the ingress endpoint, and the
/// per-session channel capacity used by the broadcast hub.
///
/// ### Ingress authentication
///
/// The relay authenticates each pushed reading with a shared secret carried
/// in the request body. The secret is compared in constant time; a mismatch
/// is rejected at the boundary and never reaches the broadcast hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The TCP port the telemetry server will listen on.
    ///
    /// Valid range is 1-65534. Default value is 8080.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The network address the server will bind to.
    ///
    /// Can be an IPv4/IPv6 address or a hostname. Default is "127.0.0.1".
    /// Use "0.0.0.0" to bind to all IPv4 interfaces.
    #[serde(default = "default_address")]
    pub address: String,

    /// The server name reported in HTTP headers and logs.
    ///
    /// Default is "WeighbridgeTelemetryServer/" followed by the package version.
    #[serde(default = "default_name")]
    pub name: String,

    /// Shared secret expected on every reading pushed by the relay.
    ///
    /// The default value is a placeholder and must be replaced with a
    /// strong, randomly generated value in production deployments.
    #[serde(default = "default_ingress_secret")]
    pub ingress_secret: String,

    /// Capacity of each subscriber session's reading channel.
    ///
    /// A session that falls this many readings behind starts losing frames
    /// (counted in the stream statistics). Default is 64.
    #[serde(default = "default_session_buffer")]
    pub session_buffer: usize,

    /// Enable or disable the telemetry server.
    ///
    /// This flag can be used to easily enable or disable the server
    /// without removing the configuration. Default is `true`.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Provides the default TCP port (8080) for the telemetry server.
fn default_port() -> u16 {
    8080
}

/// Provides the default network binding address (127.0.0.1).
///
/// This loopback address ensures the server only accepts connections from the
/// local machine. For deployments where the weighbridge operator terminals
/// run on other hosts, this should be changed to "0.0.0.0" or a specific
/// network interface.
fn default_address() -> String {
    "127.0.0.1".to_string()
}

/// Generates the default server name string based on the current package version.
fn default_name() -> String {
    format!("WeighbridgeTelemetryServer/{}", env!("CARGO_PKG_VERSION"))
}

/// Provides the default shared secret for the ingress endpoint.
///
/// This value is a development placeholder; production installations must
/// configure their own secret shared with the relay process.
fn default_ingress_secret() -> String {
    "my-super-secret-relay-key-for-weighbridge-app".to_string()
}

/// Provides the default per-session channel capacity.
fn default_session_buffer() -> usize {
    64
}

/// Provides the default enabled state for the telemetry server.
fn default_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            address: default_address(),
            name: default_name(),
            ingress_secret: default_ingress_secret(),
            session_buffer: default_session_buffer(),
            enabled: default_enabled(),
        }
    }
}
