// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Weighbridge indicator configuration
//!
//! Settings describing the physical indicator's wire protocol (the marker
//! token readings are anchored to), the TCP relay bridge transport, and the
//! simulated indicator source used for development and testing.

use serde::{Deserialize, Serialize};

/// Configuration for the weighbridge indicator and its transports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// Marker token preceding the weight digits in a raw indicator frame.
    ///
    /// The parser anchors on the LAST occurrence of this token, so frames
    /// with leading noise still yield the trailing reading. Default is "N+".
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Enable the TCP relay bridge transport.
    ///
    /// When enabled, every published reading is also emitted as one line per
    /// connected socket client, mirroring the event stream endpoint for UI
    /// variants that subscribe over a plain socket. Default is `true`.
    #[serde(default = "default_relay_enabled")]
    pub relay_enabled: bool,

    /// Address the relay bridge listens on. Default is "127.0.0.1".
    #[serde(default = "default_relay_address")]
    pub relay_address: String,

    /// Port the relay bridge listens on. Default is 4000.
    #[serde(default = "default_relay_port")]
    pub relay_port: u16,

    /// Publish synthetic indicator frames instead of waiting for a relay.
    ///
    /// Intended for development and demos without a physical weighbridge.
    /// Default is `false`.
    #[serde(default = "default_simulated")]
    pub simulated: bool,

    /// Interval between simulated frames in milliseconds. Default is 500.
    #[serde(default = "default_sim_interval_ms")]
    pub sim_interval_ms: u64,
}

/// Default marker token of the indicator protocol.
fn default_marker() -> String {
    "N+".to_string()
}

fn default_relay_enabled() -> bool {
    true
}

fn default_relay_address() -> String {
    "127.0.0.1".to_string()
}

/// Default relay bridge port, matching the stock relay configuration.
fn default_relay_port() -> u16 {
    4000
}

fn default_simulated() -> bool {
    false
}

fn default_sim_interval_ms() -> u64 {
    500
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            relay_enabled: default_relay_enabled(),
            relay_address: default_relay_address(),
            relay_port: default_relay_port(),
            simulated: default_simulated(),
            sim_interval_ms: default_sim_interval_ms(),
        }
    }
}
