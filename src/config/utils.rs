// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides validation helpers for configuration settings that
//! cannot be expressed through serde defaults alone.

use anyhow::Result;
use log::debug;

use super::Config;

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
///
/// ### Arguments
///
/// * `addr` - The address string to validate
///
/// ### Returns
///
/// `true` if the address is valid, `false` otherwise
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    // Special cases
    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against rules that aren't covered by serde.
///
/// ### Arguments
///
/// * `config` - The configuration object to validate
///
/// ### Returns
///
/// * `Ok(())` if all validations pass
/// * `Err(anyhow::Error)` with a descriptive message if any validation fails
///
/// ### Validation Rules
///
/// This function validates:
///
/// - **Port ranges**: the server and relay bridge ports must be within 1-65534
/// - **Address format**: binding addresses are checked for a valid IP shape
///   (warning only, hostnames are allowed through)
/// - **Ingress secret**: must be non-empty, the relay cannot authenticate
///   against an empty secret
/// - **Marker token**: must be non-empty, the parser cannot anchor on an
///   empty marker
/// - **Billing URL**: must start with `http://` or `https://`
/// - **Timers and buffers**: billing timeout, simulator interval and session
///   buffer capacity must be non-zero
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    // Check value ranges for certain fields
    if config.server.port < 1 || config.server.port > 65534 {
        anyhow::bail!("Invalid port number: {}", config.server.port);
    }
    if config.indicator.relay_port < 1 || config.indicator.relay_port > 65534 {
        anyhow::bail!("Invalid relay port number: {}", config.indicator.relay_port);
    }

    // Check if the addresses are in a valid format
    if !is_valid_ip_address(&config.server.address) {
        debug!(
            "Potentially invalid address format: {}",
            config.server.address
        );
        // Just issue a warning but don't block
    }
    if !is_valid_ip_address(&config.indicator.relay_address) {
        debug!(
            "Potentially invalid relay address format: {}",
            config.indicator.relay_address
        );
    }

    if config.server.ingress_secret.is_empty() {
        anyhow::bail!("Ingress secret must not be empty");
    }

    if config.server.session_buffer == 0 {
        anyhow::bail!("Session buffer capacity must be greater than zero");
    }

    if config.indicator.marker.is_empty() {
        anyhow::bail!("Indicator marker token must not be empty");
    }

    if config.indicator.sim_interval_ms == 0 {
        anyhow::bail!("Simulator interval must be greater than zero");
    }

    if !config.billing.base_url.starts_with("http://")
        && !config.billing.base_url.starts_with("https://")
    {
        anyhow::bail!(
            "Invalid billing base URL: must start with http:// or https://, got {}",
            config.billing.base_url
        );
    }

    if config.billing.timeout_secs == 0 {
        anyhow::bail!("Billing timeout must be greater than zero");
    }

    Ok(())
}
