// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Application configuration
//!
//! This module defines the YAML configuration for the telemetry server,
//! split into per-component sections: the web server (ingress and
//! subscription endpoints), the weighbridge indicator (marker token, relay
//! bridge, simulator) and the billing backend client.

mod billing;
mod indicator;
mod server;
pub mod utils;

pub use billing::BillingConfig;
pub use indicator::IndicatorConfig;
pub use server::ServerConfig;
pub use utils::validate_specific_rules;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration for the telemetry server
///
/// Every section is optional in the YAML file; missing sections fall back to
/// their per-field defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Web server settings (ingress and subscription endpoints)
    #[serde(default)]
    pub server: ServerConfig,

    /// Weighbridge indicator settings (marker token, relay bridge, simulator)
    #[serde(default)]
    pub indicator: IndicatorConfig,

    /// Billing backend client settings
    #[serde(default)]
    pub billing: BillingConfig,
}

impl Config {
    /// Load and validate a configuration from a YAML file
    ///
    /// ### Parameters
    ///
    /// * `path` - Path to the YAML configuration file
    ///
    /// ### Returns
    ///
    /// The parsed configuration, or an error if the file cannot be read,
    /// is not valid YAML, or fails the additional validation rules.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = serde_yml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        validate_specific_rules(&config)?;

        Ok(config)
    }

    /// Apply command line overrides on top of the loaded configuration
    pub fn apply_args(
        &mut self,
        port: Option<u16>,
        address: Option<String>,
        ingress_secret: Option<String>,
        server_enabled: bool,
    ) {
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(address) = address {
            self.server.address = address;
        }
        if let Some(secret) = ingress_secret {
            self.server.ingress_secret = secret;
        }
        self.server.enabled = server_enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.indicator.marker, "N+");
        assert!(!config.indicator.simulated);
    }

    #[test]
    fn test_partial_file_overrides_one_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 9090\n  ingress_secret: relay-secret\nindicator:\n  relay_port: 4100"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.ingress_secret, "relay-secret");
        assert_eq!(config.indicator.relay_port, 4100);
        // Untouched sections keep defaults
        assert_eq!(config.billing.timeout_secs, 10);
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not a map").unwrap();

        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_apply_args_overrides() {
        let mut config = Config::default();
        config.apply_args(Some(9000), Some("0.0.0.0".into()), Some("cli".into()), true);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.address, "0.0.0.0");
        assert_eq!(config.server.ingress_secret, "cli");
        assert!(config.server.enabled);
    }
}
