// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Billing backend configuration
//!
//! Connection settings for the remote billing REST API used for
//! previous-weight lookups, serial number allocation and bill submission.

use serde::{Deserialize, Serialize};

/// Configuration for the billing backend HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Base URL of the billing REST API.
    ///
    /// Must start with `http://` or `https://`. A trailing slash is
    /// tolerated. Default is "http://127.0.0.1:3000/api".
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds for billing backend calls. Default is 10.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
