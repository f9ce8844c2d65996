// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Capture record types
//!
//! The in-progress or finalized first/second/net-weight record for one
//! vehicle visit, plus the read-only previous-weight snapshot returned by
//! the billing backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Round a weight to three decimal places
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Payment status of a bill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Paid,
    Credit,
}

/// The most recent prior first/second weight pair of a vehicle
///
/// Read-only snapshot fetched on demand from the billing backend; never
/// persisted locally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviousWeightPair {
    pub first_weight: f64,
    pub second_weight: f64,
}

/// One vehicle visit's weight record
///
/// Created when the operator starts a new bill, mutated as weights are
/// captured or a previous bill is loaded for reprint, immutable once
/// submitted.
///
/// The net weight is a derived value: it is recomputed as
/// `round(|first - second|, 3)` whenever either weight changes and cannot be
/// set independently, which is why the weight fields are only reachable
/// through accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    /// Serial number assigned by the billing backend (or entered manually
    /// in offline mode)
    pub serial_no: Option<u64>,
    pub vehicle_no: String,
    pub party_name: String,
    pub material_name: String,
    first_weight: Option<f64>,
    second_weight: Option<f64>,
    net_weight: Option<f64>,
    pub payment_status: PaymentStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl CaptureRecord {
    pub fn first_weight(&self) -> Option<f64> {
        self.first_weight
    }

    pub fn second_weight(&self) -> Option<f64> {
        self.second_weight
    }

    /// The derived net weight, present once both weights are set
    pub fn net_weight(&self) -> Option<f64> {
        self.net_weight
    }

    pub fn set_first_weight(&mut self, weight: f64) {
        self.first_weight = Some(weight);
        self.recompute_net();
    }

    pub fn set_second_weight(&mut self, weight: f64) {
        self.second_weight = Some(weight);
        self.recompute_net();
    }

    fn recompute_net(&mut self) {
        self.net_weight = match (self.first_weight, self.second_weight) {
            (Some(first), Some(second)) => Some(round3((first - second).abs())),
            _ => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_net_weight_is_absolute_difference() {
        let mut record = CaptureRecord::default();
        record.set_first_weight(5000.0);
        record.set_second_weight(2000.0);
        assert_relative_eq!(record.net_weight().unwrap(), 3000.0);
    }

    #[test]
    fn test_net_weight_is_order_independent() {
        let mut record = CaptureRecord::default();
        record.set_first_weight(2000.0);
        record.set_second_weight(5000.0);
        assert_relative_eq!(record.net_weight().unwrap(), 3000.0);
    }

    #[test]
    fn test_net_weight_recomputed_on_every_change() {
        let mut record = CaptureRecord::default();
        record.set_first_weight(4800.0);
        assert!(record.net_weight().is_none());

        record.set_second_weight(1250.0);
        assert_relative_eq!(record.net_weight().unwrap(), 3550.0);

        record.set_second_weight(1200.0);
        assert_relative_eq!(record.net_weight().unwrap(), 3600.0);
    }

    #[test]
    fn test_net_weight_rounds_to_three_decimals() {
        let mut record = CaptureRecord::default();
        record.set_first_weight(10.0005);
        record.set_second_weight(0.0001);
        assert_relative_eq!(record.net_weight().unwrap(), 10.0);

        assert_relative_eq!(round3(3.0004999), 3.0);
        assert_relative_eq!(round3(3.0006), 3.001);
    }
}
