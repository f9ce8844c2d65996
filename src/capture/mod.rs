// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Two-weight capture workflow
//!
//! Per-operator-session logic that folds the live weight stream and user
//! actions into a completed bill: first (gross) weight, second (tare)
//! weight, derived net weight, with recall of a vehicle's prior readings
//! from the billing backend.

pub mod billing;
pub mod record;
pub mod workflow;

pub use billing::{BillingBackend, BillingError, HttpBillingBackend, SubmitAck};
pub use record::{round3, CaptureRecord, PaymentStatus, PreviousWeightPair};
pub use workflow::{
    CaptureError, CaptureSession, CaptureState, FieldError, LookupOutcome, PreviousWeightChoice,
    SubmitOutcome,
};
