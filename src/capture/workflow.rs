// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Weight capture state machine
//!
//! One [`CaptureSession`] per operator terminal folds the live weight stream
//! and user actions into a bill. The session moves through
//! `Idle -> AwaitingFirstWeight -> AwaitingSecondWeight -> Complete`, with a
//! side channel `ReprintLoaded` entered from `Idle` by loading an existing
//! bill by serial number (the capture states are bypassed entirely since its
//! weights are already known).
//!
//! Entering a vehicle number triggers a previous-weight lookup; when a prior
//! pair exists the operator picks one of three choices, pairing a previous
//! weight with the current live reading or discarding the history. Manual
//! weight entry is always permitted; the state machine never forces the
//! lookup path.
//!
//! The net weight is derived, never set: `CaptureRecord` recomputes
//! `round(|first - second|, 3)` on every weight mutation.

use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;

use chrono::Utc;

use crate::capture::billing::{BillingBackend, BillingError, SubmitAck};
use crate::capture::record::{CaptureRecord, PaymentStatus, PreviousWeightPair};

/// States of the capture workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Fresh session, no vehicle entered yet
    Idle,
    /// Vehicle entered, first weight not yet captured
    AwaitingFirstWeight,
    /// First weight present, second weight pending or under revision
    AwaitingSecondWeight,
    /// Bill submitted, record immutable
    Complete,
    /// An existing bill was loaded by serial number for reprint
    ReprintLoaded,
}

/// Operator choice when a previous weight pair exists for the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousWeightChoice {
    /// Keep the previous first weight, take the live reading as second weight
    UsePreviousFirst,
    /// Keep the previous second weight, take the live reading as first weight
    UsePreviousSecond,
    /// Ignore the history, take the live reading as first weight only
    Discard,
}

/// Outcome of the previous-weight lookup on vehicle entry
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// A prior pair exists; the operator must pick a [`PreviousWeightChoice`]
    Previous(PreviousWeightPair),
    /// No prior record for this vehicle
    NoHistory,
    /// The backend could not be queried; the workflow continues without a
    /// suggestion and the message is shown as a non-fatal notification
    Degraded(String),
}

/// One field-scoped validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// Errors of the capture workflow
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("operation not allowed in state {0:?}")]
    InvalidState(CaptureState),

    #[error("no previous weight pair available")]
    NoPreviousPair,

    #[error("validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("no bill found for serial number {0}")]
    UnknownSerial(u64),

    #[error(transparent)]
    Billing(#[from] BillingError),
}

/// Result of a successful submission
#[derive(Debug)]
pub struct SubmitOutcome {
    /// The finalized, immutable record as persisted
    pub record: CaptureRecord,
    /// The backend's confirmation
    pub ack: SubmitAck,
}

/// Per-operator-session capture workflow
pub struct CaptureSession {
    backend: Arc<dyn BillingBackend>,
    state: CaptureState,
    record: CaptureRecord,
    previous: Option<PreviousWeightPair>,
    /// Manual/offline mode: serial number and timestamp are left for manual
    /// entry instead of being fetched from the backend
    manual_mode: bool,
}

impl CaptureSession {
    /// Create a new session and initialize its first record
    ///
    /// In normal mode the serial number is fetched from the backend and the
    /// creation timestamp is set; a failed fetch degrades to an empty serial
    /// (it can still be entered manually) rather than failing the session.
    /// In manual mode both are left empty for manual entry.
    pub async fn new(backend: Arc<dyn BillingBackend>, manual_mode: bool) -> Self {
        let mut session = Self {
            backend,
            state: CaptureState::Idle,
            record: CaptureRecord::default(),
            previous: None,
            manual_mode,
        };
        session.init_record().await;
        session
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn record(&self) -> &CaptureRecord {
        &self.record
    }

    /// Enter the vehicle number and look up its previous weights
    ///
    /// Allowed from `Idle` only; the session moves to `AwaitingFirstWeight`
    /// regardless of the lookup outcome. A backend failure is contained: the
    /// returned [`LookupOutcome::Degraded`] carries the notification text
    /// and the workflow continues without a suggestion.
    pub async fn enter_vehicle(&mut self, vehicle_no: &str) -> Result<LookupOutcome, CaptureError> {
        if self.state != CaptureState::Idle {
            return Err(CaptureError::InvalidState(self.state));
        }

        self.record.vehicle_no = vehicle_no.trim().to_string();
        self.state = CaptureState::AwaitingFirstWeight;

        match self.backend.previous_weights(vehicle_no.trim()).await {
            Ok(Some(pair)) => {
                self.previous = Some(pair);
                Ok(LookupOutcome::Previous(pair))
            }
            Ok(None) => {
                self.previous = None;
                Ok(LookupOutcome::NoHistory)
            }
            Err(e) => {
                warn!("previous-weight lookup failed for {}: {}", vehicle_no, e);
                self.previous = None;
                Ok(LookupOutcome::Degraded(e.to_string()))
            }
        }
    }

    /// Resolve the previous-weight offer with the current live reading
    ///
    /// Allowed from `AwaitingFirstWeight` right after a lookup. The two
    /// "use previous" choices leave the session with both weights set; the
    /// discard choice uses the live reading for the first weight only.
    pub fn apply_previous_choice(
        &mut self,
        choice: PreviousWeightChoice,
        live_weight: f64,
    ) -> Result<(), CaptureError> {
        if self.state != CaptureState::AwaitingFirstWeight {
            return Err(CaptureError::InvalidState(self.state));
        }

        match choice {
            PreviousWeightChoice::UsePreviousFirst => {
                let pair = self.previous.ok_or(CaptureError::NoPreviousPair)?;
                self.record.set_first_weight(pair.first_weight);
                self.record.set_second_weight(live_weight);
            }
            PreviousWeightChoice::UsePreviousSecond => {
                let pair = self.previous.ok_or(CaptureError::NoPreviousPair)?;
                self.record.set_second_weight(pair.second_weight);
                self.record.set_first_weight(live_weight);
            }
            PreviousWeightChoice::Discard => {
                self.record.set_first_weight(live_weight);
            }
        }

        self.previous = None;
        self.state = CaptureState::AwaitingSecondWeight;
        Ok(())
    }

    /// Fold the current live reading into whichever weight the state awaits
    pub fn capture_live(&mut self, weight: f64) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::AwaitingFirstWeight => {
                self.record.set_first_weight(weight);
                self.state = CaptureState::AwaitingSecondWeight;
                Ok(())
            }
            CaptureState::AwaitingSecondWeight => {
                self.record.set_second_weight(weight);
                Ok(())
            }
            other => Err(CaptureError::InvalidState(other)),
        }
    }

    /// Manually set the first weight
    ///
    /// Permitted in every state except `Complete`; the state machine never
    /// forces the lookup path.
    pub fn set_first_weight(&mut self, weight: f64) -> Result<(), CaptureError> {
        if self.state == CaptureState::Complete {
            return Err(CaptureError::InvalidState(self.state));
        }
        self.record.set_first_weight(weight);
        if matches!(
            self.state,
            CaptureState::Idle | CaptureState::AwaitingFirstWeight
        ) {
            self.state = CaptureState::AwaitingSecondWeight;
        }
        Ok(())
    }

    /// Manually set the second weight
    pub fn set_second_weight(&mut self, weight: f64) -> Result<(), CaptureError> {
        if self.state == CaptureState::Complete {
            return Err(CaptureError::InvalidState(self.state));
        }
        self.record.set_second_weight(weight);
        Ok(())
    }

    /// Manually set the vehicle number without triggering a lookup
    pub fn set_vehicle_no(&mut self, vehicle_no: &str) -> Result<(), CaptureError> {
        if self.state == CaptureState::Complete {
            return Err(CaptureError::InvalidState(self.state));
        }
        self.record.vehicle_no = vehicle_no.trim().to_string();
        Ok(())
    }

    pub fn set_party_name(&mut self, party_name: &str) -> Result<(), CaptureError> {
        if self.state == CaptureState::Complete {
            return Err(CaptureError::InvalidState(self.state));
        }
        self.record.party_name = party_name.trim().to_string();
        Ok(())
    }

    pub fn set_material_name(&mut self, material_name: &str) -> Result<(), CaptureError> {
        if self.state == CaptureState::Complete {
            return Err(CaptureError::InvalidState(self.state));
        }
        self.record.material_name = material_name.trim().to_string();
        Ok(())
    }

    pub fn set_payment_status(&mut self, status: PaymentStatus) -> Result<(), CaptureError> {
        if self.state == CaptureState::Complete {
            return Err(CaptureError::InvalidState(self.state));
        }
        self.record.payment_status = status;
        Ok(())
    }

    /// Manually set the serial number (offline mode)
    pub fn set_serial_no(&mut self, serial_no: u64) -> Result<(), CaptureError> {
        if self.state == CaptureState::Complete {
            return Err(CaptureError::InvalidState(self.state));
        }
        self.record.serial_no = Some(serial_no);
        Ok(())
    }

    /// Load an existing bill by serial number for reprint
    ///
    /// Bypasses the capture states entirely since the weights are already
    /// known. Allowed from `Idle` only.
    pub async fn load_for_reprint(&mut self, serial_no: u64) -> Result<&CaptureRecord, CaptureError> {
        if self.state != CaptureState::Idle {
            return Err(CaptureError::InvalidState(self.state));
        }

        match self.backend.load_bill(serial_no).await? {
            Some(record) => {
                self.record = record;
                self.state = CaptureState::ReprintLoaded;
                Ok(&self.record)
            }
            None => Err(CaptureError::UnknownSerial(serial_no)),
        }
    }

    /// Validate and submit the current record to the billing backend
    ///
    /// On validation failure the session stays exactly where it is and the
    /// error lists every offending field. On backend failure the reason is
    /// surfaced verbatim and the bill stays editable. On success the
    /// finalized record is returned and a fresh `Idle` session is
    /// initialized (serial number and timestamp left for manual entry in
    /// manual mode).
    pub async fn submit(&mut self) -> Result<SubmitOutcome, CaptureError> {
        if matches!(
            self.state,
            CaptureState::Complete | CaptureState::ReprintLoaded
        ) {
            return Err(CaptureError::InvalidState(self.state));
        }

        let errors = self.validate();
        if !errors.is_empty() {
            return Err(CaptureError::Validation(errors));
        }

        self.record.finalized_at = Some(Utc::now());
        let ack = match self.backend.submit(&self.record).await {
            Ok(ack) => ack,
            Err(e) => {
                // Keep the bill editable, surface the backend's reason verbatim
                self.record.finalized_at = None;
                return Err(CaptureError::Billing(e));
            }
        };

        let mut finalized = self.record.clone();
        finalized.serial_no = Some(ack.serial_no);
        self.state = CaptureState::Complete;
        info!(
            "bill {} submitted for vehicle {}",
            ack.serial_no, finalized.vehicle_no
        );

        self.reset().await;

        Ok(SubmitOutcome {
            record: finalized,
            ack,
        })
    }

    /// Discard the current record and start a fresh `Idle` session
    pub async fn reset(&mut self) {
        self.record = CaptureRecord::default();
        self.previous = None;
        self.state = CaptureState::Idle;
        self.init_record().await;
    }

    async fn init_record(&mut self) {
        if self.manual_mode {
            // Serial number and timestamp are left for manual entry
            return;
        }

        self.record.created_at = Some(Utc::now());
        match self.backend.next_serial().await {
            Ok(serial_no) => self.record.serial_no = Some(serial_no),
            Err(e) => {
                // Degraded mode: the serial can still be entered manually
                warn!("serial number fetch failed: {}", e);
            }
        }
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.record.vehicle_no.trim().is_empty() {
            errors.push(FieldError::new("vehicle_no", "vehicle number is required"));
        }
        if self.record.party_name.trim().is_empty() {
            errors.push(FieldError::new("party_name", "party name is required"));
        }
        if self.record.material_name.trim().is_empty() {
            errors.push(FieldError::new("material_name", "material name is required"));
        }

        match self.record.first_weight() {
            None => errors.push(FieldError::new("first_weight", "first weight is required")),
            Some(w) if w < 0.0 => errors.push(FieldError::new(
                "first_weight",
                "first weight must be a non-negative number",
            )),
            Some(_) => {}
        }
        match self.record.second_weight() {
            None => errors.push(FieldError::new("second_weight", "second weight is required")),
            Some(w) if w < 0.0 => errors.push(FieldError::new(
                "second_weight",
                "second weight must be a non-negative number",
            )),
            Some(_) => {}
        }

        errors
    }
}
