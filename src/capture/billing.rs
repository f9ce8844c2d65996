// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Billing backend client
//!
//! The capture workflow talks to the remote billing REST API through the
//! [`BillingBackend`] trait: previous-weight lookup by vehicle number,
//! serial number allocation, bill loading for reprint and bill submission.
//! The production implementation is [`HttpBillingBackend`] over `reqwest`;
//! tests substitute a mock.
//!
//! Backend failures are never fatal to the capture workflow: a lookup error
//! degrades to "no suggestion", a submission error is surfaced verbatim to
//! the operator and the bill stays editable.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::capture::record::{CaptureRecord, PreviousWeightPair};
use crate::config::BillingConfig;

/// Errors from the billing backend
#[derive(Debug, Error)]
pub enum BillingError {
    /// The backend answered with a non-success status; the message is the
    /// response body, surfaced verbatim to the operator
    #[error("billing backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// The backend could not be reached at all
    #[error("billing backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Confirmation returned by the backend for a persisted bill
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAck {
    pub serial_no: u64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct SerialResponse {
    serial_no: u64,
}

/// Remote operations the capture workflow needs from the billing system
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingBackend: Send + Sync {
    /// Most recent prior first/second weight pair for a vehicle, if any
    async fn previous_weights(
        &self,
        vehicle_no: &str,
    ) -> Result<Option<PreviousWeightPair>, BillingError>;

    /// Allocate the serial number for the next bill
    async fn next_serial(&self) -> Result<u64, BillingError>;

    /// Load an existing bill by serial number (for reprint)
    async fn load_bill(&self, serial_no: u64) -> Result<Option<CaptureRecord>, BillingError>;

    /// Persist a finalized bill
    async fn submit(&self, record: &CaptureRecord) -> Result<SubmitAck, BillingError>;
}

/// HTTP implementation of [`BillingBackend`] against the billing REST API
pub struct HttpBillingBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBillingBackend {
    /// Create a client from the billing configuration
    pub fn new(config: &BillingConfig) -> Result<Self, BillingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn error_from(response: reqwest::Response) -> BillingError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        BillingError::Backend { status, message }
    }
}

#[async_trait]
impl BillingBackend for HttpBillingBackend {
    async fn previous_weights(
        &self,
        vehicle_no: &str,
    ) -> Result<Option<PreviousWeightPair>, BillingError> {
        let url = format!("{}/weights/previous/{}", self.base_url, vehicle_no);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            _ => Err(Self::error_from(response).await),
        }
    }

    async fn next_serial(&self) -> Result<u64, BillingError> {
        let url = format!("{}/bills/next-serial", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let serial: SerialResponse = response.json().await?;
        Ok(serial.serial_no)
    }

    async fn load_bill(&self, serial_no: u64) -> Result<Option<CaptureRecord>, BillingError> {
        let url = format!("{}/bills/{}", self.base_url, serial_no);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            _ => Err(Self::error_from(response).await),
        }
    }

    async fn submit(&self, record: &CaptureRecord) -> Result<SubmitAck, BillingError> {
        let url = format!("{}/bills", self.base_url);
        let response = self.client.post(&url).json(record).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(response.json().await?)
    }
}
