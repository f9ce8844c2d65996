// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Indicator reading parser
//!
//! A weighbridge indicator emits a continuous, noisy serial stream. Each
//! useful frame carries the current weight as six decimal digits anchored
//! behind a marker token, followed by a fractional part the billing side
//! does not use (e.g. `"...N+012345.67"` carries the weight `12345`).
//!
//! Transient malformed frames are expected; callers discard rejections
//! silently, keep the previously accepted weight, and leave a debug log
//! trail only.

use log::debug;
use thiserror::Error;

/// Number of digits a weight token carries on the wire.
pub const WEIGHT_DIGITS: usize = 6;

/// Reasons a raw indicator payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadingError {
    /// The marker token does not occur anywhere in the payload.
    #[error("marker token not found in payload")]
    MarkerMissing,

    /// The candidate token contains something other than decimal digits.
    #[error("weight token is not purely numeric")]
    NotNumeric,

    /// The candidate token does not have exactly six digits.
    #[error("weight token has {0} digits instead of {WEIGHT_DIGITS}")]
    WrongLength(usize),
}

/// Parse a raw indicator payload into a weight value.
///
/// The algorithm follows the indicator's wire contract:
///
/// 1. locate the substring following the LAST occurrence of `marker`
///    (frames often contain stale fragments before the current one),
/// 2. take the portion before the first decimal point,
/// 3. strip all whitespace,
/// 4. accept only a non-empty, purely numeric token of exactly six digits.
///
/// ### Parameters
///
/// * `raw` - The raw payload as received from the relay
/// * `marker` - The marker token weights are anchored to (see
///   `IndicatorConfig::marker`)
///
/// ### Returns
///
/// The integer weight value, or a [`ReadingError`] describing why the frame
/// was rejected. Rejections are logged at debug level and carry no
/// user-visible consequence.
pub fn parse_reading(raw: &str, marker: &str) -> Result<u32, ReadingError> {
    let start = match raw.rfind(marker) {
        Some(idx) => idx + marker.len(),
        None => {
            debug!("discarding frame without marker {:?}: {:?}", marker, raw);
            return Err(ReadingError::MarkerMissing);
        }
    };

    let tail = &raw[start..];
    let token: String = tail
        .split('.')
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        debug!("discarding non-numeric frame: {:?}", raw);
        return Err(ReadingError::NotNumeric);
    }

    if token.len() != WEIGHT_DIGITS {
        debug!(
            "discarding frame with {} digit token: {:?}",
            token.len(),
            raw
        );
        return Err(ReadingError::WrongLength(token.len()));
    }

    // Six decimal digits always fit in u32
    token.parse::<u32>().map_err(|_| ReadingError::NotNumeric)
}
