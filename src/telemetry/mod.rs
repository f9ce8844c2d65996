// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Telemetry core
//!
//! This module holds the two leaf components of the pipeline: the reading
//! parser, which turns a raw indicator payload into a validated weight, and
//! the shared weight stream, which fans published readings out to every
//! registered subscriber session.

pub mod parser;
pub mod stream;

pub use parser::{parse_reading, ReadingError};
pub use stream::{
    RawReading, ReadingConsumer, SessionId, SharedWeightStream, StreamStats, WeightSubscription,
};
