// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Relay-side transports
//!
//! This module carries the non-HTTP ends of the pipeline: the TCP bridge
//! that mirrors the event stream for socket subscribers, and the simulated
//! indicator source used when no physical weighbridge is attached.

pub mod simulator;
pub mod tcp;

pub use simulator::IndicatorSimulator;
pub use tcp::run_relay_bridge;
