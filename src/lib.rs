// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Live weight telemetry pipeline for a weighbridge billing system
//!
//! This crate implements the real-time side of a weighbridge installation:
//! a local relay process pushes raw indicator readings to an authenticated
//! ingress endpoint, a broadcast hub fans every reading out to all connected
//! browser sessions over Server-Sent Events, and a per-session capture
//! workflow folds the live stream into a two-weight record (first/gross,
//! second/tare, derived net weight) that is submitted to the billing backend.
//!
//! ## Modules
//!
//! - [`telemetry`] - reading parser and the shared broadcast stream (hub)
//! - [`server`] - Rocket server: ingress, SSE subscription, point endpoints
//! - [`relay`] - TCP bridge transport and the simulated indicator source
//! - [`capture`] - two-weight capture state machine and billing backend client
//! - [`config`] - YAML configuration with CLI overrides
//! - [`daemon`] - background task orchestration and graceful shutdown

pub mod capture;
pub mod config;
pub mod daemon;
pub mod relay;
pub mod server;
pub mod telemetry;
