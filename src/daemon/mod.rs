// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Daemon management module
//!
//! This module provides functionality for running and managing the
//! application's background tasks: the telemetry web server, the TCP relay
//! bridge, the simulated indicator and the heartbeat monitor. The daemon
//! system allows for graceful startup and shutdown of these services, with
//! proper error handling and task coordination.

pub mod launch_daemon;

pub use launch_daemon::Daemon;
