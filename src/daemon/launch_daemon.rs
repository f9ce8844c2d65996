// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Daemon lifecycle
//!
//! The daemon system uses Tokio's asynchronous runtime to manage concurrent
//! tasks. Each service runs as an independent task, and the main daemon
//! structure tracks and coordinates these tasks:
//!
//! - Telemetry web server (ingress + subscription endpoints)
//! - TCP relay bridge (alternate subscription transport)
//! - Simulated indicator (development only)
//! - System health monitoring (heartbeat)
//!
//! ## Usage
//!
//! ```no_run
//! use weighbridge_telemetry::{config::Config, daemon::launch_daemon::Daemon};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let config = Config::from_file("config.yaml")?;
//!
//!     // Create and launch daemon with all enabled services
//!     let mut daemon = Daemon::new();
//!     daemon.launch(&config).await?;
//!
//!     // Later, trigger a graceful shutdown
//!     daemon.shutdown();
//!
//!     // Wait for all tasks to complete
//!     daemon.join().await?;
//!
//!     Ok(())
//! }
//! ```

use anyhow::Result;
use log::{debug, info};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::Config;
use crate::relay::{run_relay_bridge, IndicatorSimulator};
use crate::server::build_rocket;
use crate::telemetry::SharedWeightStream;
use rocket::config::LogLevel;

/// Represents a daemon task manager that coordinates the background services
///
/// This structure maintains a collection of asynchronous tasks and provides
/// methods to start, stop, and monitor them.
///
/// # Thread Safety
///
/// The `running` flag is wrapped in an `Arc` to allow safe sharing between
/// tasks. Each task checks this flag periodically to determine if it should
/// continue running or gracefully terminate.
pub struct Daemon {
    tasks: Vec<JoinHandle<Result<()>>>,
    running: Arc<AtomicBool>,
    /// Shared weight stream fed by the ingress endpoint and the simulator
    weight_stream: Option<SharedWeightStream>,
}

impl Default for Daemon {
    fn default() -> Self {
        Self::new()
    }
}

impl Daemon {
    /// Create a new daemon instance
    pub fn new() -> Self {
        Daemon {
            tasks: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            weight_stream: None,
        }
    }

    /// Launch all configured tasks based on configuration
    ///
    /// Only services that are enabled in the configuration will be started.
    /// Each service runs as a separate asynchronous task.
    ///
    /// # Parameters
    ///
    /// * `config` - Application configuration containing service settings
    ///
    /// # Errors
    ///
    /// This function can fail if the web server fails to ignite or the relay
    /// bridge fails to bind.
    pub async fn launch(&mut self, config: &Config) -> Result<()> {
        let stream = SharedWeightStream::new(config.server.session_buffer);
        self.weight_stream = Some(stream.clone());

        // Start web server if enabled
        if config.server.enabled {
            self.start_telemetry_server(config, stream.clone()).await?;
        }

        // Start the TCP relay bridge if enabled
        if config.indicator.relay_enabled {
            self.start_relay_bridge(config, stream.clone())?;
        }

        // Start the simulated indicator if enabled
        if config.indicator.simulated {
            self.start_indicator_simulator(config, stream.clone())?;
        }

        // Start heartbeat task for monitoring
        self.start_heartbeat(stream)?;

        Ok(())
    }

    /// Start the Rocket web server for the telemetry endpoints
    ///
    /// The server is configured according to the provided configuration,
    /// including address, port and server identity. The spawned task runs
    /// the server until process shutdown.
    async fn start_telemetry_server(
        &mut self,
        config: &Config,
        stream: SharedWeightStream,
    ) -> Result<()> {
        info!(
            "Starting web server on {}:{}",
            config.server.address, config.server.port
        );

        let figment = rocket::Config::figment()
            .merge(("ident", config.server.name.clone()))
            .merge(("address", config.server.address.clone()))
            .merge(("port", config.server.port))
            .merge(("log_level", LogLevel::Normal));

        let rocket = build_rocket(figment, Arc::new(config.clone()), stream).await;

        let task = tokio::spawn(async move {
            let ignited = rocket.ignite().await?;
            ignited.launch().await?;
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Start the TCP relay bridge task
    fn start_relay_bridge(&mut self, config: &Config, stream: SharedWeightStream) -> Result<()> {
        info!(
            "Starting relay bridge on {}:{}",
            config.indicator.relay_address, config.indicator.relay_port
        );

        let address = config.indicator.relay_address.clone();
        let port = config.indicator.relay_port;
        let running = self.running.clone();

        let task =
            tokio::spawn(
                async move { run_relay_bridge(&address, port, stream, running).await },
            );

        self.tasks.push(task);
        Ok(())
    }

    /// Start the simulated indicator task
    fn start_indicator_simulator(
        &mut self,
        config: &Config,
        stream: SharedWeightStream,
    ) -> Result<()> {
        info!("Starting simulated indicator");

        let simulator = IndicatorSimulator::new(
            stream,
            config.indicator.marker.clone(),
            config.indicator.sim_interval_ms,
            self.running.clone(),
        );

        let task = tokio::spawn(async move {
            simulator.run().await;
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Start a heartbeat task that logs stream statistics periodically
    ///
    /// The heartbeat task runs every 60 seconds and continues until the
    /// daemon's `running` flag is set to `false`. In a production
    /// environment these messages can be monitored by an external system to
    /// detect if the daemon has stopped functioning properly.
    fn start_heartbeat(&mut self, stream: SharedWeightStream) -> Result<()> {
        info!("Starting heartbeat monitor");

        let running = self.running.clone();
        let task = tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                let stats = stream.get_stats();
                debug!(
                    "Daemon heartbeat: {} readings published, {} sessions connected",
                    stats.total_published, stats.active_sessions
                );
                time::sleep(Duration::from_secs(60)).await;
            }
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Get a reference to the shared weight stream
    ///
    /// Returns the stream once `launch` has run. This is used by tests and
    /// embedding code to publish or subscribe without going through HTTP.
    pub fn get_weight_stream(&self) -> Option<SharedWeightStream> {
        self.weight_stream.clone()
    }

    /// Stop all running tasks gracefully
    ///
    /// Signals all spawned tasks to terminate by setting the shared
    /// `running` flag to `false`. This method only signals the tasks to
    /// stop; call `join()` to wait for them to complete.
    pub fn shutdown(&self) {
        info!("Shutting down daemon tasks");
        self.running.store(false, Ordering::SeqCst);
        // Tasks should check the running flag and terminate gracefully
    }

    /// Wait for all tasks to complete
    ///
    /// Consumes the daemon and waits for all spawned tasks to finish
    /// execution. If any task panics, the error is logged but this method
    /// will still wait for all other tasks to complete.
    pub async fn join(self) -> Result<()> {
        for task in self.tasks {
            match tokio::time::timeout(Duration::from_secs(5), task).await {
                Ok(result) => {
                    if let Err(e) = result {
                        log::error!("Task panicked: {}", e);
                    }
                }
                Err(_) => {
                    // Task didn't complete within timeout
                    log::warn!("Task did not complete within timeout period, may be hung");
                }
            }
        }
        Ok(())
    }
}
