// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket server builder and configuration
//!
//! This module provides functions to build and configure the Rocket server
//! instance with all necessary routes, fairings, and state management.

use super::cors::CORS;
use super::ingress::push_weight;
use super::streaming::{get_latest_reading, get_stream_stats, stream_weight};
use super::TelemetryState;
use crate::config::Config;
use crate::telemetry::SharedWeightStream;
use log::debug;
use rocket::figment::Figment;
use rocket::routes;
use rocket::{Build, Rocket};
use std::path::PathBuf;
use std::sync::Arc;

/// Build a configured Rocket server instance
///
/// This function creates and configures a Rocket server instance with the
/// ingress endpoint, the SSE subscription endpoint, the point endpoints and
/// the CORS fairing.
///
/// ### Parameters
///
/// * `figment` - The Rocket configuration figment containing server settings
/// * `config` - The application configuration
/// * `stream` - The shared weight stream fed by the ingress endpoint
///
/// ### Returns
///
/// A configured Rocket instance ready to be launched
///
/// ### Example
///
/// ```no_run
/// use rocket::figment::Figment;
/// use std::sync::Arc;
/// use weighbridge_telemetry::{config::Config, server, telemetry::SharedWeightStream};
///
/// async fn example() {
///     let figment = Figment::from(rocket::Config::default());
///     let config = Arc::new(Config::default());
///     let stream = SharedWeightStream::new(64);
///     let rocket = server::build_rocket(figment, config, stream).await;
///     // Launch the server
///     // rocket.launch().await.expect("Failed to launch");
/// }
/// ```
pub async fn build_rocket(
    figment: Figment,
    config: Arc<Config>,
    stream: SharedWeightStream,
) -> Rocket<Build> {
    let telemetry_state = TelemetryState {
        stream,
        ingress_secret: config.server.ingress_secret.clone(),
    };

    debug!(
        "building rocket with {} session buffer",
        config.server.session_buffer
    );

    rocket::custom(figment)
        .attach(CORS)
        .mount(
            "/",
            routes![
                push_weight,
                stream_weight,
                get_latest_reading,
                get_stream_stats,
                options,
            ],
        )
        .manage(telemetry_state)
        .manage(config)
}

use rocket::options;

/// Handler for HTTP OPTIONS requests required for CORS preflight
///
/// This handler responds to OPTIONS requests with a 200 OK response,
/// which is necessary for CORS preflight requests. The CORS fairing
/// will add the appropriate headers to the response.
#[options("/<_path..>")]
pub async fn options(_path: PathBuf) -> Result<(), std::io::Error> {
    Ok(())
}
