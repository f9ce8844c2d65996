// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Simulated weighbridge indicator
//!
//! Publishes synthetic indicator frames to the hub at a fixed interval for
//! development and demos without a physical weighbridge. The simulated
//! vehicle weight wanders around a base load, and a fraction of the frames
//! is deliberately corrupted the way a real serial link garbles them, so
//! downstream rejection paths stay exercised.

use log::{debug, info};
use rand::RngExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::telemetry::SharedWeightStream;

/// Base simulated load in indicator units
const BASE_WEIGHT: i64 = 12500;

/// Simulated indicator source that publishes frames to the shared stream
pub struct IndicatorSimulator {
    stream: SharedWeightStream,
    marker: String,
    period: Duration,
    running: Arc<AtomicBool>,
}

impl IndicatorSimulator {
    /// Create a new simulator
    ///
    /// ### Parameters
    /// * `stream` - The shared weight stream to publish into
    /// * `marker` - Marker token of the simulated indicator protocol
    /// * `interval_ms` - Milliseconds between frames
    /// * `running` - Shutdown flag shared with the daemon
    pub fn new(
        stream: SharedWeightStream,
        marker: String,
        interval_ms: u64,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            stream,
            marker,
            period: Duration::from_millis(interval_ms),
            running,
        }
    }

    /// Run the simulator until the running flag clears
    pub async fn run(self) {
        info!(
            "Indicator simulator started, one frame every {:?}",
            self.period
        );

        let mut ticker = interval(self.period);
        let mut weight = BASE_WEIGHT;
        let mut frame_count: u64 = 0;

        while self.running.load(Ordering::SeqCst) {
            ticker.tick().await;

            let frame = {
                let mut rng = rand::rng();

                // Random walk around the base load, clamped to the six digit range
                weight = (weight + rng.random_range(-250..=250)).clamp(0, 999_999);
                frame_count += 1;

                if rng.random_range(0..8) == 0 {
                    // Corrupted frame: truncated digits, the shape a noisy
                    // serial link actually produces
                    format!("ST,GS,{}{:03}.{:02}", self.marker, weight % 1000, rng.random_range(0..100))
                } else {
                    format!(
                        "ST,GS,{}{:06}.{:02}",
                        self.marker,
                        weight,
                        rng.random_range(0..100)
                    )
                }
            };

            debug!("simulated frame {}: {:?}", frame_count, frame);
            self.stream.publish(frame);
        }

        info!("Indicator simulator stopped after {} frames", frame_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{parse_reading, ReadingConsumer};
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_simulator_publishes_parseable_frames() {
        let stream = SharedWeightStream::new(64);
        let running = Arc::new(AtomicBool::new(true));
        let mut consumer = ReadingConsumer::new(&stream);

        let simulator =
            IndicatorSimulator::new(stream.clone(), "N+".to_string(), 10, running.clone());
        tokio::spawn(simulator.run());

        let mut accepted = 0;
        for _ in 0..20 {
            let reading = timeout(Duration::from_secs(2), consumer.next_reading())
                .await
                .expect("simulator produced no frame")
                .unwrap();
            if let Ok(weight) = parse_reading(&reading.value, "N+") {
                assert!(weight <= 999_999);
                accepted += 1;
            }
        }

        // The corruption rate is 1 in 8, so most frames must parse
        assert!(accepted >= 10, "only {} of 20 frames parsed", accepted);

        running.store(false, Ordering::SeqCst);
    }
}
