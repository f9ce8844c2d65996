// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! TCP relay bridge
//!
//! Alternate subscription transport: one UI variant subscribes to the live
//! weight stream over a plain socket instead of Server-Sent Events. The
//! bridge listens on a configurable address (default `localhost:4000`) and
//! emits every published reading as one newline-delimited frame to each
//! connected client. The reading parser contract applies identically on
//! this transport.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time;
use tokio::time::timeout;

use crate::telemetry::{ReadingConsumer, SharedWeightStream};

/// Run the relay bridge accept loop until the running flag clears
///
/// Each accepted client gets its own hub session; dropping the session on
/// client disconnect is the only cleanup, matching the SSE endpoint.
///
/// ### Parameters
///
/// * `address` - Address to listen on
/// * `port` - Port to listen on
/// * `stream` - The shared weight stream to fan out
/// * `running` - Shutdown flag shared with the daemon
pub async fn run_relay_bridge(
    address: &str,
    port: u16,
    stream: SharedWeightStream,
    running: Arc<AtomicBool>,
) -> Result<()> {
    let socket_addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .with_context(|| format!("Invalid relay bridge address: {}:{}", address, port))?;

    let listener = TcpListener::bind(socket_addr)
        .await
        .with_context(|| format!("Failed to bind relay bridge on {}", socket_addr))?;

    info!("Relay bridge listening on {}", socket_addr);

    while running.load(Ordering::SeqCst) {
        // Re-check the running flag every second while idle
        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            _ = time::sleep(Duration::from_secs(1)) => continue,
        };

        match accepted {
            Ok((socket, peer)) => {
                debug!("relay client connected from {}", peer);
                let consumer = ReadingConsumer::new(&stream);
                let running = running.clone();
                tokio::spawn(serve_relay_client(socket, consumer, running, peer));
            }
            Err(e) => {
                warn!("relay bridge accept failed: {}", e);
                time::sleep(Duration::from_millis(100)).await;
            }
        }
    }

    info!("Relay bridge stopped");
    Ok(())
}

/// Forward published readings to one socket client until it disconnects
async fn serve_relay_client(
    mut socket: TcpStream,
    mut consumer: ReadingConsumer,
    running: Arc<AtomicBool>,
    peer: SocketAddr,
) {
    loop {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        match timeout(Duration::from_secs(1), consumer.next_reading()).await {
            Ok(Some(reading)) => {
                let mut line = reading.value;
                line.push('\n');
                if let Err(e) = socket.write_all(line.as_bytes()).await {
                    debug!("relay client {} gone: {}", peer, e);
                    break;
                }
            }
            Ok(None) => break,
            // Idle: loop around to re-check the running flag
            Err(_) => continue,
        }
    }

    debug!("relay client {} disconnected", peer);
    // Dropping the consumer unregisters its hub session
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_bridge_forwards_published_readings_per_line() {
        let stream = SharedWeightStream::new(8);
        let running = Arc::new(AtomicBool::new(true));

        // Bind on an ephemeral port, then point the bridge at it
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let bridge_stream = stream.clone();
        let bridge_running = running.clone();
        let bridge = tokio::spawn(async move {
            run_relay_bridge(
                "127.0.0.1",
                addr.port(),
                bridge_stream,
                bridge_running,
            )
            .await
        });

        // Give the bridge a moment to bind
        time::sleep(Duration::from_millis(100)).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;

        stream.publish("N+012345.67".to_string());
        stream.publish("N+012350.00".to_string());

        let mut buf = vec![0u8; 64];
        let mut received = String::new();
        while !received.contains("N+012350.00\n") {
            let n = timeout(Duration::from_secs(2), client.read(&mut buf))
                .await
                .expect("read timed out")
                .unwrap();
            assert!(n > 0, "bridge closed the connection early");
            received.push_str(std::str::from_utf8(&buf[..n]).unwrap());
        }
        assert_eq!(received, "N+012345.67\nN+012350.00\n");

        running.store(false, Ordering::SeqCst);
        let _ = timeout(Duration::from_secs(3), bridge).await;
    }

    #[tokio::test]
    async fn test_bridge_client_disconnect_unregisters_session() {
        let stream = SharedWeightStream::new(8);
        let running = Arc::new(AtomicBool::new(true));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let bridge_stream = stream.clone();
        let bridge_running = running.clone();
        tokio::spawn(async move {
            run_relay_bridge("127.0.0.1", addr.port(), bridge_stream, bridge_running).await
        });
        time::sleep(Duration::from_millis(100)).await;

        let client = TcpStream::connect(addr).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(stream.session_count(), 1);

        drop(client);
        // Writes after the disconnect fail and drop the session; keep
        // publishing until the bridge notices (the first write after a close
        // may still be buffered by the kernel)
        let mut waited = 0u64;
        while stream.session_count() > 0 && waited < 5000 {
            stream.publish("N+000100.0".to_string());
            time::sleep(Duration::from_millis(100)).await;
            waited += 100;
        }
        assert_eq!(stream.session_count(), 0);

        running.store(false, Ordering::SeqCst);
    }
}
