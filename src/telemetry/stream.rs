// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the weighbridge-telemetry project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Shared weight stream
//!
//! This module provides the broadcast hub between the ingress endpoint and
//! the subscriber sessions. Each session owns one bounded channel; the hub
//! owns the registry mapping session identifiers to channel senders and is
//! the only component allowed to mutate it. Publishing writes the reading to
//! every registered channel in one pass, best-effort: a session whose
//! receiver is gone is unregistered on the spot and the fault never reaches
//! other sessions or the publisher.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Identifier of one subscriber session, unique within the process
pub type SessionId = u64;

/// One raw reading as published by the ingress endpoint
///
/// The value is carried verbatim; validation is the reading parser's job,
/// executed by each subscriber independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawReading {
    /// Raw payload exactly as pushed by the relay
    pub value: String,
    /// Timestamp when the reading was published (milliseconds since epoch)
    pub timestamp: u64,
    /// Sequential publish number
    pub seq: u64,
}

impl RawReading {
    fn new(value: String, seq: u64) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            value,
            timestamp,
            seq,
        }
    }
}

/// Statistics about the weight stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamStats {
    /// Total number of readings published
    pub total_published: u64,
    /// Number of sends that could not be delivered (lagging or vanished sessions)
    pub dropped_sends: u64,
    /// Number of currently registered sessions
    pub active_sessions: usize,
    /// Last publish timestamp (milliseconds since epoch)
    pub last_update: u64,
}

impl Default for StreamStats {
    fn default() -> Self {
        Self {
            total_published: 0,
            dropped_sends: 0,
            active_sessions: 0,
            last_update: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
        }
    }
}

struct StreamInner {
    /// Registry of session channels; all mutation funnels through this lock
    sessions: RwLock<HashMap<SessionId, mpsc::Sender<RawReading>>>,
    next_session: AtomicU64,
    next_seq: AtomicU64,
    /// Latest published reading for point queries (never replayed into the stream)
    latest: RwLock<Option<RawReading>>,
    stats: RwLock<StreamStats>,
    buffer_size: usize,
}

/// Shared weight stream for broadcasting readings to multiple sessions
#[derive(Clone)]
pub struct SharedWeightStream {
    inner: Arc<StreamInner>,
}

impl SharedWeightStream {
    /// Create a new shared weight stream
    ///
    /// ### Parameters
    /// * `buffer_size` - Capacity of each session's reading channel
    pub fn new(buffer_size: usize) -> Self {
        Self {
            inner: Arc::new(StreamInner {
                sessions: RwLock::new(HashMap::new()),
                next_session: AtomicU64::new(1),
                next_seq: AtomicU64::new(1),
                latest: RwLock::new(None),
                stats: RwLock::new(StreamStats::default()),
                buffer_size,
            }),
        }
    }

    /// Register a new subscriber session
    ///
    /// Returns a subscription handle owning the session's receiving end.
    /// Dropping the handle unregisters the session, so a subscriber that
    /// vanishes without an explicit unregister is still cleaned up.
    pub fn register(&self) -> WeightSubscription {
        let (tx, rx) = mpsc::channel(self.inner.buffer_size);
        let id = self.inner.next_session.fetch_add(1, Ordering::Relaxed);

        {
            let mut sessions = self
                .inner
                .sessions
                .write()
                .unwrap_or_else(|e| e.into_inner());
            sessions.insert(id, tx);
            self.update_active_count(sessions.len());
        }

        debug!("session {} registered", id);
        WeightSubscription {
            id,
            receiver: rx,
            stream: self.clone(),
        }
    }

    /// Unregister a session
    ///
    /// Removes and closes the session's channel. Idempotent: unregistering a
    /// session twice is a no-op, not an error.
    pub fn unregister(&self, id: SessionId) {
        let removed = {
            let mut sessions = self
                .inner
                .sessions
                .write()
                .unwrap_or_else(|e| e.into_inner());
            let removed = sessions.remove(&id).is_some();
            self.update_active_count(sessions.len());
            removed
        };

        if removed {
            debug!("session {} unregistered", id);
        }
    }

    /// Publish a reading to all registered sessions
    ///
    /// Holding the registry's write lock for the whole pass serializes
    /// publishes, so every session observes readings in publish order.
    /// Delivery is best-effort: a closed channel (subscriber gone) is
    /// unregistered in place, a full channel (subscriber lagging) loses the
    /// reading; both are counted in the stream statistics and neither fault
    /// reaches the caller.
    pub fn publish(&self, value: String) {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let reading = RawReading::new(value, seq);

        // Update latest reading
        {
            let mut latest = self.inner.latest.write().unwrap_or_else(|e| e.into_inner());
            *latest = Some(reading.clone());
        }

        let mut dropped: u64 = 0;
        let active = {
            let mut sessions = self
                .inner
                .sessions
                .write()
                .unwrap_or_else(|e| e.into_inner());

            let mut gone: Vec<SessionId> = Vec::new();
            for (id, tx) in sessions.iter() {
                match tx.try_send(reading.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        dropped += 1;
                        warn!("session {} lagging, reading {} dropped", id, seq);
                    }
                    Err(TrySendError::Closed(_)) => {
                        dropped += 1;
                        gone.push(*id);
                    }
                }
            }

            for id in gone {
                sessions.remove(&id);
                debug!("session {} vanished, unregistered during publish", id);
            }
            sessions.len()
        };

        // Update statistics
        {
            let mut stats = self.inner.stats.write().unwrap_or_else(|e| e.into_inner());
            stats.total_published += 1;
            stats.dropped_sends += dropped;
            stats.active_sessions = active;
            stats.last_update = reading.timestamp;
        }
    }

    /// Get the latest published reading (for point queries)
    pub fn get_latest(&self) -> Option<RawReading> {
        self.inner
            .latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get current stream statistics
    pub fn get_stats(&self) -> StreamStats {
        self.inner
            .stats
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get the number of currently registered sessions
    pub fn session_count(&self) -> usize {
        self.inner
            .sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    fn update_active_count(&self, active: usize) {
        let mut stats = self.inner.stats.write().unwrap_or_else(|e| e.into_inner());
        stats.active_sessions = active;
    }
}

/// Receiving end of one registered session
///
/// Owned by exactly one subscriber. Dropping the subscription unregisters
/// the session from the hub.
pub struct WeightSubscription {
    id: SessionId,
    receiver: mpsc::Receiver<RawReading>,
    stream: SharedWeightStream,
}

impl WeightSubscription {
    /// The session identifier assigned by the hub
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Receive the next published reading
    ///
    /// Returns `None` once the session has been unregistered and the channel
    /// drained.
    pub async fn recv(&mut self) -> Option<RawReading> {
        self.receiver.recv().await
    }
}

impl Drop for WeightSubscription {
    fn drop(&mut self) {
        self.stream.unregister(self.id);
    }
}

/// Consumer interface for reading from the shared stream
pub struct ReadingConsumer {
    subscription: WeightSubscription,
    stream: SharedWeightStream,
}

impl ReadingConsumer {
    /// Create a new consumer registered with the shared stream
    pub fn new(stream: &SharedWeightStream) -> Self {
        Self {
            subscription: stream.register(),
            stream: stream.clone(),
        }
    }

    /// Get the next reading from the stream
    ///
    /// Returns `None` if the session was unregistered and drained.
    pub async fn next_reading(&mut self) -> Option<RawReading> {
        self.subscription.recv().await
    }

    /// The session identifier of this consumer
    pub fn session_id(&self) -> SessionId {
        self.subscription.id()
    }

    /// Get the latest available reading without waiting
    pub fn get_latest(&self) -> Option<RawReading> {
        self.stream.get_latest()
    }

    /// Get current stream statistics
    pub fn get_stats(&self) -> StreamStats {
        self.stream.get_stats()
    }
}
