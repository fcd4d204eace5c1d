// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-side tracker with a deliberate retry policy.
//!
//! Unlike the in-process client -- which re-queues a failed batch and waits
//! for the next timer tick -- the server-side tracker retries a failing batch
//! a bounded number of times with exponential backoff, then drops it and
//! logs the failure. Every delivery attempt carries a per-request timeout.

use std::time::Duration;

use journeymap_config::JourneymapConfig;
use journeymap_core::{EventQueue, JourneymapError, SessionId, TrackingEvent};
use journeymap_transport::{CollectorClient, RetryPolicy};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Tracker for backend-originated events.
///
/// Callers supply the session id explicitly -- a backend handles many
/// sessions at once, so there is no ambient session to enrich from. No
/// consent gate applies here; backend events represent the host's own
/// processing, not browser interactions.
pub struct ServerSideTracker {
    client: CollectorClient,
    policy: RetryPolicy,
    batch_size: usize,
    flush_interval: Duration,
    queue: Mutex<EventQueue>,
}

impl ServerSideTracker {
    /// Constructs the tracker from configuration.
    ///
    /// Fails when `api.key` is unset. The per-request timeout and retry
    /// policy come from the `[delivery]` section.
    pub fn new(config: &JourneymapConfig) -> Result<Self, JourneymapError> {
        let client = CollectorClient::new(
            &config.api.url,
            config.api.key.as_deref().unwrap_or_default(),
        )?
        .with_tracking_id(config.api.tracking_id.clone())
        .with_request_timeout(Duration::from_secs(config.delivery.request_timeout_secs));

        info!(
            max_retries = config.delivery.max_retries,
            initial_backoff_ms = config.delivery.initial_backoff_ms,
            "server-side tracker initialized"
        );

        Ok(Self {
            client,
            policy: RetryPolicy::from(&config.delivery),
            batch_size: config.batch.batch_size,
            flush_interval: Duration::from_secs(config.batch.flush_interval_secs),
            queue: Mutex::new(EventQueue::new()),
        })
    }

    /// Queues an event for the given session.
    ///
    /// Reaching the batch-size threshold flushes inline rather than waiting
    /// for [`run`](Self::run)'s next tick.
    pub async fn track(
        &self,
        event_type: &str,
        properties: Map<String, Value>,
        session_id: SessionId,
    ) -> Result<(), JourneymapError> {
        let event = TrackingEvent::new(event_type, properties, session_id);
        self.track_event(event).await
    }

    /// Queues an already-built event.
    pub async fn track_event(&self, event: TrackingEvent) -> Result<(), JourneymapError> {
        let (queued, at_threshold) = {
            let mut queue = self.queue.lock().await;
            queue.push(event);
            (queue.len(), queue.len() >= self.batch_size)
        };
        debug!(queued, "server event tracked");

        if at_threshold {
            self.flush().await?;
        }
        Ok(())
    }

    /// Number of events currently queued.
    pub async fn pending_events(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Drains the queue and delivers one batch with bounded retries.
    ///
    /// When retries are exhausted (or the collector rejects the batch with a
    /// permanent error) the batch is dropped and the failure logged; it is
    /// never re-queued.
    pub async fn flush(&self) -> Result<(), JourneymapError> {
        let snapshot = {
            let mut queue = self.queue.lock().await;
            if queue.is_empty() {
                return Ok(());
            }
            queue.take_snapshot()
        };

        let count = snapshot.len();
        match self.client.send_with_retry(&snapshot, &self.policy).await {
            Ok(()) => {
                debug!(count, "server batch delivered");
                Ok(())
            }
            Err(e) => {
                error!(
                    error = %e,
                    count,
                    max_retries = self.policy.max_retries,
                    "server batch dropped after retries exhausted"
                );
                Ok(())
            }
        }
    }

    /// Runs the periodic flush loop until the token is cancelled, then
    /// performs a final flush.
    ///
    /// Unlike the in-process client, the loop is not spawned automatically;
    /// backends own their task lifecycles.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), JourneymapError> {
        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + self.flush_interval, self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.flush().await?;
                }
                _ = cancel.cancelled() => {
                    info!("server tracker stopping, final flush");
                    break;
                }
            }
        }

        self.flush().await
    }
}
