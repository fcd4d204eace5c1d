// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery sink for deterministic testing.
//!
//! `MockSink` implements `DeliverySink` with scripted failures and captured
//! batches, enabling tests of the re-queue and retry paths without a network.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use journeymap_core::{DeliverySink, JourneymapError, TrackingEvent};

/// A delivery sink that records batches and can be scripted to fail.
///
/// Each `deliver` call counts as one attempt. While the scripted failure
/// budget is non-zero, attempts fail and the budget decrements; afterwards
/// attempts succeed and the batch is captured.
#[derive(Clone, Default)]
pub struct MockSink {
    delivered: Arc<Mutex<Vec<Vec<TrackingEvent>>>>,
    failures_remaining: Arc<Mutex<u32>>,
    attempts: Arc<Mutex<u32>>,
}

impl MockSink {
    /// Creates a sink that accepts every delivery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next `n` delivery attempts to fail.
    pub async fn fail_next(&self, n: u32) {
        *self.failures_remaining.lock().await = n;
    }

    /// Total delivery attempts seen, successful or not.
    pub async fn attempts(&self) -> u32 {
        *self.attempts.lock().await
    }

    /// Successfully delivered batches, in order.
    pub async fn delivered(&self) -> Vec<Vec<TrackingEvent>> {
        self.delivered.lock().await.clone()
    }

    /// All successfully delivered events, flattened in delivery order.
    pub async fn delivered_events(&self) -> Vec<TrackingEvent> {
        self.delivered.lock().await.iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl DeliverySink for MockSink {
    async fn deliver(&self, events: &[TrackingEvent]) -> Result<(), JourneymapError> {
        *self.attempts.lock().await += 1;

        let mut failures = self.failures_remaining.lock().await;
        if *failures > 0 {
            *failures -= 1;
            return Err(JourneymapError::Delivery {
                message: "scripted delivery failure".to_string(),
                source: None,
            });
        }
        drop(failures);

        self.delivered.lock().await.push(events.to_vec());
        Ok(())
    }
}
