// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery sink trait for event batch transports.

use async_trait::async_trait;

use crate::error::JourneymapError;
use crate::types::TrackingEvent;

/// Transport that attempts delivery of one event batch.
///
/// A single call makes a single delivery attempt; retry policy belongs to
/// the caller. Any `Err` counts as a failed attempt regardless of cause.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Attempts to deliver `events` as one batch.
    async fn deliver(&self, events: &[TrackingEvent]) -> Result<(), JourneymapError>;
}
