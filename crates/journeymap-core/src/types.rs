// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Journeymap tracking SDK.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Unique identifier correlating events from one visitor session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single tracked interaction event.
///
/// Events are fully formed at creation time and immutable afterwards. They
/// are dropped once delivered, or discarded when older than the configured
/// maximum retry age. Field names serialize in camelCase to match the
/// collector wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    /// Unique event id.
    pub id: String,
    /// Event name, e.g. `page_view` or `button_click`.
    pub event_type: String,
    /// Free-form event properties.
    pub properties: Map<String, Value>,
    /// Page or route the event was recorded on, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Creation time, UTC.
    pub timestamp: DateTime<Utc>,
    /// Session the event belongs to.
    pub session_id: SessionId,
    /// Identified customer, if `identify` was called.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Journey the event is scoped to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journey_id: Option<String>,
}

impl TrackingEvent {
    /// Creates an event stamped with a fresh id and the current UTC time.
    ///
    /// `url`, `customer_id`, and `journey_id` start out unset; enrichment
    /// layers fill them in before the event is queued.
    pub fn new(
        event_type: impl Into<String>,
        properties: Map<String, Value>,
        session_id: SessionId,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            properties,
            url: None,
            timestamp: Utc::now(),
            session_id,
            customer_id: None,
            journey_id: None,
        }
    }
}

/// States of the consent gate.
///
/// The gate starts `Uninitialized` and settles into `Active` (collection
/// allowed) or `Disabled` (Do-Not-Track or a stored refusal). Granting
/// consent always moves to `Active`; revoking always moves to `Disabled`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConsentState {
    Uninitialized,
    Active,
    Disabled,
}
