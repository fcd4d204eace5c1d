// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Journeymap tracking SDK.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, producing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Journeymap configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; the one value with no usable default is `api.key`, which the
/// tracker requires at construction time.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JourneymapConfig {
    /// Collector endpoint and credentials.
    #[serde(default)]
    pub api: ApiConfig,

    /// Batching and flush cadence settings.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Consent and Do-Not-Track handling.
    #[serde(default)]
    pub consent: ConsentConfig,

    /// Retry policy for the server-side tracker.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Persistent state settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Collector endpoint and credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the event collector. The SDK POSTs to `{url}/api/events`.
    #[serde(default = "default_api_url")]
    pub url: String,

    /// API key sent as a bearer token and in the batch payload.
    /// `None` makes tracker construction fail.
    #[serde(default)]
    pub key: Option<String>,

    /// Site/property identifier included with each batch, if set.
    #[serde(default)]
    pub tracking_id: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            key: None,
            tracking_id: None,
        }
    }
}

fn default_api_url() -> String {
    "https://events.journeymap.app".to_string()
}

/// Batching and flush cadence settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Queue length that triggers an immediate flush.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Seconds between periodic timer flushes.
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,

    /// Maximum age in seconds before an undelivered event is discarded.
    #[serde(default = "default_max_event_age_secs")]
    pub max_event_age_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            flush_interval_secs: default_flush_interval_secs(),
            max_event_age_secs: default_max_event_age_secs(),
        }
    }
}

fn default_batch_size() -> usize {
    50
}

fn default_flush_interval_secs() -> u64 {
    5
}

fn default_max_event_age_secs() -> u64 {
    600
}

/// Consent and Do-Not-Track handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConsentConfig {
    /// Honor the host-supplied Do-Not-Track signal at initialization.
    #[serde(default = "default_respect_do_not_track")]
    pub respect_do_not_track: bool,

    /// Opt-in mode: with no stored consent decision, collect nothing until
    /// consent is granted. The default is the opt-out model (collect unless
    /// refused).
    #[serde(default)]
    pub require_consent: bool,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            respect_do_not_track: default_respect_do_not_track(),
            require_consent: false,
        }
    }
}

fn default_respect_do_not_track() -> bool {
    true
}

/// Retry policy for the server-side tracker.
///
/// The in-process client tracker does not use these values: it re-queues a
/// failed batch and waits for the next timer tick instead of backing off.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Retries after the initial attempt before a batch is dropped.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff before the first retry; doubles on each subsequent retry.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Persistent state settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite state file holding session, customer, and consent
    /// values.
    #[serde(default = "default_state_path")]
    pub state_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
        }
    }
}

fn default_state_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("journeymap").join("state.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("journeymap-state.db"))
        .to_string_lossy()
        .into_owned()
}
