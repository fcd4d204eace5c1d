// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent key-value state for identifiers and consent flags.

use async_trait::async_trait;

use crate::error::JourneymapError;

/// Small persistent key-value store surviving process restarts.
///
/// Holds the session identifier, the identified customer, and the consent
/// flag. Keys and values are plain strings; callers own the naming scheme.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Returns the stored value for `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, JourneymapError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<(), JourneymapError>;

    /// Removes `key` if present.
    async fn remove(&self, key: &str) -> Result<(), JourneymapError>;
}
