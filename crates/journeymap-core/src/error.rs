// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Journeymap tracking SDK.

use thiserror::Error;

/// The primary error type used across all Journeymap crates.
#[derive(Debug, Error)]
pub enum JourneymapError {
    /// Configuration errors (missing API key, invalid URL, bad header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistent state errors (database open, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Event delivery errors (request failure, non-2xx collector response).
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A delivery request exceeded its configured timeout.
    #[error("delivery timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
