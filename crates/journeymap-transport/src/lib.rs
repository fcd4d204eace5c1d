// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP delivery for the Journeymap event collector.
//!
//! [`CollectorClient`] POSTs event batches to `{api_url}/api/events` with a
//! bearer-token header. It offers a single-attempt path (used by the
//! in-process client tracker, which re-queues failures) and a bounded
//! retry-with-backoff path (used by the server-side tracker).

pub mod client;
pub mod types;

pub use client::{is_transient_error, CollectorClient, RetryPolicy};
pub use types::EventsPayload;
