// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-side tracking for the Journeymap SDK.
//!
//! [`ServerSideTracker`] buffers backend-originated events and delivers them
//! with a bounded retry count and exponential backoff. Batches that exhaust
//! their retries are dropped and logged, never re-queued.

pub mod tracker;

pub use tracker::ServerSideTracker;
